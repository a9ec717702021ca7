//! Bettor performance summaries.
//!
//! Pure aggregation over settled wagers: per-bettor totals, win rate and
//! ROI, per-kind breakdowns, and a profit-ordered leaderboard. The
//! presentation layer reads these; nothing here touches a store.
//!
//! Win rate is computed over settled non-push wagers only; pushes return
//! the stake and carry no signal either way. ROI is total profit over
//! total staked.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::types::{Wager, WagerKind, WagerStatus};

// ---------------------------------------------------------------------------
// Bettor summary
// ---------------------------------------------------------------------------

/// Aggregate performance of one bettor.
#[derive(Debug, Clone, Serialize)]
pub struct BettorSummary {
    pub bettor_id: String,
    pub total_wagers: usize,
    pub pending: usize,
    pub won: usize,
    pub lost: usize,
    pub pushed: usize,
    pub total_staked: Decimal,
    pub total_profit: Decimal,
}

impl BettorSummary {
    fn empty(bettor_id: &str) -> Self {
        BettorSummary {
            bettor_id: bettor_id.to_string(),
            total_wagers: 0,
            pending: 0,
            won: 0,
            lost: 0,
            pushed: 0,
            total_staked: Decimal::ZERO,
            total_profit: Decimal::ZERO,
        }
    }

    fn add(&mut self, wager: &Wager) {
        self.total_wagers += 1;
        self.total_staked += wager.stake;
        if let Some(profit) = wager.profit {
            self.total_profit += profit;
        }
        match wager.status {
            WagerStatus::Pending => self.pending += 1,
            WagerStatus::Won => self.won += 1,
            WagerStatus::Lost => self.lost += 1,
            WagerStatus::Push => self.pushed += 1,
        }
    }

    /// Settled wagers excluding pushes.
    pub fn decided(&self) -> usize {
        self.won + self.lost
    }

    /// Win rate as a percentage of decided wagers. 0.0 when none decided.
    pub fn win_rate(&self) -> f64 {
        if self.decided() == 0 {
            0.0
        } else {
            (self.won as f64 / self.decided() as f64) * 100.0
        }
    }

    /// Return on investment as a percentage of total staked.
    pub fn roi(&self) -> f64 {
        if self.total_staked.is_zero() {
            0.0
        } else {
            (self.total_profit / self.total_staked)
                .to_f64()
                .unwrap_or(0.0)
                * 100.0
        }
    }
}

impl fmt::Display for BettorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} wagers (W{}/L{}/P{}, {} pending) | staked=${} | profit=${} | win_rate={:.1}% | roi={:.1}%",
            self.bettor_id,
            self.total_wagers,
            self.won,
            self.lost,
            self.pushed,
            self.pending,
            self.total_staked,
            self.total_profit,
            self.win_rate(),
            self.roi(),
        )
    }
}

/// Summarize one bettor's wagers (other bettors' entries are ignored).
pub fn summarize(bettor_id: &str, wagers: &[Wager]) -> BettorSummary {
    let mut summary = BettorSummary::empty(bettor_id);
    for wager in wagers.iter().filter(|w| w.bettor_id == bettor_id) {
        summary.add(wager);
    }
    summary
}

/// Per-bettor summaries over all wagers, ordered by total profit
/// descending.
pub fn leaderboard(wagers: &[Wager]) -> Vec<BettorSummary> {
    let mut by_bettor: BTreeMap<&str, BettorSummary> = BTreeMap::new();
    for wager in wagers {
        by_bettor
            .entry(wager.bettor_id.as_str())
            .or_insert_with(|| BettorSummary::empty(&wager.bettor_id))
            .add(wager);
    }

    let mut entries: Vec<BettorSummary> = by_bettor.into_values().collect();
    entries.sort_by(|a, b| b.total_profit.cmp(&a.total_profit));
    entries
}

// ---------------------------------------------------------------------------
// Per-kind breakdown
// ---------------------------------------------------------------------------

/// Aggregate performance for one wager kind.
#[derive(Debug, Clone, Serialize)]
pub struct KindSummary {
    pub kind: WagerKind,
    pub total: usize,
    pub won: usize,
    pub lost: usize,
    pub total_staked: Decimal,
    pub total_profit: Decimal,
}

/// Breakdown of a wager set by kind, in `WagerKind::ALL` order.
pub fn kind_breakdown(wagers: &[Wager]) -> Vec<KindSummary> {
    WagerKind::ALL
        .iter()
        .map(|&kind| {
            let of_kind: Vec<&Wager> = wagers.iter().filter(|w| w.kind == kind).collect();
            KindSummary {
                kind,
                total: of_kind.len(),
                won: of_kind.iter().filter(|w| w.status == WagerStatus::Won).count(),
                lost: of_kind.iter().filter(|w| w.status == WagerStatus::Lost).count(),
                total_staked: of_kind.iter().map(|w| w.stake).sum(),
                total_profit: of_kind.iter().filter_map(|w| w.profit).sum(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn wager(bettor: &str, kind: WagerKind, status: WagerStatus, stake: Decimal, profit: Option<Decimal>) -> Wager {
        Wager {
            id: Uuid::new_v4(),
            bettor_id: bettor.to_string(),
            game_id: Uuid::new_v4(),
            kind,
            team: None,
            line: None,
            price: -110,
            stake,
            status,
            profit,
            placed_at: Utc::now(),
        }
    }

    fn sample_book() -> Vec<Wager> {
        vec![
            wager("alice", WagerKind::Moneyline, WagerStatus::Won, dec!(100), Some(dec!(150))),
            wager("alice", WagerKind::Spread, WagerStatus::Lost, dec!(100), Some(dec!(-100))),
            wager("alice", WagerKind::TotalOver, WagerStatus::Push, dec!(50), Some(Decimal::ZERO)),
            wager("alice", WagerKind::Spread, WagerStatus::Pending, dec!(25), None),
            wager("bob", WagerKind::Moneyline, WagerStatus::Lost, dec!(200), Some(dec!(-200))),
        ]
    }

    #[test]
    fn test_summarize_counts_and_totals() {
        let summary = summarize("alice", &sample_book());
        assert_eq!(summary.total_wagers, 4);
        assert_eq!(summary.won, 1);
        assert_eq!(summary.lost, 1);
        assert_eq!(summary.pushed, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.total_staked, dec!(275));
        assert_eq!(summary.total_profit, dec!(50));
    }

    #[test]
    fn test_win_rate_excludes_pushes_and_pending() {
        let summary = summarize("alice", &sample_book());
        assert_eq!(summary.decided(), 2);
        assert!((summary.win_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_win_rate_no_decided_wagers() {
        let wagers = vec![wager("carol", WagerKind::Moneyline, WagerStatus::Pending, dec!(10), None)];
        let summary = summarize("carol", &wagers);
        assert_eq!(summary.win_rate(), 0.0);
        assert_eq!(summary.roi(), 0.0);
    }

    #[test]
    fn test_roi() {
        // profit 50 over 275 staked → ~18.18%
        let summary = summarize("alice", &sample_book());
        assert!((summary.roi() - 18.1818).abs() < 0.01);
    }

    #[test]
    fn test_roi_zero_staked() {
        let summary = summarize("nobody", &sample_book());
        assert_eq!(summary.total_wagers, 0);
        assert_eq!(summary.roi(), 0.0);
    }

    #[test]
    fn test_leaderboard_sorted_by_profit() {
        let board = leaderboard(&sample_book());
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].bettor_id, "alice"); // +50
        assert_eq!(board[1].bettor_id, "bob"); // -200
        assert!(board[0].total_profit > board[1].total_profit);
    }

    #[test]
    fn test_leaderboard_empty() {
        assert!(leaderboard(&[]).is_empty());
    }

    #[test]
    fn test_kind_breakdown() {
        let breakdown = kind_breakdown(&sample_book());
        assert_eq!(breakdown.len(), WagerKind::ALL.len());

        let moneyline = breakdown.iter().find(|k| k.kind == WagerKind::Moneyline).unwrap();
        assert_eq!(moneyline.total, 2);
        assert_eq!(moneyline.won, 1);
        assert_eq!(moneyline.lost, 1);
        assert_eq!(moneyline.total_profit, dec!(-50));

        let under = breakdown.iter().find(|k| k.kind == WagerKind::TotalUnder).unwrap();
        assert_eq!(under.total, 0);
        assert_eq!(under.total_staked, Decimal::ZERO);
    }

    #[test]
    fn test_summary_display() {
        let summary = summarize("alice", &sample_book());
        let display = format!("{summary}");
        assert!(display.contains("alice"));
        assert!(display.contains("W1/L1/P1"));
        assert!(display.contains("50.0%"));
    }
}
