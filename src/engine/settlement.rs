//! Settlement engine — grading wagers against final scores.
//!
//! `grade` is a pure function from a wager and a final score to a
//! result and profit; `SettlementEngine::settle_game` applies it to
//! every pending wager for one game, persisting each outcome exactly
//! once. Re-running settlement is safe: terminal wagers are excluded
//! by the store's PENDING-only filter, so a retry grades nothing twice.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::store::WagerStore;
use crate::types::{is_valid_american_price, Game, Wager, WagerKind, WagerStatus};

// ---------------------------------------------------------------------------
// Pure grading
// ---------------------------------------------------------------------------

/// Profit for a winning wager from its American price.
///
/// Positive price: profit = stake × price/100.
/// Negative price: profit = stake / (|price|/100).
fn profit_on_win(stake: Decimal, price: i32) -> Decimal {
    if price > 0 {
        stake * Decimal::from(price) / Decimal::from(100)
    } else {
        stake * Decimal::from(100) / Decimal::from(price.abs())
    }
}

/// The outcome of a wager against a final score, before profit math.
///
/// Ungradeable wagers (malformed price, missing required team/line,
/// team name matching neither side) resolve to LOST: an ungradeable
/// wager must not silently stay pending nor accidentally pay out.
fn outcome_of(
    wager: &Wager,
    away_team: &str,
    home_team: &str,
    away_score: i32,
    home_score: i32,
) -> WagerStatus {
    if !is_valid_american_price(wager.price) {
        return WagerStatus::Lost;
    }

    match wager.kind {
        WagerKind::Moneyline => {
            let (team_score, opponent_score) =
                match scores_for_team(wager, away_team, home_team, away_score, home_score) {
                    Some(pair) => pair,
                    None => return WagerStatus::Lost,
                };
            if team_score > opponent_score {
                WagerStatus::Won
            } else if team_score == opponent_score {
                WagerStatus::Push
            } else {
                WagerStatus::Lost
            }
        }
        WagerKind::Spread => {
            let line = match wager.line {
                Some(line) => line,
                None => return WagerStatus::Lost,
            };
            let (team_score, opponent_score) =
                match scores_for_team(wager, away_team, home_team, away_score, home_score) {
                    Some(pair) => pair,
                    None => return WagerStatus::Lost,
                };
            let margin = Decimal::from(team_score) + line - Decimal::from(opponent_score);
            if margin > Decimal::ZERO {
                WagerStatus::Won
            } else if margin == Decimal::ZERO {
                WagerStatus::Push
            } else {
                WagerStatus::Lost
            }
        }
        WagerKind::TotalOver | WagerKind::TotalUnder => {
            let line = match wager.line {
                Some(line) => line,
                None => return WagerStatus::Lost,
            };
            let total = Decimal::from(away_score) + Decimal::from(home_score);
            if total == line {
                WagerStatus::Push
            } else if (wager.kind == WagerKind::TotalOver) == (total > line) {
                WagerStatus::Won
            } else {
                WagerStatus::Lost
            }
        }
    }
}

/// Resolve (team score, opponent score) for the wager's selected team.
/// None when the team is absent or matches neither side.
fn scores_for_team(
    wager: &Wager,
    away_team: &str,
    home_team: &str,
    away_score: i32,
    home_score: i32,
) -> Option<(i32, i32)> {
    match wager.team.as_deref() {
        Some(team) if team == away_team => Some((away_score, home_score)),
        Some(team) if team == home_team => Some((home_score, away_score)),
        _ => None,
    }
}

/// Grade one wager against a final score.
///
/// Pure: same inputs always produce the same (result, profit) pair.
/// Profit is exactly `-stake` on LOST and exactly zero on PUSH — exact,
/// not near-zero, so aggregate ROI calculations stay stable.
pub fn grade(
    wager: &Wager,
    away_team: &str,
    home_team: &str,
    away_score: i32,
    home_score: i32,
) -> (WagerStatus, Decimal) {
    let result = outcome_of(wager, away_team, home_team, away_score, home_score);
    let profit = match result {
        WagerStatus::Won => profit_on_win(wager.stake, wager.price),
        WagerStatus::Lost => -wager.stake,
        WagerStatus::Push => Decimal::ZERO,
        WagerStatus::Pending => Decimal::ZERO, // outcome_of never returns Pending
    };
    (result, profit)
}

// ---------------------------------------------------------------------------
// Batch orchestration
// ---------------------------------------------------------------------------

/// Result of settling one game's pending wagers.
#[derive(Debug, Default)]
pub struct SettlementOutcome {
    /// Wagers graded and persisted in this run.
    pub graded: usize,
    /// Per-wager persistence failures. Safe to retry on the next run.
    pub errors: Vec<String>,
}

/// Grades and persists every pending wager once its game completes.
pub struct SettlementEngine {
    wagers: Arc<dyn WagerStore>,
}

impl SettlementEngine {
    pub fn new(wagers: Arc<dyn WagerStore>) -> Self {
        Self { wagers }
    }

    /// Settle all pending wagers for one completed game.
    ///
    /// Each wager is graded independently; a persistence failure on one
    /// is recorded and does not stop the rest of the batch. Already
    /// terminal wagers never appear in the batch, so re-invocation is a
    /// no-op for them.
    pub async fn settle_game(&self, game: &Game) -> SettlementOutcome {
        let mut outcome = SettlementOutcome::default();

        let (away_score, home_score) = match (game.away_score, game.home_score) {
            (Some(a), Some(h)) => (a, h),
            _ => {
                warn!(game = %game, "Settlement skipped: scores incomplete");
                return outcome;
            }
        };

        let pending = match self.wagers.find_pending_by_game(game.id).await {
            Ok(pending) => pending,
            Err(e) => {
                outcome
                    .errors
                    .push(format!("Failed to load pending wagers for {game}: {e}"));
                return outcome;
            }
        };

        if pending.is_empty() {
            debug!(game = %game, "No pending wagers to grade");
            return outcome;
        }

        info!(game = %game, count = pending.len(), "Grading pending wagers");

        for wager in &pending {
            let (status, profit) =
                grade(wager, &game.away_team, &game.home_team, away_score, home_score);

            match self.wagers.update_result(wager.id, status, profit).await {
                Ok(()) => {
                    debug!(
                        wager_id = %wager.id,
                        kind = %wager.kind,
                        result = %status,
                        profit = %profit,
                        "Wager graded"
                    );
                    outcome.graded += 1;
                }
                Err(e) => {
                    warn!(wager_id = %wager.id, error = %e, "Failed to persist wager result");
                    outcome
                        .errors
                        .push(format!("Failed to persist result for wager {}: {e}", wager.id));
                }
            }
        }

        outcome
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
