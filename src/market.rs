//! Market normalizer.
//!
//! Turns one provider game payload (bookmakers → markets → outcomes) into
//! a canonical `Quote` for one selected bookmaker. Each market is optional
//! and extracted independently: a payload missing spreads still yields a
//! quote carrying its moneyline and total. Unresolved fields stay absent —
//! a missing line must never be recorded as a line of 0.

use chrono::Utc;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::provider::{BookmakerOdds, GameOdds, MarketOdds};
use crate::types::Quote;

/// Provider market keys.
const MARKET_MONEYLINE: &str = "h2h";
const MARKET_SPREADS: &str = "spreads";
const MARKET_TOTALS: &str = "totals";

/// Literal outcome names used by the totals market.
const OUTCOME_OVER: &str = "Over";
const OUTCOME_UNDER: &str = "Under";

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Accumulates the optional market fields of a `Quote` as they resolve.
#[derive(Debug, Default)]
pub struct QuoteBuilder {
    away_moneyline: Option<i32>,
    home_moneyline: Option<i32>,
    away_spread: Option<Decimal>,
    home_spread: Option<Decimal>,
    spread_price: Option<i32>,
    total_line: Option<Decimal>,
    over_price: Option<i32>,
    under_price: Option<i32>,
}

impl QuoteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract moneyline prices by matching outcome names against the
    /// game's team strings. Either side may be present independently.
    fn moneyline(&mut self, market: &MarketOdds, away_team: &str, home_team: &str) {
        for outcome in &market.outcomes {
            if outcome.name == away_team {
                self.away_moneyline = Some(outcome.price.round() as i32);
            } else if outcome.name == home_team {
                self.home_moneyline = Some(outcome.price.round() as i32);
            }
        }
    }

    /// Extract spread lines by team name. The away-side outcome's price is
    /// the single shared spread price applied to both lines.
    fn spreads(&mut self, market: &MarketOdds, away_team: &str, home_team: &str) {
        for outcome in &market.outcomes {
            if outcome.name == away_team {
                self.away_spread = outcome.point.and_then(Decimal::from_f64);
                self.spread_price = Some(outcome.price.round() as i32);
            } else if outcome.name == home_team {
                self.home_spread = outcome.point.and_then(Decimal::from_f64);
            }
        }
    }

    /// Extract totals from the literally-named Over/Under outcomes.
    /// Over's point is the canonical total line; prices are recorded
    /// independently per side.
    fn totals(&mut self, market: &MarketOdds) {
        for outcome in &market.outcomes {
            if outcome.name == OUTCOME_OVER {
                self.total_line = outcome.point.and_then(Decimal::from_f64);
                self.over_price = Some(outcome.price.round() as i32);
            } else if outcome.name == OUTCOME_UNDER {
                self.under_price = Some(outcome.price.round() as i32);
            }
        }
    }

    /// Finalize into a `Quote` linked to the game's internal id.
    pub fn build(self, game_id: Uuid, bookmaker: &str) -> Quote {
        Quote {
            id: Uuid::new_v4(),
            game_id,
            bookmaker: bookmaker.to_string(),
            away_moneyline: self.away_moneyline,
            home_moneyline: self.home_moneyline,
            away_spread: self.away_spread,
            home_spread: self.home_spread,
            spread_price: self.spread_price,
            total_line: self.total_line,
            over_price: self.over_price,
            under_price: self.under_price,
            observed_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Select the bookmaker to normalize: the preferred key when present,
/// otherwise the first bookmaker in the payload.
fn select_bookmaker<'a>(payload: &'a GameOdds, preferred: &str) -> Option<&'a BookmakerOdds> {
    payload
        .bookmakers
        .iter()
        .find(|b| b.key == preferred)
        .or_else(|| payload.bookmakers.first())
}

/// Normalize one provider game payload into a canonical `Quote`.
///
/// Returns `None` when the payload contains zero bookmakers (no quote
/// producible — the caller records a per-item error and continues).
pub fn normalize_quote(game_id: Uuid, payload: &GameOdds, preferred: &str) -> Option<Quote> {
    let bookmaker = select_bookmaker(payload, preferred)?;

    let mut builder = QuoteBuilder::new();
    for market in &bookmaker.markets {
        match market.key.as_str() {
            MARKET_MONEYLINE => builder.moneyline(market, &payload.away_team, &payload.home_team),
            MARKET_SPREADS => builder.spreads(market, &payload.away_team, &payload.home_team),
            MARKET_TOTALS => builder.totals(market),
            other => debug!(market = other, "Skipping unrecognised market key"),
        }
    }

    Some(builder.build(game_id, &bookmaker.key))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
