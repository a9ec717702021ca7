//! Odds and scores provider integration.
//!
//! Defines the `OddsProvider` trait plus the raw payload shapes shared by
//! implementations, and provides the live The Odds API client.
//!
//! Pipelines treat a provider failure as a recoverable empty batch: the
//! trait surfaces `Result`, and the pipeline boundary catches errors into
//! a logged diagnostic rather than propagating them.

pub mod the_odds_api;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Raw payload types (provider JSON → Rust)
// ---------------------------------------------------------------------------

/// One game's market payload from the odds endpoint. We only deserialize
/// the fields we need.
#[derive(Debug, Clone, Deserialize)]
pub struct GameOdds {
    pub id: String,
    pub sport_key: String,
    pub commence_time: DateTime<Utc>,
    pub away_team: String,
    pub home_team: String,
    #[serde(default)]
    pub bookmakers: Vec<BookmakerOdds>,
}

/// One bookmaker's entry within a game payload.
#[derive(Debug, Clone, Deserialize)]
pub struct BookmakerOdds {
    pub key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub markets: Vec<MarketOdds>,
}

/// One market (`h2h`, `spreads`, `totals`) within a bookmaker entry.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketOdds {
    pub key: String,
    #[serde(default)]
    pub outcomes: Vec<OutcomeOdds>,
}

/// One named outcome with its price and optional line point.
#[derive(Debug, Clone, Deserialize)]
pub struct OutcomeOdds {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub point: Option<f64>,
}

/// One game's entry from the scores endpoint.
///
/// `scores` is absent for games that have not started; each side's score
/// arrives as a string. The array order is NOT guaranteed to be
/// away-then-home — consumers must match entries by team name.
#[derive(Debug, Clone, Deserialize)]
pub struct GameScore {
    pub id: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub scores: Option<Vec<TeamScore>>,
}

/// A single team's score entry within a score payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamScore {
    pub name: String,
    pub score: String,
}

impl GameScore {
    /// Look up the raw score string for a team by exact name match.
    pub fn score_for(&self, team: &str) -> Option<&str> {
        self.scores
            .as_deref()?
            .iter()
            .find(|s| s.name == team)
            .map(|s| s.score.as_str())
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Abstraction over the external odds/scores source.
///
/// An empty vec is a valid non-error response (no games scheduled).
#[async_trait]
pub trait OddsProvider: Send + Sync {
    /// Fetch the current per-game market payloads for one sport.
    async fn fetch_odds(&self, sport: &str) -> Result<Vec<GameOdds>>;

    /// Fetch score payloads for one sport, looking back `days_from` days.
    async fn fetch_scores(&self, sport: &str, days_from: u8) -> Result<Vec<GameScore>>;

    /// Provider name for logging and identification.
    fn name(&self) -> &str;
}
