//! Shared types for the LINEBOOK engine.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that provider, store, and
//! engine modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// A single scheduled game, created on first odds sighting and updated
/// by the score pipeline until completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    /// Provider-assigned identifier. Unique and immutable once created.
    pub external_id: String,
    /// Provider sport key, e.g. "basketball_ncaab".
    pub sport: String,
    /// Scheduled start time. The only mutable field during odds ingestion.
    pub commence_time: DateTime<Utc>,
    pub away_team: String,
    pub home_team: String,
    /// Final (or latest live) scores. None until the score feed reports them.
    pub away_score: Option<i32>,
    pub home_score: Option<i32>,
    /// Monotonic: once true, never reverts.
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.away_score, self.home_score) {
            (Some(a), Some(h)) => write!(
                f,
                "{} {} @ {} {} [{}]",
                self.away_team,
                a,
                self.home_team,
                h,
                if self.completed { "FINAL" } else { "LIVE" },
            ),
            _ => write!(f, "{} @ {}", self.away_team, self.home_team),
        }
    }
}

impl Game {
    /// Whether both final scores are known (required before settlement).
    pub fn has_both_scores(&self) -> bool {
        self.away_score.is_some() && self.home_score.is_some()
    }

    /// Whether this game is ready to settle: completed with both scores.
    pub fn is_settleable(&self) -> bool {
        self.completed && self.has_both_scores()
    }

    /// Whether the given name matches one of this game's teams.
    pub fn has_team(&self, name: &str) -> bool {
        self.away_team == name || self.home_team == name
    }

    /// Helper to build a sample game for tests.
    #[cfg(test)]
    pub fn sample() -> Self {
        Game {
            id: Uuid::new_v4(),
            external_id: "ext-001".to_string(),
            sport: "basketball_ncaab".to_string(),
            commence_time: Utc::now() + chrono::Duration::hours(6),
            away_team: "Duke Blue Devils".to_string(),
            home_team: "North Carolina Tar Heels".to_string(),
            away_score: None,
            home_score: None,
            completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

/// Creation fields for a game upsert. Teams and external id are immutable
/// after first sight; on a repeat sighting only `commence_time` is applied.
#[derive(Debug, Clone)]
pub struct NewGame {
    pub external_id: String,
    pub sport: String,
    pub commence_time: DateTime<Utc>,
    pub away_team: String,
    pub home_team: String,
}

// ---------------------------------------------------------------------------
// Quote
// ---------------------------------------------------------------------------

/// One bookmaker's snapshot of the lines for one game at one point in time.
///
/// Every market field is optional: a provider payload missing a market
/// leaves the field absent rather than defaulted — "no line" is not
/// "a line of 0". Quotes are append-only; the latest by `observed_at`
/// is authoritative for new wagers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    pub game_id: Uuid,
    /// Source bookmaker key, e.g. "draftkings".
    pub bookmaker: String,
    /// Moneyline prices in American odds.
    pub away_moneyline: Option<i32>,
    pub home_moneyline: Option<i32>,
    /// Spread lines per side, plus the shared spread price.
    pub away_spread: Option<Decimal>,
    pub home_spread: Option<Decimal>,
    pub spread_price: Option<i32>,
    /// Canonical total line with per-side prices.
    pub total_line: Option<Decimal>,
    pub over_price: Option<i32>,
    pub under_price: Option<i32>,
    pub observed_at: DateTime<Utc>,
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let (Some(a), Some(h)) = (self.away_moneyline, self.home_moneyline) {
            parts.push(format!("ML {a:+}/{h:+}"));
        }
        if let Some(s) = self.away_spread {
            parts.push(format!("spread {s}"));
        }
        if let Some(t) = self.total_line {
            parts.push(format!("total {t}"));
        }
        if parts.is_empty() {
            write!(f, "[{}] no markets", self.bookmaker)
        } else {
            write!(f, "[{}] {}", self.bookmaker, parts.join(" | "))
        }
    }
}

impl Quote {
    /// Whether both moneyline sides were resolvable.
    pub fn has_moneyline(&self) -> bool {
        self.away_moneyline.is_some() && self.home_moneyline.is_some()
    }

    /// Whether a spread line and its price were resolvable.
    pub fn has_spread(&self) -> bool {
        self.away_spread.is_some() && self.spread_price.is_some()
    }

    /// Whether a total line was resolvable.
    pub fn has_total(&self) -> bool {
        self.total_line.is_some()
    }

    /// Whether no market at all was resolvable.
    pub fn is_empty(&self) -> bool {
        self.away_moneyline.is_none()
            && self.home_moneyline.is_none()
            && self.away_spread.is_none()
            && self.home_spread.is_none()
            && self.total_line.is_none()
            && self.over_price.is_none()
            && self.under_price.is_none()
    }
}

// ---------------------------------------------------------------------------
// Wager
// ---------------------------------------------------------------------------

/// The category of a wager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WagerKind {
    Moneyline,
    Spread,
    TotalOver,
    TotalUnder,
}

impl WagerKind {
    /// All known kinds (useful for iteration).
    pub const ALL: &'static [WagerKind] = &[
        WagerKind::Moneyline,
        WagerKind::Spread,
        WagerKind::TotalOver,
        WagerKind::TotalUnder,
    ];

    /// Whether this kind requires a selected team.
    pub fn requires_team(&self) -> bool {
        matches!(self, WagerKind::Moneyline | WagerKind::Spread)
    }

    /// Whether this kind requires a line value.
    pub fn requires_line(&self) -> bool {
        !matches!(self, WagerKind::Moneyline)
    }
}

impl fmt::Display for WagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WagerKind::Moneyline => write!(f, "MONEYLINE"),
            WagerKind::Spread => write!(f, "SPREAD"),
            WagerKind::TotalOver => write!(f, "TOTAL_OVER"),
            WagerKind::TotalUnder => write!(f, "TOTAL_UNDER"),
        }
    }
}

impl std::str::FromStr for WagerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MONEYLINE" | "ML" => Ok(WagerKind::Moneyline),
            "SPREAD" => Ok(WagerKind::Spread),
            "TOTAL_OVER" | "OVER" => Ok(WagerKind::TotalOver),
            "TOTAL_UNDER" | "UNDER" => Ok(WagerKind::TotalUnder),
            _ => Err(anyhow::anyhow!("Unknown wager kind: {s}")),
        }
    }
}

/// Lifecycle status of a wager. Transitions exactly once:
/// `Pending` → one of `{Won, Lost, Push}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WagerStatus {
    Pending,
    Won,
    Lost,
    Push,
}

impl WagerStatus {
    /// Whether this status is terminal (already graded).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WagerStatus::Pending)
    }
}

impl fmt::Display for WagerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WagerStatus::Pending => write!(f, "PENDING"),
            WagerStatus::Won => write!(f, "WON"),
            WagerStatus::Lost => write!(f, "LOST"),
            WagerStatus::Push => write!(f, "PUSH"),
        }
    }
}

/// A user's bet against a line, with stake and price fixed at placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wager {
    pub id: Uuid,
    pub bettor_id: String,
    pub game_id: Uuid,
    pub kind: WagerKind,
    /// Selected team. Absent for totals.
    pub team: Option<String>,
    /// Spread or total line. Absent for moneyline.
    pub line: Option<Decimal>,
    /// American odds: >= +100 or <= -100, never in (-100, 100).
    pub price: i32,
    /// Amount wagered. Always positive.
    pub stake: Decimal,
    pub status: WagerStatus,
    /// Non-null iff status != Pending. Exactly 0 on Push.
    pub profit: Option<Decimal>,
    pub placed_at: DateTime<Utc>,
}

impl fmt::Display for Wager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}{} @ {:+} stake=${}",
            self.status,
            self.kind,
            self.team.as_deref().unwrap_or(""),
            self.line.map(|l| format!(" {l}")).unwrap_or_default(),
            self.price,
            self.stake,
        )
    }
}

impl Wager {
    /// Whether this wager is still awaiting settlement.
    pub fn is_pending(&self) -> bool {
        self.status == WagerStatus::Pending
    }
}

/// Whether a price is a well-formed American odds value:
/// a nonzero integer at or beyond ±100.
pub fn is_valid_american_price(price: i32) -> bool {
    price >= 100 || price <= -100
}

// ---------------------------------------------------------------------------
// Run reports
// ---------------------------------------------------------------------------

/// Result of one odds ingestion run, returned to the caller.
///
/// A non-empty `errors` with `games_processed > 0` is partial success,
/// not failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// Games fully processed (upserted, with a quote appended).
    pub games_processed: usize,
    /// Games present in the provider batch.
    pub total_games: usize,
    /// Per-item failures. The batch continues past each.
    pub errors: Vec<String>,
    /// Set when the provider returned zero games — ambiguous between
    /// off-season and a transient provider issue, so not an error.
    pub advisory: Option<String>,
}

impl IngestReport {
    /// An empty-batch report carrying the standard advisory.
    pub fn empty_batch() -> Self {
        IngestReport {
            games_processed: 0,
            total_games: 0,
            errors: Vec::new(),
            advisory: Some(
                "Provider returned 0 games (off-season or transient provider issue)".to_string(),
            ),
        }
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Odds run: {}/{} games processed, {} error(s){}",
            self.games_processed,
            self.total_games,
            self.errors.len(),
            self.advisory
                .as_deref()
                .map(|a| format!(" — {a}"))
                .unwrap_or_default(),
        )
    }
}

/// Result of one score ingestion run, returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoresReport {
    /// Games whose scores/completion were updated.
    pub games_updated: usize,
    /// Wagers graded across all newly completed games.
    pub wagers_graded: usize,
    /// Score entries present in the provider batch.
    pub total_games: usize,
    pub errors: Vec<String>,
    pub advisory: Option<String>,
}

impl ScoresReport {
    /// An empty-batch report carrying the standard advisory.
    pub fn empty_batch() -> Self {
        ScoresReport {
            games_updated: 0,
            wagers_graded: 0,
            total_games: 0,
            errors: Vec::new(),
            advisory: Some("Provider returned 0 scores".to_string()),
        }
    }
}

impl fmt::Display for ScoresReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scores run: {}/{} games updated, {} wager(s) graded, {} error(s)",
            self.games_updated,
            self.total_games,
            self.wagers_graded,
            self.errors.len(),
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for LINEBOOK.
#[derive(Debug, thiserror::Error)]
pub enum LinebookError {
    #[error("Provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Game not found: {0}")]
    GameNotFound(String),

    #[error("Wager not found: {0}")]
    WagerNotFound(String),

    #[error("Wager {0} is already settled")]
    AlreadySettled(Uuid),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
