//! Persistence layer.
//!
//! Defines one repository trait per entity — each exposing only the
//! operations the pipelines need — plus an in-memory implementation with
//! JSON snapshot load/save. Storage technology stays behind these seams;
//! a database-backed implementation can be swapped in without touching
//! the engine.

pub mod memory;

pub use memory::MemoryStore;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::types::{Game, NewGame, Quote, Wager, WagerStatus};

/// Game records, keyed by the provider's stable external identifier.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Create the game on first sight; on a repeat sighting update only
    /// the scheduled start time. Teams and identity are immutable
    /// post-creation.
    async fn upsert_by_external_id(&self, new: NewGame) -> Result<Game>;

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Game>>;

    /// Write the latest scores and completion flag. Completion is
    /// monotonic: once a game is completed it never reverts.
    async fn update_scores(
        &self,
        id: Uuid,
        away_score: Option<i32>,
        home_score: Option<i32>,
        completed: bool,
    ) -> Result<Game>;
}

/// Wager records. Placement inserts; settlement reads pending and writes
/// results exactly once.
#[async_trait]
pub trait WagerStore: Send + Sync {
    async fn insert(&self, wager: Wager) -> Result<()>;

    /// All wagers still awaiting settlement for one game. The PENDING
    /// filter here is the exclusivity mechanism preventing re-grading.
    async fn find_pending_by_game(&self, game_id: Uuid) -> Result<Vec<Wager>>;

    /// Persist a grading outcome. Fails if the wager is already terminal.
    async fn update_result(
        &self,
        wager_id: Uuid,
        status: WagerStatus,
        profit: Decimal,
    ) -> Result<()>;

    async fn list_all(&self) -> Result<Vec<Wager>>;
}

/// Append-only quote history per game.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    async fn append(&self, quote: Quote) -> Result<()>;

    /// The latest quote by observation time — authoritative for new wagers.
    async fn latest_for_game(&self, game_id: Uuid) -> Result<Option<Quote>>;
}
