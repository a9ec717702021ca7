//! Core engine — ingestion pipelines and wager settlement.

pub mod odds;
pub mod scores;
pub mod settlement;

pub use odds::OddsIngestor;
pub use scores::ScoreIngestor;
pub use settlement::{grade, SettlementEngine, SettlementOutcome};
