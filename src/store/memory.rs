//! In-memory store with JSON snapshot persistence.
//!
//! Holds all entities behind a single mutex and saves/loads the full
//! state to a JSON file between runs. Sufficient for the batch pipelines;
//! a SQL-backed store can replace it behind the same traits.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

use super::{GameStore, QuoteStore, WagerStore};
use crate::types::{Game, LinebookError, NewGame, Quote, Wager, WagerStatus};

/// Serializable snapshot of the full store state.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    games: Vec<Game>,
    quotes: Vec<Quote>,
    wagers: Vec<Wager>,
}

/// In-memory implementation of all three repository traits.
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Load a store from a JSON snapshot file.
    /// Starts fresh if the file doesn't exist.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            info!(path, "No saved state found, starting fresh");
            return Ok(Self::new());
        }

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state from {path}"))?;
        let state: StoreState = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse state from {path}"))?;

        info!(
            path,
            games = state.games.len(),
            quotes = state.quotes.len(),
            wagers = state.wagers.len(),
            "State loaded from disk"
        );

        Ok(Self {
            state: Mutex::new(state),
        })
    }

    /// Save the full store state to a JSON snapshot file.
    pub fn save(&self, path: &str) -> Result<()> {
        let state = self.lock()?;
        let json = serde_json::to_string_pretty(&*state)
            .context("Failed to serialise store state")?;
        std::fs::write(path, &json)
            .with_context(|| format!("Failed to write state to {path}"))?;

        debug!(path, games = state.games.len(), "State saved");
        Ok(())
    }

    /// Number of games currently held (test and report support).
    pub fn game_count(&self) -> usize {
        self.state.lock().map(|s| s.games.len()).unwrap_or(0)
    }

    /// Number of quotes currently held.
    pub fn quote_count(&self) -> usize {
        self.state.lock().map(|s| s.quotes.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| LinebookError::Store("state mutex poisoned".to_string()).into())
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn upsert_by_external_id(&self, new: NewGame) -> Result<Game> {
        let mut state = self.lock()?;

        if let Some(game) = state
            .games
            .iter_mut()
            .find(|g| g.external_id == new.external_id)
        {
            // Repeat sighting: only the scheduled time is mutable.
            game.commence_time = new.commence_time;
            game.updated_at = Utc::now();
            return Ok(game.clone());
        }

        let now = Utc::now();
        let game = Game {
            id: Uuid::new_v4(),
            external_id: new.external_id,
            sport: new.sport,
            commence_time: new.commence_time,
            away_team: new.away_team,
            home_team: new.home_team,
            away_score: None,
            home_score: None,
            completed: false,
            created_at: now,
            updated_at: now,
        };
        state.games.push(game.clone());
        Ok(game)
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Game>> {
        let state = self.lock()?;
        Ok(state
            .games
            .iter()
            .find(|g| g.external_id == external_id)
            .cloned())
    }

    async fn update_scores(
        &self,
        id: Uuid,
        away_score: Option<i32>,
        home_score: Option<i32>,
        completed: bool,
    ) -> Result<Game> {
        let mut state = self.lock()?;
        let game = state
            .games
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| LinebookError::GameNotFound(id.to_string()))?;

        game.away_score = away_score;
        game.home_score = home_score;
        // Completion never reverts once set.
        game.completed = game.completed || completed;
        game.updated_at = Utc::now();
        Ok(game.clone())
    }
}

#[async_trait]
impl WagerStore for MemoryStore {
    async fn insert(&self, wager: Wager) -> Result<()> {
        let mut state = self.lock()?;
        state.wagers.push(wager);
        Ok(())
    }

    async fn find_pending_by_game(&self, game_id: Uuid) -> Result<Vec<Wager>> {
        let state = self.lock()?;
        Ok(state
            .wagers
            .iter()
            .filter(|w| w.game_id == game_id && w.is_pending())
            .cloned()
            .collect())
    }

    async fn update_result(
        &self,
        wager_id: Uuid,
        status: WagerStatus,
        profit: Decimal,
    ) -> Result<()> {
        let mut state = self.lock()?;
        let wager = state
            .wagers
            .iter_mut()
            .find(|w| w.id == wager_id)
            .ok_or_else(|| LinebookError::WagerNotFound(wager_id.to_string()))?;

        if wager.status.is_terminal() {
            return Err(LinebookError::AlreadySettled(wager_id).into());
        }

        wager.status = status;
        wager.profit = Some(profit);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Wager>> {
        let state = self.lock()?;
        Ok(state.wagers.clone())
    }
}

#[async_trait]
impl QuoteStore for MemoryStore {
    async fn append(&self, quote: Quote) -> Result<()> {
        let mut state = self.lock()?;
        state.quotes.push(quote);
        Ok(())
    }

    async fn latest_for_game(&self, game_id: Uuid) -> Result<Option<Quote>> {
        let state = self.lock()?;
        Ok(state
            .quotes
            .iter()
            .filter(|q| q.game_id == game_id)
            .max_by_key(|q| q.observed_at)
            .cloned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
