//! Odds ingestion pipeline.
//!
//! Orchestrates fetch → normalize → upsert-game → attach-quote for one
//! sport's batch. Items are isolated: one game's failure is recorded in
//! the run report and the batch continues. A provider failure degrades
//! to an empty batch; an empty batch is a zero-progress success with an
//! advisory, never an error.

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::market::normalize_quote;
use crate::provider::{GameOdds, OddsProvider};
use crate::store::{GameStore, QuoteStore};
use crate::types::{IngestReport, LinebookError, NewGame};

/// Runs odds ingestion for one sport at a time.
pub struct OddsIngestor {
    provider: Arc<dyn OddsProvider>,
    games: Arc<dyn GameStore>,
    quotes: Arc<dyn QuoteStore>,
    preferred_bookmaker: String,
}

impl OddsIngestor {
    pub fn new(
        provider: Arc<dyn OddsProvider>,
        games: Arc<dyn GameStore>,
        quotes: Arc<dyn QuoteStore>,
        preferred_bookmaker: &str,
    ) -> Self {
        Self {
            provider,
            games,
            quotes,
            preferred_bookmaker: preferred_bookmaker.to_string(),
        }
    }

    /// Ingest the current odds batch for one sport.
    ///
    /// Returns a report even on partial failure; the only hard error is
    /// a malformed request (empty sport key), rejected before any I/O.
    pub async fn ingest(&self, sport: &str) -> Result<IngestReport> {
        if sport.trim().is_empty() {
            return Err(LinebookError::InvalidInput(
                "sport key must not be empty".to_string(),
            )
            .into());
        }

        info!(sport, "Starting odds ingestion");

        let batch = match self.provider.fetch_odds(sport).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    error = %e,
                    "Odds fetch failed — treating as empty batch"
                );
                Vec::new()
            }
        };

        if batch.is_empty() {
            info!(sport, "Provider returned 0 games");
            return Ok(IngestReport::empty_batch());
        }

        let mut report = IngestReport {
            games_processed: 0,
            total_games: batch.len(),
            errors: Vec::new(),
            advisory: None,
        };

        for payload in &batch {
            match self.process_game(payload).await {
                Ok(()) => report.games_processed += 1,
                Err(e) => {
                    warn!(external_id = %payload.id, error = %e, "Game skipped");
                    report.errors.push(e.to_string());
                }
            }
        }

        info!(
            sport,
            processed = report.games_processed,
            total = report.total_games,
            errors = report.errors.len(),
            "Odds ingestion complete"
        );

        Ok(report)
    }

    /// Upsert one game and append its normalized quote.
    async fn process_game(&self, payload: &GameOdds) -> Result<()> {
        let game = self
            .games
            .upsert_by_external_id(NewGame {
                external_id: payload.id.clone(),
                sport: payload.sport_key.clone(),
                commence_time: payload.commence_time,
                away_team: payload.away_team.clone(),
                home_team: payload.home_team.clone(),
            })
            .await
            .with_context(|| format!("Failed to upsert game {}", payload.id))?;

        let quote = normalize_quote(game.id, payload, &self.preferred_bookmaker)
            .ok_or_else(|| {
                anyhow!(
                    "No bookmaker data for {} @ {}",
                    payload.away_team,
                    payload.home_team
                )
            })?;

        self.quotes
            .append(quote)
            .await
            .with_context(|| format!("Failed to append quote for game {}", payload.id))?;

        debug!(
            external_id = %payload.id,
            matchup = format!("{} @ {}", payload.away_team, payload.home_team),
            "Game processed"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
