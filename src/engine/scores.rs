//! Score ingestion pipeline.
//!
//! Orchestrates fetch → match-game → update-score/completion, and
//! triggers settlement for games that are completed with both scores
//! known. Scores are matched against the stored game's team names,
//! never by array position — provider score arrays are not guaranteed
//! ordered away-then-home, and swapped scores silently corrupt
//! settlement.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::settlement::SettlementEngine;
use crate::provider::{GameScore, OddsProvider};
use crate::store::{GameStore, WagerStore};
use crate::types::{Game, LinebookError, ScoresReport};

/// Runs score ingestion and downstream settlement for one sport.
pub struct ScoreIngestor {
    provider: Arc<dyn OddsProvider>,
    games: Arc<dyn GameStore>,
    settlement: SettlementEngine,
    days_from: u8,
}

impl ScoreIngestor {
    pub fn new(
        provider: Arc<dyn OddsProvider>,
        games: Arc<dyn GameStore>,
        wagers: Arc<dyn WagerStore>,
        days_from: u8,
    ) -> Self {
        Self {
            provider,
            games,
            settlement: SettlementEngine::new(wagers),
            days_from,
        }
    }

    /// Ingest the current score batch for one sport, settling any game
    /// the batch completes.
    pub async fn ingest_scores(&self, sport: &str) -> Result<ScoresReport> {
        if sport.trim().is_empty() {
            return Err(LinebookError::InvalidInput(
                "sport key must not be empty".to_string(),
            )
            .into());
        }

        info!(sport, days_from = self.days_from, "Starting score ingestion");

        let batch = match self.provider.fetch_scores(sport, self.days_from).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    error = %e,
                    "Scores fetch failed — treating as empty batch"
                );
                Vec::new()
            }
        };

        if batch.is_empty() {
            info!(sport, "Provider returned 0 scores");
            return Ok(ScoresReport::empty_batch());
        }

        let mut report = ScoresReport {
            games_updated: 0,
            wagers_graded: 0,
            total_games: batch.len(),
            errors: Vec::new(),
            advisory: None,
        };

        for entry in &batch {
            match self.process_entry(entry).await {
                Ok(Some(game)) => {
                    report.games_updated += 1;
                    if game.is_settleable() {
                        let outcome = self.settlement.settle_game(&game).await;
                        report.wagers_graded += outcome.graded;
                        report.errors.extend(outcome.errors);
                    }
                }
                // Game never seen during odds ingestion — not worth a
                // per-item error, just a log-level note.
                Ok(None) => debug!(external_id = %entry.id, "Score entry for unknown game, skipping"),
                Err(e) => {
                    warn!(external_id = %entry.id, error = %e, "Score entry skipped");
                    report.errors.push(e.to_string());
                }
            }
        }

        info!(
            sport,
            updated = report.games_updated,
            graded = report.wagers_graded,
            total = report.total_games,
            errors = report.errors.len(),
            "Score ingestion complete"
        );

        Ok(report)
    }

    /// Update one game's scores and completion from a score entry.
    /// Returns the updated game, or None when the game is unknown.
    async fn process_entry(&self, entry: &GameScore) -> Result<Option<Game>> {
        let game = match self
            .games
            .find_by_external_id(&entry.id)
            .await
            .with_context(|| format!("Failed to look up game {}", entry.id))?
        {
            Some(game) => game,
            None => return Ok(None),
        };

        // Match each side by stored team name. A missing or unparseable
        // entry leaves that side's score absent; such games update but
        // never settle.
        let away_score = parse_score(entry.score_for(&game.away_team));
        let home_score = parse_score(entry.score_for(&game.home_team));

        // Live scores are written through unconditionally so repeated
        // polling refines an in-progress game before completion.
        let updated = self
            .games
            .update_scores(game.id, away_score, home_score, entry.completed)
            .await
            .with_context(|| format!("Failed to update scores for game {}", entry.id))?;

        debug!(game = %updated, "Scores updated");
        Ok(Some(updated))
    }
}

/// Parse a provider score string; None on absent or unparseable input.
fn parse_score(raw: Option<&str>) -> Option<i32> {
    raw.and_then(|s| s.trim().parse::<i32>().ok())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{GameOdds, TeamScore};
    use crate::store::MemoryStore;
    use crate::types::{NewGame, Wager, WagerKind, WagerStatus};
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    const AWAY: &str = "Duke Blue Devils";
    const HOME: &str = "North Carolina Tar Heels";

    struct StaticProvider {
        scores: Vec<GameScore>,
        fail: bool,
    }

    #[async_trait]
    impl OddsProvider for StaticProvider {
        async fn fetch_odds(&self, _sport: &str) -> Result<Vec<GameOdds>> {
            Ok(Vec::new())
        }

        async fn fetch_scores(&self, _sport: &str, _days_from: u8) -> Result<Vec<GameScore>> {
            if self.fail {
                anyhow::bail!("simulated provider outage");
            }
            Ok(self.scores.clone())
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    fn score_entry(id: &str, completed: bool, scores: Vec<(&str, &str)>) -> GameScore {
        GameScore {
            id: id.to_string(),
            completed,
            scores: Some(
                scores
                    .into_iter()
                    .map(|(name, score)| TeamScore {
                        name: name.to_string(),
                        score: score.to_string(),
                    })
                    .collect(),
            ),
        }
    }

    async fn seed_game(store: &MemoryStore, external_id: &str) -> crate::types::Game {
        store
            .upsert_by_external_id(NewGame {
                external_id: external_id.to_string(),
                sport: "basketball_ncaab".to_string(),
                commence_time: Utc::now() - chrono::Duration::hours(2),
                away_team: AWAY.to_string(),
                home_team: HOME.to_string(),
            })
            .await
            .unwrap()
    }

    fn pending_moneyline(game_id: Uuid, team: &str) -> Wager {
        Wager {
            id: Uuid::new_v4(),
            bettor_id: "alice".to_string(),
            game_id,
            kind: WagerKind::Moneyline,
            team: Some(team.to_string()),
            line: None,
            price: 150,
            stake: dec!(100),
            status: WagerStatus::Pending,
            profit: None,
            placed_at: Utc::now(),
        }
    }

    fn ingestor(provider: StaticProvider, store: Arc<MemoryStore>) -> ScoreIngestor {
        ScoreIngestor::new(Arc::new(provider), store.clone(), store, 1)
    }

    #[tokio::test]
    async fn test_scores_matched_by_name_not_position() {
        let store = Arc::new(MemoryStore::new());
        seed_game(&store, "ext-1").await;

        // Provider lists the HOME team first — positional extraction
        // would swap the scores.
        let provider = StaticProvider {
            scores: vec![score_entry("ext-1", true, vec![(HOME, "65"), (AWAY, "70")])],
            fail: false,
        };

        let report = ingestor(provider, store.clone())
            .ingest_scores("basketball_ncaab")
            .await
            .unwrap();

        assert_eq!(report.games_updated, 1);
        let game = store.find_by_external_id("ext-1").await.unwrap().unwrap();
        assert_eq!(game.away_score, Some(70));
        assert_eq!(game.home_score, Some(65));
        assert!(game.completed);
    }

    #[tokio::test]
    async fn test_completion_triggers_settlement() {
        let store = Arc::new(MemoryStore::new());
        let game = seed_game(&store, "ext-1").await;
        store.insert(pending_moneyline(game.id, AWAY)).await.unwrap();
        store.insert(pending_moneyline(game.id, HOME)).await.unwrap();

        let provider = StaticProvider {
            scores: vec![score_entry("ext-1", true, vec![(AWAY, "70"), (HOME, "65")])],
            fail: false,
        };

        let report = ingestor(provider, store.clone())
            .ingest_scores("basketball_ncaab")
            .await
            .unwrap();

        assert_eq!(report.games_updated, 1);
        assert_eq!(report.wagers_graded, 2);

        let wagers = store.list_all().await.unwrap();
        assert!(wagers.iter().all(|w| w.status.is_terminal()));
    }

    #[tokio::test]
    async fn test_live_update_does_not_settle() {
        let store = Arc::new(MemoryStore::new());
        let game = seed_game(&store, "ext-1").await;
        store.insert(pending_moneyline(game.id, AWAY)).await.unwrap();

        let provider = StaticProvider {
            scores: vec![score_entry("ext-1", false, vec![(AWAY, "40"), (HOME, "38")])],
            fail: false,
        };

        let report = ingestor(provider, store.clone())
            .ingest_scores("basketball_ncaab")
            .await
            .unwrap();

        assert_eq!(report.games_updated, 1);
        assert_eq!(report.wagers_graded, 0);

        // Live scores recorded for later refinement
        let game = store.find_by_external_id("ext-1").await.unwrap().unwrap();
        assert_eq!(game.away_score, Some(40));
        assert!(!game.completed);
        assert_eq!(store.find_pending_by_game(game.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_completed_with_missing_score_never_settles() {
        let store = Arc::new(MemoryStore::new());
        let game = seed_game(&store, "ext-1").await;
        store.insert(pending_moneyline(game.id, AWAY)).await.unwrap();

        // Only one side present in the payload
        let provider = StaticProvider {
            scores: vec![score_entry("ext-1", true, vec![(AWAY, "70")])],
            fail: false,
        };

        let report = ingestor(provider, store.clone())
            .ingest_scores("basketball_ncaab")
            .await
            .unwrap();

        assert_eq!(report.games_updated, 1);
        assert_eq!(report.wagers_graded, 0);

        let game = store.find_by_external_id("ext-1").await.unwrap().unwrap();
        assert!(game.completed);
        assert_eq!(game.home_score, None);
    }

    #[tokio::test]
    async fn test_unparseable_score_yields_none() {
        let store = Arc::new(MemoryStore::new());
        seed_game(&store, "ext-1").await;

        let provider = StaticProvider {
            scores: vec![score_entry("ext-1", true, vec![(AWAY, "70"), (HOME, "n/a")])],
            fail: false,
        };

        ingestor(provider, store.clone())
            .ingest_scores("basketball_ncaab")
            .await
            .unwrap();

        let game = store.find_by_external_id("ext-1").await.unwrap().unwrap();
        assert_eq!(game.away_score, Some(70));
        assert_eq!(game.home_score, None);
    }

    #[tokio::test]
    async fn test_unknown_game_skipped_silently() {
        let store = Arc::new(MemoryStore::new());

        let provider = StaticProvider {
            scores: vec![score_entry("never-seen", true, vec![(AWAY, "70"), (HOME, "65")])],
            fail: false,
        };

        let report = ingestor(provider, store)
            .ingest_scores("basketball_ncaab")
            .await
            .unwrap();

        assert_eq!(report.games_updated, 0);
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_polling_refines_then_settles_once() {
        let store = Arc::new(MemoryStore::new());
        let game = seed_game(&store, "ext-1").await;
        store.insert(pending_moneyline(game.id, AWAY)).await.unwrap();

        // First poll: live
        let live = StaticProvider {
            scores: vec![score_entry("ext-1", false, vec![(AWAY, "40"), (HOME, "38")])],
            fail: false,
        };
        ingestor(live, store.clone()).ingest_scores("basketball_ncaab").await.unwrap();

        // Second poll: final
        let done = StaticProvider {
            scores: vec![score_entry("ext-1", true, vec![(AWAY, "70"), (HOME, "65")])],
            fail: false,
        };
        let report = ingestor(done, store.clone())
            .ingest_scores("basketball_ncaab")
            .await
            .unwrap();
        assert_eq!(report.wagers_graded, 1);

        // Third poll repeats the final score: nothing left to grade
        let repeat = StaticProvider {
            scores: vec![score_entry("ext-1", true, vec![(AWAY, "70"), (HOME, "65")])],
            fail: false,
        };
        let report = ingestor(repeat, store.clone())
            .ingest_scores("basketball_ncaab")
            .await
            .unwrap();
        assert_eq!(report.games_updated, 1);
        assert_eq!(report.wagers_graded, 0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_advisory_success() {
        let store = Arc::new(MemoryStore::new());
        let provider = StaticProvider { scores: vec![], fail: false };

        let report = ingestor(provider, store)
            .ingest_scores("basketball_ncaab")
            .await
            .unwrap();

        assert_eq!(report.games_updated, 0);
        assert!(report.advisory.is_some());
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_empty() {
        let store = Arc::new(MemoryStore::new());
        let provider = StaticProvider { scores: vec![], fail: true };

        let report = ingestor(provider, store)
            .ingest_scores("basketball_ncaab")
            .await
            .unwrap();

        assert_eq!(report.games_updated, 0);
        assert!(report.advisory.is_some());
    }

    #[tokio::test]
    async fn test_rejects_empty_sport_before_io() {
        let store = Arc::new(MemoryStore::new());
        let provider = StaticProvider { scores: vec![], fail: false };

        let result = ingestor(provider, store).ingest_scores("").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score(Some("70")), Some(70));
        assert_eq!(parse_score(Some(" 70 ")), Some(70));
        assert_eq!(parse_score(Some("n/a")), None);
        assert_eq!(parse_score(Some("")), None);
        assert_eq!(parse_score(None), None);
    }
}
