//! LINEBOOK — Sports Odds Ingestion & Wager Settlement Engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! restores the store snapshot from disk (or starts fresh), runs the
//! requested pipeline(s) once, and prints the run reports. Triggering
//! cadence is the caller's concern — there is no scheduler here.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use linebook::analytics;
use linebook::config::AppConfig;
use linebook::engine::{OddsIngestor, ScoreIngestor};
use linebook::provider::the_odds_api::TheOddsApiClient;
use linebook::store::{MemoryStore, WagerStore};

const BANNER: &str = r#"
 _     ___ _   _ _____ ____   ___   ___  _  __
| |   |_ _| \ | | ____| __ ) / _ \ / _ \| |/ /
| |    | ||  \| |  _| |  _ \| | | | | | | ' /
| |___ | || |\  | |___| |_) | |_| | |_| | . \
|_____|___|_| \_|_____|____/ \___/ \___/|_|\_\

  Sports Odds Ingestion & Wager Settlement Engine
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    println!("{BANNER}");

    let command = std::env::args().nth(1).unwrap_or_else(|| "cycle".to_string());
    let sport = std::env::args()
        .nth(2)
        .unwrap_or_else(|| cfg.sports.default_sport.clone());

    info!(%command, %sport, state_file = %cfg.store.state_file, "LINEBOOK starting");

    // -- Initialise components -------------------------------------------

    let api_key = AppConfig::resolve_env(&cfg.provider.api_key_env)?;
    let provider = Arc::new(TheOddsApiClient::new(&cfg.provider, api_key)?);
    let store = Arc::new(MemoryStore::load(&cfg.store.state_file)?);

    let odds = OddsIngestor::new(
        provider.clone(),
        store.clone(),
        store.clone(),
        &cfg.provider.preferred_bookmaker,
    );
    let scores = ScoreIngestor::new(
        provider.clone(),
        store.clone(),
        store.clone(),
        cfg.provider.scores_days_from,
    );

    // -- Run the requested pipelines -------------------------------------

    match command.as_str() {
        "odds" => {
            let report = odds.ingest(&sport).await?;
            println!("{report}");
        }
        "scores" => {
            let report = scores.ingest_scores(&sport).await?;
            println!("{report}");
        }
        "cycle" => {
            let odds_report = odds.ingest(&sport).await?;
            println!("{odds_report}");
            let scores_report = scores.ingest_scores(&sport).await?;
            println!("{scores_report}");
        }
        other => {
            anyhow::bail!("Unknown command '{other}' — expected odds, scores, or cycle");
        }
    }

    // -- Persist and summarise --------------------------------------------

    store.save(&cfg.store.state_file)?;

    let wagers = store.list_all().await?;
    if !wagers.is_empty() {
        println!("\nLeaderboard:");
        for entry in analytics::leaderboard(&wagers) {
            println!("  {entry}");
        }
    }

    info!("LINEBOOK done.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("linebook=info"));

    let json_logging = std::env::var("LINEBOOK_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
