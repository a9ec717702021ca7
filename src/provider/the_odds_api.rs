//! The Odds API integration.
//!
//! Live source for per-game bookmaker odds and final scores.
//!
//! API docs: https://the-odds-api.com/liveapi/guides/v4/
//! Base URL: https://api.the-odds-api.com/v4/
//! Auth: `apiKey` query parameter. Paid tiers are quota-metered per
//! market region, so each fetch requests only the configured markets.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{GameOdds, GameScore, OddsProvider};
use crate::config::ProviderConfig;

const PROVIDER_NAME: &str = "the-odds-api";

/// The Odds API client.
pub struct TheOddsApiClient {
    http: Client,
    base_url: String,
    api_key: String,
    regions: String,
    markets: String,
    odds_format: String,
}

impl TheOddsApiClient {
    /// Create a new client from provider config plus the resolved API key.
    pub fn new(cfg: &ProviderConfig, api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .user_agent("LINEBOOK/0.1.0")
            .build()
            .context("Failed to build HTTP client for The Odds API")?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            regions: cfg.regions.clone(),
            markets: cfg.markets.clone(),
            odds_format: cfg.odds_format.clone(),
        })
    }

    /// Issue a GET and deserialize the JSON body, surfacing non-2xx
    /// statuses as errors with the response body attached.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let resp = self
            .http
            .get(url)
            .query(query)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .context("The Odds API request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("The Odds API error {status}: {body}");
        }

        resp.json::<T>()
            .await
            .context("Failed to parse The Odds API response")
    }
}

#[async_trait]
impl OddsProvider for TheOddsApiClient {
    async fn fetch_odds(&self, sport: &str) -> Result<Vec<GameOdds>> {
        let url = format!(
            "{}/sports/{}/odds/",
            self.base_url,
            urlencoding::encode(sport),
        );

        debug!(sport, markets = %self.markets, "Fetching odds from The Odds API");

        let games: Vec<GameOdds> = self
            .get_json(
                &url,
                &[
                    ("regions", self.regions.as_str()),
                    ("markets", self.markets.as_str()),
                    ("oddsFormat", self.odds_format.as_str()),
                ],
            )
            .await?;

        debug!(sport, count = games.len(), "Odds fetched");
        Ok(games)
    }

    async fn fetch_scores(&self, sport: &str, days_from: u8) -> Result<Vec<GameScore>> {
        let url = format!(
            "{}/sports/{}/scores/",
            self.base_url,
            urlencoding::encode(sport),
        );
        let days = days_from.to_string();

        debug!(sport, days_from, "Fetching scores from The Odds API");

        let scores: Vec<GameScore> = self
            .get_json(&url, &[("daysFrom", days.as_str())])
            .await?;

        debug!(sport, count = scores.len(), "Scores fetched");
        Ok(scores)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}
