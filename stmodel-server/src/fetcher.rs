//! Feed Fetcher
//!
//! HTTP client for the sensor ("capteurs") and satellite services. Both
//! feeds are requested concurrently; a failed feed is an empty list.

use std::time::Duration;

use serde::de::DeserializeOwned;
use stmodel_core::constants::DEFAULT_FETCH_LIMIT;
use stmodel_core::{CapteursFeed, SatelliteFeed, SatelliteRecord, SensorRecord};

use crate::config::Config;
use crate::models::FeedSnapshot;

/// Feed client errors
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: {0}")]
    Server(u16),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Clone)]
pub struct DataFetcher {
    capteurs_url: String,
    satellite_url: String,
    http_client: reqwest::Client,
}

impl DataFetcher {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()?;

        Ok(Self {
            capteurs_url: config.capteurs_url.trim_end_matches('/').to_string(),
            satellite_url: config.satellite_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        hours: u32,
        limit: u32,
    ) -> Result<T, FetchError> {
        let response = self.http_client
            .get(url)
            .query(&[("hours", hours), ("limit", limit)])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Server(response.status().as_u16()));
        }

        response.json().await
            .map_err(|e| FetchError::Parse(e.to_string()))
    }

    /// Sensor records from the last `hours`
    pub async fn fetch_capteurs(&self, hours: u32, limit: u32) -> Vec<SensorRecord> {
        let url = format!("{}/api/capteurs/data/latest", self.capteurs_url);

        match self.get_json::<CapteursFeed>(&url, hours, limit).await {
            Ok(feed) => feed.capteurs,
            Err(e) => {
                tracing::warn!("Error fetching capteurs data: {}", e);
                Vec::new()
            }
        }
    }

    /// Satellite index records from the last `hours`
    pub async fn fetch_satellite(&self, hours: u32, limit: u32) -> Vec<SatelliteRecord> {
        let url = format!("{}/api/satellite/indices/latest", self.satellite_url);

        match self.get_json::<SatelliteFeed>(&url, hours, limit).await {
            Ok(feed) => feed.indices,
            Err(e) => {
                tracing::warn!("Error fetching satellite data: {}", e);
                Vec::new()
            }
        }
    }

    /// Both feeds in parallel
    pub async fn fetch_all(&self, hours: u32) -> FeedSnapshot {
        let (capteurs, satellite) = tokio::join!(
            self.fetch_capteurs(hours, DEFAULT_FETCH_LIMIT),
            self.fetch_satellite(hours, DEFAULT_FETCH_LIMIT),
        );

        tracing::info!(
            "Fetched {} capteur records, {} satellite records",
            capteurs.len(),
            satellite.len()
        );

        FeedSnapshot {
            capteurs,
            satellite,
            fetch_timestamp: chrono::Utc::now(),
        }
    }
}
