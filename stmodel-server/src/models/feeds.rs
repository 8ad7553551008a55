//! Feed diagnostics models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use stmodel_core::{SatelliteRecord, SensorRecord};

#[derive(Debug, Deserialize)]
pub struct FetchQuery {
    pub hours: Option<u32>,
}

/// Both feeds as fetched for one prediction
#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub capteurs: Vec<SensorRecord>,
    pub satellite: Vec<SatelliteRecord>,
    pub fetch_timestamp: DateTime<Utc>,
}

impl FeedSnapshot {
    pub fn is_empty(&self) -> bool {
        self.capteurs.is_empty() && self.satellite.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct FetchResponse {
    pub status: &'static str,
    pub capteurs_records: usize,
    pub satellite_records: usize,
    pub data: FeedSnapshot,
}
