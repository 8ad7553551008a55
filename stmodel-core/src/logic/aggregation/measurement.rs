//! Measurement - one day of the model input sequence
//!
//! Serialized field names match the prediction API (`pH`, `COD`, ...).
//! The provenance and matched timestamps are diagnostics only and never
//! reach the model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Station the sequence is built for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub station_id: i64,
    pub latitude: f64,
    pub longitude: f64,
}

impl Station {
    pub fn new(station_id: i64, latitude: f64, longitude: f64) -> Self {
        Self { station_id, latitude, longitude }
    }
}

/// Where a row's values came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RowSource {
    /// Matched a real feed record
    Measured,
    /// No record matched, documented defaults used
    Defaulted,
    /// Drawn by the sample generator
    Synthetic,
    /// Provided as-is by the caller
    #[default]
    Supplied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Provenance {
    pub sensor: RowSource,
    pub satellite: RowSource,
}

impl Provenance {
    pub fn synthetic() -> Self {
        Self {
            sensor: RowSource::Synthetic,
            satellite: RowSource::Synthetic,
        }
    }

    /// Neither feed contributed to this row
    pub fn is_fully_defaulted(&self) -> bool {
        self.sensor == RowSource::Defaulted && self.satellite == RowSource::Defaulted
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// 0 = oldest day
    #[serde(default)]
    pub day_index: usize,
    #[serde(rename = "date_capteur")]
    pub sensor_date: String,
    #[serde(rename = "date_satellite")]
    pub satellite_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satellite_timestamp: Option<DateTime<Utc>>,
    pub days_diff: f64,
    pub station_id: i64,
    pub latitude: f64,
    pub longitude: f64,

    // Sensor
    #[serde(rename = "pH")]
    pub ph: f64,
    pub oxygene_dissous: f64,
    #[serde(rename = "COD")]
    pub cod: f64,
    #[serde(rename = "CODMn")]
    pub cod_mn: f64,
    #[serde(rename = "NH4N")]
    pub nh4n: f64,
    #[serde(rename = "TPH")]
    pub tph: f64,
    #[serde(rename = "DIP")]
    pub dip: f64,
    #[serde(rename = "DIN")]
    pub din: f64,

    // Satellite
    #[serde(rename = "NDWI")]
    pub ndwi: f64,
    pub chlorophyll_index: f64,
    pub turbidity_index: f64,

    #[serde(default)]
    pub provenance: Provenance,
}
