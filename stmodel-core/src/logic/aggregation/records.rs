//! Raw feed records (wire format)
//!
//! Mirrors the JSON payloads of the sensor and satellite services 1:1.
//! Every reading is optional and the timestamp is kept as the raw string:
//! a record with an unusable timestamp is skipped by the matcher rather
//! than failing the whole feed.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// ISO-8601 layouts with an offset that RFC 3339 rejects (no seconds,
/// or `+hhmm` without a colon).
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
];

/// Naive layouts accepted after the offset forms fail. Interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a feed timestamp.
///
/// - RFC 3339 (`Z` or offset) is converted to UTC
/// - other ISO-8601 forms with an offset are converted to UTC
/// - naive ISO-8601 date-time is taken as UTC
/// - a bare `YYYY-MM-DD` is midnight UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Anything that carries an (optionally parseable) timestamp
pub trait Timestamped {
    fn timestamp(&self) -> Option<DateTime<Utc>>;
}

/// Keeps string timestamps, drops everything else (numbers, objects, null)
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

// ============================================================================
// SENSOR FEED
// ============================================================================

/// In-situ readings (`mesures`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReadings {
    pub ph: Option<f64>,
    pub oxygene: Option<f64>,
    pub cod: Option<f64>,
    pub codmn: Option<f64>,
    pub nh4n: Option<f64>,
    pub tph: Option<f64>,
    pub dip: Option<f64>,
    pub din: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub mesures: SensorReadings,
}

impl SensorRecord {
    pub fn new(timestamp: impl Into<String>, mesures: SensorReadings) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            mesures,
        }
    }
}

impl Timestamped for SensorRecord {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_deref().and_then(parse_timestamp)
    }
}

/// `GET /api/capteurs/data/latest` envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapteursFeed {
    #[serde(default)]
    pub capteurs: Vec<SensorRecord>,
}

// ============================================================================
// SATELLITE FEED
// ============================================================================

/// Spectral indices (`indices`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SatelliteIndices {
    pub ndwi: Option<f64>,
    pub chlorophyll: Option<f64>,
    pub turbidity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SatelliteRecord {
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub indices: SatelliteIndices,
}

impl SatelliteRecord {
    pub fn new(timestamp: impl Into<String>, indices: SatelliteIndices) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            indices,
        }
    }
}

impl Timestamped for SatelliteRecord {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_deref().and_then(parse_timestamp)
    }
}

/// `GET /api/satellite/indices/latest` envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SatelliteFeed {
    #[serde(default)]
    pub indices: Vec<SatelliteRecord>,
}
