//! Sample Sequence Generator
//!
//! Synthetic 14-day sequences for stations with no real data. Every field
//! is drawn independently and uniformly per day; there is no temporal
//! correlation. Pass a seeded RNG to `generate_with_rng` for
//! reproducible output.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::SEQUENCE_LENGTH;
use super::aggregator::DAY_FORMAT;
use super::measurement::{Measurement, Provenance, Station};

type Range = (f64, f64);

// Preset-independent ranges
const DAYS_DIFF: Range = (0.0, 2.0);
const COD_MN: Range = (2.0, 10.0);
const NH4N: Range = (0.1, 1.0);
const TPH: Range = (0.01, 0.5);
const DIP: Range = (0.01, 0.1);
const DIN: Range = (0.1, 1.0);
const CHLOROPHYLL_INDEX: Range = (0.1, 0.4);
const TURBIDITY_INDEX: Range = (0.1, 0.3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Good,
    #[default]
    Medium,
    Bad,
}

/// Inclusive ranges that vary with the preset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetRanges {
    pub ph: Range,
    pub oxygene_dissous: Range,
    pub cod: Range,
    pub ndwi: Range,
}

impl QualityPreset {
    /// Unknown names fall back to `Medium`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "good" => QualityPreset::Good,
            "bad" => QualityPreset::Bad,
            "medium" => QualityPreset::Medium,
            other => {
                log::debug!("Unknown quality preset '{}', using medium", other);
                QualityPreset::Medium
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Good => "good",
            QualityPreset::Medium => "medium",
            QualityPreset::Bad => "bad",
        }
    }

    pub fn ranges(&self) -> PresetRanges {
        match self {
            QualityPreset::Good => PresetRanges {
                ph: (7.0, 8.0),
                oxygene_dissous: (7.0, 10.0),
                cod: (5.0, 15.0),
                ndwi: (0.3, 0.5),
            },
            QualityPreset::Medium => PresetRanges {
                ph: (6.5, 8.5),
                oxygene_dissous: (5.0, 8.0),
                cod: (15.0, 30.0),
                ndwi: (0.2, 0.4),
            },
            QualityPreset::Bad => PresetRanges {
                ph: (5.5, 9.0),
                oxygene_dissous: (2.0, 5.0),
                cod: (30.0, 60.0),
                ndwi: (0.0, 0.2),
            },
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for QualityPreset {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

fn draw<R: Rng + ?Sized>(rng: &mut R, (low, high): Range) -> f64 {
    rng.gen_range(low..=high)
}

/// Generate with the thread RNG, ending now
pub fn generate(station: &Station, preset: impl Into<QualityPreset>) -> Vec<Measurement> {
    generate_with_rng(station, preset.into(), Utc::now(), &mut rand::thread_rng())
}

/// Generate 14 rows ending at `now`
pub fn generate_with_rng<R: Rng + ?Sized>(
    station: &Station,
    preset: QualityPreset,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Measurement> {
    let ranges = preset.ranges();

    (0..SEQUENCE_LENGTH)
        .map(|day_index| {
            let day_offset = (SEQUENCE_LENGTH - 1 - day_index) as i64;
            let day = (now - Duration::days(day_offset)).format(DAY_FORMAT).to_string();

            Measurement {
                day_index,
                sensor_date: day.clone(),
                satellite_date: day,
                sensor_timestamp: None,
                satellite_timestamp: None,
                days_diff: draw(rng, DAYS_DIFF),
                station_id: station.station_id,
                latitude: station.latitude,
                longitude: station.longitude,

                ph: draw(rng, ranges.ph),
                oxygene_dissous: draw(rng, ranges.oxygene_dissous),
                cod: draw(rng, ranges.cod),
                cod_mn: draw(rng, COD_MN),
                nh4n: draw(rng, NH4N),
                tph: draw(rng, TPH),
                dip: draw(rng, DIP),
                din: draw(rng, DIN),

                ndwi: draw(rng, ranges.ndwi),
                chlorophyll_index: draw(rng, CHLOROPHYLL_INDEX),
                turbidity_index: draw(rng, TURBIDITY_INDEX),

                provenance: Provenance::synthetic(),
            }
        })
        .collect()
}
