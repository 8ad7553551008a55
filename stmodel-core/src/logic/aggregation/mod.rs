//! Aggregation Module - Feed alignment into fixed-length sequences
//!
//! Two independently sampled feeds go in, one 14-row `Measurement`
//! sequence comes out. The sample generator is a sibling entry point for
//! when the caller has no real data.

pub mod records;
pub mod measurement;
pub mod matcher;
pub mod aggregator;
pub mod sample;

pub use records::{
    parse_timestamp, CapteursFeed, SatelliteFeed, SatelliteIndices, SatelliteRecord,
    SensorReadings, SensorRecord, Timestamped,
};
pub use measurement::{Measurement, Provenance, RowSource, Station};
pub use matcher::{closest, closest_match, Match};
pub use aggregator::{aggregate, aggregate_at, defaulted_rows};
pub use sample::{generate, generate_with_rng, PresetRanges, QualityPreset};
