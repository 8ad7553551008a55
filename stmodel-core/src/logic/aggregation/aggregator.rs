//! Sequence Aggregator
//!
//! Builds the `num_days`-row sequence (oldest first) by matching each day
//! against both feeds independently. A missing record or a missing field
//! falls back to the documented default, so the output length never
//! depends on input sparsity.

use chrono::{DateTime, Duration, Utc};

use crate::constants::SEQUENCE_LENGTH;
use super::matcher::{closest_match, Match};
use super::measurement::{Measurement, Provenance, RowSource, Station};
use super::records::{SatelliteIndices, SatelliteRecord, SensorReadings, SensorRecord};

/// Field defaults used when a day has no value
pub mod defaults {
    pub const PH: f64 = 7.5;
    pub const OXYGENE_DISSOUS: f64 = 8.0;
    pub const COD: f64 = 15.0;
    pub const COD_MN: f64 = 5.0;
    pub const NH4N: f64 = 0.5;
    pub const TPH: f64 = 0.1;
    pub const DIP: f64 = 0.05;
    pub const DIN: f64 = 0.5;
    pub const NDWI: f64 = 0.3;
    pub const CHLOROPHYLL_INDEX: f64 = 0.2;
    pub const TURBIDITY_INDEX: f64 = 0.15;
}

pub(crate) const DAY_FORMAT: &str = "%Y-%m-%d";

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Aggregate the trailing 14 days ending now
pub fn aggregate(
    sensor_records: &[SensorRecord],
    satellite_records: &[SatelliteRecord],
    station: &Station,
) -> Vec<Measurement> {
    aggregate_at(sensor_records, satellite_records, station, SEQUENCE_LENGTH, Utc::now())
}

/// Aggregate `num_days` days ending at `now`
pub fn aggregate_at(
    sensor_records: &[SensorRecord],
    satellite_records: &[SatelliteRecord],
    station: &Station,
    num_days: usize,
    now: DateTime<Utc>,
) -> Vec<Measurement> {
    let mut measurements = Vec::with_capacity(num_days);

    for day_index in 0..num_days {
        let day_offset = (num_days - 1 - day_index) as i64;
        let target = now - Duration::days(day_offset);

        let sensor = closest_match(sensor_records, target);
        let satellite = closest_match(satellite_records, target);

        measurements.push(build_row(day_index, target, station, sensor, satellite));
    }

    let defaulted = defaulted_rows(&measurements);
    if defaulted > 0 {
        log::debug!(
            "Station {}: {}/{} days fully defaulted ({} sensor, {} satellite records)",
            station.station_id,
            defaulted,
            num_days,
            sensor_records.len(),
            satellite_records.len()
        );
    }

    measurements
}

fn build_row(
    day_index: usize,
    target: DateTime<Utc>,
    station: &Station,
    sensor: Option<Match<'_, SensorRecord>>,
    satellite: Option<Match<'_, SatelliteRecord>>,
) -> Measurement {
    let empty_readings = SensorReadings::default();
    let empty_indices = SatelliteIndices::default();

    let mesures = sensor.map(|m| &m.record.mesures).unwrap_or(&empty_readings);
    let indices = satellite.map(|m| &m.record.indices).unwrap_or(&empty_indices);

    let days_diff = match (sensor, satellite) {
        (Some(s), Some(g)) => (s.timestamp - g.timestamp).num_milliseconds().abs() as f64 / MILLIS_PER_DAY,
        _ => 0.0,
    };

    let source = |matched: bool| if matched { RowSource::Measured } else { RowSource::Defaulted };
    let day = target.format(DAY_FORMAT).to_string();

    Measurement {
        day_index,
        sensor_date: day.clone(),
        satellite_date: day,
        sensor_timestamp: sensor.map(|m| m.timestamp),
        satellite_timestamp: satellite.map(|m| m.timestamp),
        days_diff,
        station_id: station.station_id,
        latitude: station.latitude,
        longitude: station.longitude,

        ph: mesures.ph.unwrap_or(defaults::PH),
        oxygene_dissous: mesures.oxygene.unwrap_or(defaults::OXYGENE_DISSOUS),
        cod: mesures.cod.unwrap_or(defaults::COD),
        cod_mn: mesures.codmn.unwrap_or(defaults::COD_MN),
        nh4n: mesures.nh4n.unwrap_or(defaults::NH4N),
        tph: mesures.tph.unwrap_or(defaults::TPH),
        dip: mesures.dip.unwrap_or(defaults::DIP),
        din: mesures.din.unwrap_or(defaults::DIN),

        ndwi: indices.ndwi.unwrap_or(defaults::NDWI),
        chlorophyll_index: indices.chlorophyll.unwrap_or(defaults::CHLOROPHYLL_INDEX),
        turbidity_index: indices.turbidity.unwrap_or(defaults::TURBIDITY_INDEX),

        provenance: Provenance {
            sensor: source(sensor.is_some()),
            satellite: source(satellite.is_some()),
        },
    }
}

/// Rows where neither feed matched
pub fn defaulted_rows(measurements: &[Measurement]) -> usize {
    measurements
        .iter()
        .filter(|m| m.provenance.is_fully_defaulted())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn station() -> Station {
        Station::new(1, 33.5, -7.5)
    }

    #[test]
    fn test_empty_feeds_yield_fourteen_default_rows() {
        let rows = aggregate_at(&[], &[], &station(), SEQUENCE_LENGTH, now());

        assert_eq!(rows.len(), 14);
        for (i, m) in rows.iter().enumerate() {
            assert_eq!(m.day_index, i);
            assert_eq!(m.days_diff, 0.0);
            assert_eq!(m.station_id, 1);
            assert_eq!(m.latitude, 33.5);
            assert_eq!(m.longitude, -7.5);
            assert_eq!(m.ph, 7.5);
            assert_eq!(m.oxygene_dissous, 8.0);
            assert_eq!(m.cod, 15.0);
            assert_eq!(m.cod_mn, 5.0);
            assert_eq!(m.nh4n, 0.5);
            assert_eq!(m.tph, 0.1);
            assert_eq!(m.dip, 0.05);
            assert_eq!(m.din, 0.5);
            assert_eq!(m.ndwi, 0.3);
            assert_eq!(m.chlorophyll_index, 0.2);
            assert_eq!(m.turbidity_index, 0.15);
            assert!(m.provenance.is_fully_defaulted());
        }
        assert_eq!(defaulted_rows(&rows), 14);
    }

    #[test]
    fn test_wall_clock_variant_is_total() {
        let rows = aggregate(&[], &[], &station());
        assert_eq!(rows.len(), 14);
    }

    #[test]
    fn test_days_are_chronological_oldest_first() {
        let rows = aggregate_at(&[], &[], &station(), SEQUENCE_LENGTH, now());

        assert_eq!(rows[0].sensor_date, "2025-06-02");
        assert_eq!(rows[13].sensor_date, "2025-06-15");
        for pair in rows.windows(2) {
            assert!(pair[0].sensor_date < pair[1].sensor_date);
            assert!(pair[0].day_index < pair[1].day_index);
        }
    }

    #[test]
    fn test_matched_records_override_defaults_and_set_days_diff() {
        // Day offset 5 targets 2025-06-10T12:00Z
        let sensor = vec![SensorRecord::new(
            "2025-06-11T12:00:00Z",
            SensorReadings { ph: Some(6.8), cod: Some(22.0), ..Default::default() },
        )];
        let satellite = vec![SatelliteRecord::new(
            "2025-06-09T12:00:00Z",
            SatelliteIndices { ndwi: Some(0.45), chlorophyll: Some(0.31), turbidity: None },
        )];

        let rows = aggregate_at(&sensor, &satellite, &station(), SEQUENCE_LENGTH, now());
        let day = &rows[SEQUENCE_LENGTH - 1 - 5];

        assert_eq!(day.sensor_date, "2025-06-10");
        assert!((day.days_diff - 2.0).abs() < 1e-9);
        assert_eq!(day.ph, 6.8);
        assert_eq!(day.cod, 22.0);
        assert_eq!(day.oxygene_dissous, defaults::OXYGENE_DISSOUS);
        assert_eq!(day.ndwi, 0.45);
        assert_eq!(day.chlorophyll_index, 0.31);
        assert_eq!(day.turbidity_index, defaults::TURBIDITY_INDEX);
        assert_eq!(day.provenance.sensor, RowSource::Measured);
        assert_eq!(day.provenance.satellite, RowSource::Measured);
        assert_eq!(defaulted_rows(&rows), 0);
    }

    #[test]
    fn test_one_missing_feed_zeroes_days_diff() {
        let sensor = vec![SensorRecord::new("2025-06-14T00:00:00Z", SensorReadings::default())];

        let rows = aggregate_at(&sensor, &[], &station(), SEQUENCE_LENGTH, now());

        assert!(rows.iter().all(|m| m.days_diff == 0.0));
        assert!(rows.iter().all(|m| m.provenance.sensor == RowSource::Measured));
        assert!(rows.iter().all(|m| m.provenance.satellite == RowSource::Defaulted));
        assert_eq!(defaulted_rows(&rows), 0);
    }

    #[test]
    fn test_each_day_matches_its_nearest_record() {
        let sensor: Vec<SensorRecord> = (1..=15)
            .map(|d| {
                SensorRecord::new(
                    format!("2025-06-{:02}T12:00:00Z", d),
                    SensorReadings { ph: Some(d as f64), ..Default::default() },
                )
            })
            .collect();

        let rows = aggregate_at(&sensor, &[], &station(), SEQUENCE_LENGTH, now());

        for m in &rows {
            let day: f64 = m.sensor_date[8..].parse().unwrap();
            assert_eq!(m.ph, day);
        }
    }

    #[test]
    fn test_custom_length() {
        let rows = aggregate_at(&[], &[], &station(), 3, now());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].sensor_date, "2025-06-15");
    }
}
