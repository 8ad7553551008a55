//! Integration Tests for the Feature Pipeline
//!
//! Feeds → aggregation → feature matrix → scoring context.

#[cfg(test)]
mod integration_tests {
    use chrono::{TimeZone, Utc};
    use ndarray::{Array1, Array2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::constants::{FEATURE_COUNT, HIDDEN_SIZE, NUM_LAYERS, SEQUENCE_LENGTH};
    use crate::logic::aggregation::{
        aggregate_at, generate_with_rng, QualityPreset, SatelliteFeed, SensorRecord, Station,
    };
    use crate::logic::features::{feature_matrix, FeatureVector, FEATURE_LAYOUT};
    use crate::logic::model::lstm::{LstmLayer, LstmModel};
    use crate::logic::model::{AffineScaler, ModelMetrics, NormalizationState, ScoringContext};
    use crate::logic::prediction::{predict, PredictionSource, Zone};

    /// Small nonzero weights so the output depends on the input
    fn context() -> ScoringContext {
        let layers = (0..NUM_LAYERS)
            .map(|k| {
                let width = if k == 0 { FEATURE_COUNT } else { HIDDEN_SIZE };
                LstmLayer::new(
                    Array2::from_elem((4 * HIDDEN_SIZE, width), 0.01),
                    Array2::from_elem((4 * HIDDEN_SIZE, HIDDEN_SIZE), -0.005),
                    Array1::zeros(4 * HIDDEN_SIZE),
                    Array1::from_elem(4 * HIDDEN_SIZE, 0.02),
                )
                .unwrap()
            })
            .collect();
        let model = LstmModel::new(layers, Array1::from_elem(HIDDEN_SIZE, 0.05), 0.4).unwrap();

        let normalization = NormalizationState::new(
            AffineScaler::Standard {
                mean: vec![0.5, 7.5, 8.0, 15.0, 5.0, 0.5, 0.1, 0.05, 0.5, 0.3, 0.2],
                scale: vec![0.5, 0.5, 2.0, 10.0, 2.0, 0.3, 0.1, 0.03, 0.3, 0.1, 0.1],
            },
            AffineScaler::MinMax { min: vec![0.0], scale: vec![0.1] },
            FEATURE_COUNT,
        )
        .unwrap();

        let ctx = ScoringContext::new();
        ctx.install(Box::new(model), normalization, ModelMetrics::with_mae(0.12), "<memory>")
            .unwrap();
        ctx
    }

    #[test]
    fn test_feeds_to_prediction() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let station = Station::new(7, 33.5, -7.5);

        let sensor: Vec<SensorRecord> = serde_json::from_str(
            r#"[
                {"timestamp": "2024-03-19T08:00:00Z", "mesures": {"ph": 7.1, "oxygene": 6.4, "cod": 21.0}},
                {"timestamp": "2024-03-12 09:30:00", "mesures": {"ph": 6.9, "nh4n": 0.8}},
                {"timestamp": "garbage", "mesures": {"ph": 1.0}}
            ]"#,
        )
        .unwrap();
        let satellite: SatelliteFeed = serde_json::from_str(
            r#"{"indices": [{"timestamp": "2024-03-18", "indices": {"ndwi": 0.41, "turbidity": 0.22}}]}"#,
        )
        .unwrap();

        let rows = aggregate_at(&sensor, &satellite.indices, &station, SEQUENCE_LENGTH, now);
        assert_eq!(rows.len(), SEQUENCE_LENGTH);
        assert!(rows.iter().all(|m| m.ph != 1.0));

        let matrix = feature_matrix(&rows).unwrap();
        assert_eq!(matrix.dim(), (SEQUENCE_LENGTH, FEATURE_COUNT));

        let ctx = context();
        let result = predict(&ctx, &rows, Zone::from(&station), PredictionSource::Auto).unwrap();

        assert!((0.0..=1.0).contains(&result.quality_score_normalized));
        assert!((0.0..=10.0).contains(&result.quality_score_real));
        assert!((result.confidence - 0.88).abs() < 1e-9);
        assert_eq!(result.zone, Zone::new(33.5, -7.5));
    }

    #[test]
    fn test_turbidity_never_reaches_the_model() {
        let station = Station::new(1, 0.0, 0.0);
        let mut rng = StdRng::seed_from_u64(11);
        let rows = generate_with_rng(&station, QualityPreset::Good, Utc::now(), &mut rng);

        let mut altered = rows.clone();
        for m in altered.iter_mut() {
            m.turbidity_index = 99.0;
        }

        assert_eq!(feature_matrix(&rows).unwrap(), feature_matrix(&altered).unwrap());
        assert!(!FEATURE_LAYOUT.iter().any(|name| name.contains("turbid")));

        let ctx = context();
        let a = ctx.score(&rows).unwrap();
        let b = ctx.score(&altered).unwrap();
        assert_eq!(a.raw_output.to_bits(), b.raw_output.to_bits());
    }

    #[test]
    fn test_matrix_rows_follow_layout_order() {
        let station = Station::new(1, 0.0, 0.0);
        let mut rng = StdRng::seed_from_u64(3);
        let rows = generate_with_rng(&station, QualityPreset::Bad, Utc::now(), &mut rng);
        let matrix = feature_matrix(&rows).unwrap();

        for (i, m) in rows.iter().enumerate() {
            let vector = FeatureVector::from(m);
            assert_eq!(matrix.row(i).to_vec(), vector.as_slice().to_vec());
            assert_eq!(vector.get_by_name("pH"), Some(m.ph as f32));
            assert_eq!(vector.get_by_name("NDWI"), Some(m.ndwi as f32));
        }
    }

    #[test]
    fn test_sample_sequence_scores_deterministically() {
        let station = Station::new(2, 10.0, 20.0);
        let now = Utc::now();
        let a = generate_with_rng(&station, QualityPreset::Medium, now, &mut StdRng::seed_from_u64(5));
        let b = generate_with_rng(&station, QualityPreset::Medium, now, &mut StdRng::seed_from_u64(5));

        let ctx = context();
        let sa = ctx.score(&a).unwrap();
        let sb = ctx.score(&b).unwrap();
        assert_eq!(sa.quality_score_real.to_bits(), sb.quality_score_real.to_bits());
    }
}
