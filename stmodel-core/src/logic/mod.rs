//! Logic Module - Aggregation & Scoring Engines
//!
//! - `aggregation/` - records, temporal matching, 14-day sequence building, sample data
//! - `features/` - versioned feature layout and model input matrix
//! - `model/` - normalization, sequence model engines, scoring context
//! - `quality` - score categories
//! - `prediction` - result assembly

pub mod error;
pub mod aggregation;
pub mod features;
pub mod model;
pub mod quality;
pub mod prediction;
