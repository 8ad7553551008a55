//! Features Module - Model input extraction
//!
//! Projects `Measurement` rows onto the versioned 11-feature layout and
//! stacks them into the model input matrix.

pub mod layout;
pub mod vector;

#[cfg(test)]
mod tests;

pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION, LayoutInfo, layout_hash};
pub use vector::{FeatureVector, feature_matrix};
