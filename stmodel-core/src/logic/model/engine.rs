//! Sequence model capability
//!
//! "Evaluate a (14, 11) → 1 sequence model" as a trait, so the scorer does
//! not care which numeric engine holds the trained weights.

use ndarray::Array2;

use crate::logic::error::CoreResult;

pub trait SequenceModel: Send + Sync {
    /// Engine label for status/info payloads
    fn engine(&self) -> &'static str;

    /// Features expected per timestep
    fn input_width(&self) -> usize;

    /// Run the whole sequence, return the raw scalar from the last step
    fn forward(&self, sequence: &Array2<f32>) -> CoreResult<f32>;
}
