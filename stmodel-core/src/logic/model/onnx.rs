//! ONNX engine (feature `onnx`)
//!
//! Runs a model exported with input `(1, 14, 11)` and a single `(1, 1)`
//! output through ONNX Runtime.

use ndarray::{Array2, Array3};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;
use parking_lot::Mutex;

use crate::constants::FEATURE_COUNT;
use crate::logic::error::{CoreError, CoreResult};
use super::engine::SequenceModel;

pub struct OnnxModel {
    session: Mutex<Session>,
    output_name: String,
}

impl OnnxModel {
    /// Load ONNX model from file
    pub fn load(model_path: &str) -> CoreResult<Self> {
        log::info!("Loading ONNX model from: {}", model_path);

        let session = Session::builder()
            .map_err(|e| CoreError::artifact(model_path, format!("session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| CoreError::artifact(model_path, format!("optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| CoreError::artifact(model_path, format!("load: {}", e)))?;

        let output_name = session.outputs.first()
            .map(|o| o.name.clone())
            .ok_or_else(|| CoreError::artifact(model_path, "no output defined"))?;

        Ok(Self {
            session: Mutex::new(session),
            output_name,
        })
    }
}

impl SequenceModel for OnnxModel {
    fn engine(&self) -> &'static str {
        "ONNX Runtime (CPU)"
    }

    fn input_width(&self) -> usize {
        FEATURE_COUNT
    }

    fn forward(&self, sequence: &Array2<f32>) -> CoreResult<f32> {
        let (steps, features) = sequence.dim();
        let input = Array3::from_shape_vec((1, steps, features), sequence.iter().copied().collect())
            .map_err(|e| CoreError::Inference(format!("array error: {}", e)))?;

        let input_tensor = Value::from_array(input)
            .map_err(|e| CoreError::Inference(format!("tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![input_tensor])
            .map_err(|e| CoreError::Inference(format!("run failed: {}", e)))?;

        let output = outputs.get(&self.output_name)
            .ok_or_else(|| CoreError::Inference("no output".to_string()))?;

        let (_, data) = output.try_extract_tensor::<f32>()
            .map_err(|e| CoreError::Inference(format!("extract error: {}", e)))?;

        data.first()
            .copied()
            .ok_or_else(|| CoreError::Inference("empty output".to_string()))
    }
}
