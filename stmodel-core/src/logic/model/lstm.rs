//! Native LSTM engine
//!
//! Stacked LSTM + linear head evaluated with `ndarray`. Weights come from a
//! JSON export of the trained state dict:
//!
//! ```text
//! lstm.weight_ih_l{k}  (4H, in)     lstm.bias_ih_l{k}  (4H)
//! lstm.weight_hh_l{k}  (4H, H)      lstm.bias_hh_l{k}  (4H)
//! fc.weight            (1, H)       fc.bias            (1)
//! ```
//!
//! Gate rows are ordered input, forget, cell, output. Dropout between
//! layers is a training-time op and is not applied here.

use std::collections::HashMap;

use ndarray::{Array1, Array2, ArrayView2};
use serde::Deserialize;

use crate::logic::error::{CoreError, CoreResult};
use super::engine::SequenceModel;

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

// ============================================================================
// LAYER
// ============================================================================

#[derive(Debug, Clone)]
pub struct LstmLayer {
    w_ih: Array2<f32>,
    w_hh: Array2<f32>,
    /// `bias_ih + bias_hh`
    bias: Array1<f32>,
}

impl LstmLayer {
    pub fn new(
        w_ih: Array2<f32>,
        w_hh: Array2<f32>,
        bias_ih: Array1<f32>,
        bias_hh: Array1<f32>,
    ) -> Result<Self, String> {
        let (gates, hidden) = w_hh.dim();
        if hidden == 0 || gates != 4 * hidden {
            return Err(format!("weight_hh must be (4H, H), got {:?}", w_hh.dim()));
        }
        if w_ih.nrows() != gates {
            return Err(format!("weight_ih must have {} rows, got {}", gates, w_ih.nrows()));
        }
        if bias_ih.len() != gates || bias_hh.len() != gates {
            return Err(format!(
                "biases must have {} entries, got {} and {}",
                gates,
                bias_ih.len(),
                bias_hh.len()
            ));
        }

        Ok(Self { w_ih, w_hh, bias: bias_ih + bias_hh })
    }

    pub fn input_size(&self) -> usize {
        self.w_ih.ncols()
    }

    pub fn hidden_size(&self) -> usize {
        self.w_hh.ncols()
    }

    /// `(T, in)` → `(T, H)`, zero initial state
    pub fn forward(&self, input: ArrayView2<'_, f32>) -> Array2<f32> {
        let hidden = self.hidden_size();
        let steps = input.nrows();

        let mut h = Array1::<f32>::zeros(hidden);
        let mut c = Array1::<f32>::zeros(hidden);
        let mut outputs = Array2::<f32>::zeros((steps, hidden));

        for t in 0..steps {
            let gates = self.w_ih.dot(&input.row(t)) + self.w_hh.dot(&h) + &self.bias;

            for k in 0..hidden {
                let i = sigmoid(gates[k]);
                let f = sigmoid(gates[hidden + k]);
                let g = gates[2 * hidden + k].tanh();
                let o = sigmoid(gates[3 * hidden + k]);

                c[k] = f * c[k] + i * g;
                h[k] = o * c[k].tanh();
            }

            outputs.row_mut(t).assign(&h);
        }

        outputs
    }
}

// ============================================================================
// MODEL
// ============================================================================

#[derive(Debug, Clone)]
pub struct LstmModel {
    layers: Vec<LstmLayer>,
    fc_weight: Array1<f32>,
    fc_bias: f32,
}

impl LstmModel {
    pub fn new(layers: Vec<LstmLayer>, fc_weight: Array1<f32>, fc_bias: f32) -> Result<Self, String> {
        let Some(first) = layers.first() else {
            return Err("model needs at least one layer".to_string());
        };
        let hidden = first.hidden_size();

        for (k, layer) in layers.iter().enumerate().skip(1) {
            if layer.input_size() != hidden || layer.hidden_size() != hidden {
                return Err(format!(
                    "layer {} expects ({}, {}), previous hidden is {}",
                    k,
                    layer.input_size(),
                    layer.hidden_size(),
                    hidden
                ));
            }
        }
        if fc_weight.len() != hidden {
            return Err(format!("fc.weight must have {} entries, got {}", hidden, fc_weight.len()));
        }

        Ok(Self { layers, fc_weight, fc_bias })
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn hidden_size(&self) -> usize {
        self.fc_weight.len()
    }

    /// Build from a state dict (`name → tensor`)
    pub fn from_state_dict(tensors: &HashMap<String, Tensor>) -> Result<Self, String> {
        let mut layers = Vec::new();
        let mut k = 0;

        while tensors.contains_key(&format!("lstm.weight_ih_l{}", k)) {
            let layer = LstmLayer::new(
                matrix(tensors, &format!("lstm.weight_ih_l{}", k))?,
                matrix(tensors, &format!("lstm.weight_hh_l{}", k))?,
                vector(tensors, &format!("lstm.bias_ih_l{}", k))?,
                vector(tensors, &format!("lstm.bias_hh_l{}", k))?,
            )
            .map_err(|e| format!("layer {}: {}", k, e))?;
            layers.push(layer);
            k += 1;
        }

        let fc_weight = match tensors.get("fc.weight") {
            Some(Tensor::Matrix(rows)) if rows.len() == 1 => Array1::from(rows[0].clone()),
            Some(Tensor::Vector(values)) => Array1::from(values.clone()),
            Some(_) => return Err("fc.weight must be (1, H)".to_string()),
            None => return Err("missing tensor fc.weight".to_string()),
        };
        let fc_bias = vector(tensors, "fc.bias")?
            .first()
            .copied()
            .ok_or_else(|| "fc.bias is empty".to_string())?;

        Self::new(layers, fc_weight, fc_bias)
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        let file: WeightsFile = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Self::from_state_dict(file.tensors())
    }
}

impl SequenceModel for LstmModel {
    fn engine(&self) -> &'static str {
        "native-lstm (CPU)"
    }

    fn input_width(&self) -> usize {
        self.layers[0].input_size()
    }

    fn forward(&self, sequence: &Array2<f32>) -> CoreResult<f32> {
        if sequence.nrows() == 0 {
            return Err(CoreError::Inference("empty sequence".to_string()));
        }
        if sequence.ncols() != self.input_width() {
            return Err(CoreError::Inference(format!(
                "expected {} features per step, got {}",
                self.input_width(),
                sequence.ncols()
            )));
        }

        let mut hidden_seq = sequence.to_owned();
        for layer in &self.layers {
            hidden_seq = layer.forward(hidden_seq.view());
        }

        let last = hidden_seq.row(hidden_seq.nrows() - 1);
        Ok(self.fc_weight.dot(&last) + self.fc_bias)
    }
}

// ============================================================================
// WEIGHTS FILE
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Tensor {
    Matrix(Vec<Vec<f32>>),
    Vector(Vec<f32>),
}

/// Either a bare state dict or a checkpoint wrapping one
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WeightsFile {
    Checkpoint { model_state_dict: HashMap<String, Tensor> },
    Bare(HashMap<String, Tensor>),
}

impl WeightsFile {
    fn tensors(&self) -> &HashMap<String, Tensor> {
        match self {
            WeightsFile::Checkpoint { model_state_dict } => model_state_dict,
            WeightsFile::Bare(tensors) => tensors,
        }
    }
}

fn matrix(tensors: &HashMap<String, Tensor>, name: &str) -> Result<Array2<f32>, String> {
    match tensors.get(name) {
        Some(Tensor::Matrix(rows)) => {
            let cols = rows.first().map(Vec::len).unwrap_or(0);
            if rows.iter().any(|r| r.len() != cols) {
                return Err(format!("{} is ragged", name));
            }
            let flat: Vec<f32> = rows.iter().flatten().copied().collect();
            Array2::from_shape_vec((rows.len(), cols), flat).map_err(|e| format!("{}: {}", name, e))
        }
        Some(Tensor::Vector(_)) => Err(format!("{} must be 2-D", name)),
        None => Err(format!("missing tensor {}", name)),
    }
}

fn vector(tensors: &HashMap<String, Tensor>, name: &str) -> Result<Array1<f32>, String> {
    match tensors.get(name) {
        Some(Tensor::Vector(values)) => Ok(Array1::from(values.clone())),
        Some(Tensor::Matrix(_)) => Err(format!("{} must be 1-D", name)),
        None => Err(format!("missing tensor {}", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_model(input: usize, hidden: usize, layers: usize, fc_bias: f32) -> LstmModel {
        let layers = (0..layers)
            .map(|k| {
                let width = if k == 0 { input } else { hidden };
                LstmLayer::new(
                    Array2::zeros((4 * hidden, width)),
                    Array2::zeros((4 * hidden, hidden)),
                    Array1::zeros(4 * hidden),
                    Array1::zeros(4 * hidden),
                )
                .unwrap()
            })
            .collect();
        LstmModel::new(layers, Array1::zeros(hidden), fc_bias).unwrap()
    }

    #[test]
    fn test_zero_weights_output_is_fc_bias() {
        let model = zero_model(11, 64, 2, 0.25);
        let out = model.forward(&Array2::from_elem((14, 11), 3.0)).unwrap();
        assert_eq!(out, 0.25);
    }

    #[test]
    fn test_single_unit_matches_hand_computation() {
        // in=1, H=1: gates = w_ih * x + b
        let layer = LstmLayer::new(
            Array2::from_shape_vec((4, 1), vec![1.0, 0.0, 1.0, 0.0]).unwrap(),
            Array2::zeros((4, 1)),
            Array1::from(vec![0.0, 0.0, 0.0, 0.0]),
            Array1::from(vec![0.0, 0.0, 0.0, 0.0]),
        )
        .unwrap();
        let model = LstmModel::new(vec![layer], Array1::from(vec![1.0]), 0.0).unwrap();

        let x = 0.5f32;
        let out = model.forward(&Array2::from_elem((1, 1), x)).unwrap();

        let c = sigmoid(x) * x.tanh();
        let expected = 0.5 * c.tanh();
        assert!((out - expected).abs() < 1e-6);
    }

    #[test]
    fn test_state_carries_across_steps() {
        let layer = LstmLayer::new(
            Array2::from_elem((4, 1), 1.0),
            Array2::from_elem((4, 1), 0.5),
            Array1::zeros(4),
            Array1::zeros(4),
        )
        .unwrap();
        let model = LstmModel::new(vec![layer], Array1::from(vec![1.0]), 0.0).unwrap();

        let one_step = model.forward(&Array2::from_elem((1, 1), 1.0)).unwrap();
        let two_steps = model.forward(&Array2::from_elem((2, 1), 1.0)).unwrap();
        assert!(two_steps > one_step);
    }

    #[test]
    fn test_shape_validation() {
        assert!(LstmLayer::new(
            Array2::zeros((8, 3)),
            Array2::zeros((8, 3)),
            Array1::zeros(8),
            Array1::zeros(8),
        )
        .is_err());

        let model = zero_model(11, 4, 2, 0.0);
        assert!(model.forward(&Array2::zeros((14, 10))).is_err());
        assert!(model.forward(&Array2::zeros((0, 11))).is_err());
    }

    #[test]
    fn test_from_json_checkpoint() {
        let json = r#"{
            "model_state_dict": {
                "lstm.weight_ih_l0": [[0.0], [0.0], [0.0], [0.0]],
                "lstm.weight_hh_l0": [[0.0], [0.0], [0.0], [0.0]],
                "lstm.bias_ih_l0": [0.0, 0.0, 0.0, 0.0],
                "lstm.bias_hh_l0": [0.0, 0.0, 0.0, 0.0],
                "fc.weight": [[1.0]],
                "fc.bias": [0.75]
            }
        }"#;
        let model = LstmModel::from_json(json).unwrap();

        assert_eq!(model.num_layers(), 1);
        assert_eq!(model.input_width(), 1);
        assert_eq!(model.forward(&Array2::zeros((3, 1))).unwrap(), 0.75);
    }

    #[test]
    fn test_from_json_missing_tensor() {
        let json = r#"{"fc.weight": [[1.0]], "fc.bias": [0.0]}"#;
        assert!(LstmModel::from_json(json).is_err());
    }
}
