//! Trivial feedforward neural network: features → hidden (tanh) → 4 action
//! outputs (tanh). The input width follows the perception configuration
//! (`SimConfig::feature_len()`, i.e. 2 + 4 + 4·ray_count).
//!
//! This is the reference [`Controller`] implementation: enough to exercise
//! the engine end to end without any training framework. An evolutionary
//! optimizer supplies the flat weight vector.

use crate::controller::{Controller, ACTION_COUNT};

#[derive(Clone, Debug)]
pub struct NeuralNet {
    input_size: usize,
    hidden_size: usize,
    // weights: input→hidden (input×hidden) + hidden bias + hidden→output
    // (hidden×ACTION_COUNT) + output bias
    w_ih: Vec<f64>,
    b_h: Vec<f64>,
    w_ho: Vec<f64>,
    b_o: [f64; ACTION_COUNT],
}

impl NeuralNet {
    /// Flat parameter count for the given layer sizes.
    pub fn weight_count(input_size: usize, hidden_size: usize) -> usize {
        input_size * hidden_size + hidden_size + hidden_size * ACTION_COUNT + ACTION_COUNT
    }

    /// Create a network from an iterator of weights, in the same order
    /// produced by [`NeuralNet::to_weight_vec`]. Panics if the iterator
    /// yields fewer than `weight_count(input_size, hidden_size)` values.
    pub fn from_weights(
        input_size: usize,
        hidden_size: usize,
        mut weights: impl Iterator<Item = f64>,
    ) -> Self {
        let expected = Self::weight_count(input_size, hidden_size);
        let mut next = || {
            weights
                .next()
                .unwrap_or_else(|| panic!("insufficient weights: need {expected} elements"))
        };

        let w_ih = (0..input_size * hidden_size).map(|_| next()).collect();
        let b_h = (0..hidden_size).map(|_| next()).collect();
        let w_ho = (0..hidden_size * ACTION_COUNT).map(|_| next()).collect();
        let mut b_o = [0.0; ACTION_COUNT];
        for b in &mut b_o {
            *b = next();
        }

        Self {
            input_size,
            hidden_size,
            w_ih,
            b_h,
            w_ho,
            b_o,
        }
    }

    /// Forward pass. Returns one raw output per action.
    pub fn forward(&self, input: &[f64]) -> [f64; ACTION_COUNT] {
        assert_eq!(
            input.len(),
            self.input_size,
            "input length must match the network's input size"
        );

        let mut hidden = self.b_h.clone();
        for (i, &x) in input.iter().enumerate() {
            let row = &self.w_ih[i * self.hidden_size..(i + 1) * self.hidden_size];
            for (h, &w) in hidden.iter_mut().zip(row) {
                *h += x * w;
            }
        }
        for h in &mut hidden {
            *h = h.tanh();
        }

        let mut output = self.b_o;
        for (i, &h) in hidden.iter().enumerate() {
            let row = &self.w_ho[i * ACTION_COUNT..(i + 1) * ACTION_COUNT];
            for (o, &w) in output.iter_mut().zip(row) {
                *o += h * w;
            }
        }
        for o in &mut output {
            *o = o.tanh();
        }

        output
    }

    /// Flatten network parameters in the order expected by `from_weights`.
    pub fn to_weight_vec(&self) -> Vec<f64> {
        let mut out =
            Vec::with_capacity(Self::weight_count(self.input_size, self.hidden_size));
        out.extend_from_slice(&self.w_ih);
        out.extend_from_slice(&self.b_h);
        out.extend_from_slice(&self.w_ho);
        out.extend_from_slice(&self.b_o);
        out
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }
}

impl Controller for NeuralNet {
    fn evaluate(&self, features: &[f64]) -> [f64; ACTION_COUNT] {
        self.forward(features)
    }
}
