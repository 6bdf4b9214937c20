//! One-hidden-layer sigmoid perceptron trained on squared error.
//!
//! Parameters live in one flat vector laid out as
//! `[w1 (hidden × inputs, row-major) | b1 (hidden) | w2 (hidden) | b2]`,
//! which keeps the optimiser a plain loop over a slice.

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use pnn_core::{Error, LearningRule, NetworkConfig, Result};
use pnn_io::NumericTable;

/// Numerically stable logistic function.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    let e = (-x.abs()).exp();
    let recip = 1.0 / (1.0 + e);
    if x >= 0.0 { recip } else { e * recip }
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(&x, &y)| x * y).sum()
}

/// Loss history of one fit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Mean squared error on the training rows after each epoch.
    pub loss_history: Vec<f64>,
}

impl TrainingReport {
    /// Loss after the final epoch.
    pub fn final_loss(&self) -> Option<f64> {
        self.loss_history.last().copied()
    }
}

/// Sigmoid hidden layer, single sigmoid output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mlp {
    n_inputs: usize,
    n_hidden: usize,
    params: Vec<f64>,
}

impl Mlp {
    fn n_params(n_inputs: usize, n_hidden: usize) -> usize {
        n_hidden * n_inputs + 2 * n_hidden + 1
    }

    /// Glorot-uniform weights, zero biases.
    pub fn new(n_inputs: usize, n_hidden: usize, rng: &mut StdRng) -> Result<Self> {
        if n_inputs == 0 || n_hidden == 0 {
            return Err(Error::Validation(format!(
                "network needs inputs and hidden units, got {n_inputs} x {n_hidden}"
            )));
        }
        let mut params = vec![0.0; Self::n_params(n_inputs, n_hidden)];
        let a1 = (6.0 / (n_inputs + n_hidden) as f64).sqrt();
        let a2 = (6.0 / (n_hidden + 1) as f64).sqrt();
        let w1_end = n_hidden * n_inputs;
        for w in &mut params[..w1_end] {
            *w = rng.random_range(-a1..a1);
        }
        let w2 = w1_end + n_hidden;
        for w in &mut params[w2..w2 + n_hidden] {
            *w = rng.random_range(-a2..a2);
        }
        Ok(Self { n_inputs, n_hidden, params })
    }

    /// Rebuild from persisted parts.
    pub fn from_parts(n_inputs: usize, n_hidden: usize, params: Vec<f64>) -> Result<Self> {
        let expected = Self::n_params(n_inputs, n_hidden);
        if n_inputs == 0 || n_hidden == 0 || params.len() != expected {
            return Err(Error::ShapeMismatch(format!(
                "{n_inputs} inputs x {n_hidden} hidden needs {expected} parameters, got {}",
                params.len()
            )));
        }
        Ok(Self { n_inputs, n_hidden, params })
    }

    /// Input width.
    pub fn n_inputs(&self) -> usize {
        self.n_inputs
    }

    /// Hidden units.
    pub fn n_hidden(&self) -> usize {
        self.n_hidden
    }

    /// Flat parameter vector.
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.n_inputs > 0
            && self.n_hidden > 0
            && self.params.len() == Self::n_params(self.n_inputs, self.n_hidden)
            && self.params.iter().all(|v| v.is_finite())
    }

    #[inline]
    fn forward(&self, x: &[f64], hidden: &mut [f64]) -> f64 {
        let (n, h) = (self.n_inputs, self.n_hidden);
        let (w1, rest) = self.params.split_at(h * n);
        let (b1, rest) = rest.split_at(h);
        let (w2, b2) = rest.split_at(h);
        for j in 0..h {
            hidden[j] = sigmoid(b1[j] + dot(&w1[j * n..(j + 1) * n], x));
        }
        sigmoid(b2[0] + dot(w2, hidden))
    }

    /// Output for one already-scaled input row.
    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut hidden = vec![0.0; self.n_hidden];
        self.forward(x, &mut hidden)
    }

    /// Add the gradient of `0.5 (o - y)^2` at one row to `grad`.
    /// Returns the squared error.
    fn accumulate(&self, x: &[f64], y: f64, hidden: &mut [f64], grad: &mut [f64]) -> f64 {
        let (n, h) = (self.n_inputs, self.n_hidden);
        let o = self.forward(x, hidden);
        let delta_out = (o - y) * o * (1.0 - o);
        let w2 = &self.params[h * n + h..h * n + 2 * h];

        let (g1, rest) = grad.split_at_mut(h * n);
        let (gb1, rest) = rest.split_at_mut(h);
        let (gw2, gb2) = rest.split_at_mut(h);
        gb2[0] += delta_out;
        for j in 0..h {
            gw2[j] += delta_out * hidden[j];
            let delta = delta_out * w2[j] * hidden[j] * (1.0 - hidden[j]);
            gb1[j] += delta;
            for (g, &xk) in g1[j * n..(j + 1) * n].iter_mut().zip(x) {
                *g += delta * xk;
            }
        }
        (o - y) * (o - y)
    }

    /// Mini-batch gradient descent over already-scaled rows.
    pub fn train(
        &mut self,
        x: &NumericTable,
        y: &[f64],
        cfg: &NetworkConfig,
        rng: &mut StdRng,
    ) -> Result<TrainingReport> {
        if x.n_cols() != self.n_inputs {
            return Err(Error::ShapeMismatch(format!(
                "network has {} inputs, training rows have {}",
                self.n_inputs,
                x.n_cols()
            )));
        }
        if x.n_rows() != y.len() {
            return Err(Error::ShapeMismatch(format!(
                "{} training rows but {} targets",
                x.n_rows(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(Error::Validation("cannot train on zero rows".into()));
        }

        let n_rows = x.n_rows();
        let mut order: Vec<usize> = (0..n_rows).collect();
        let mut hidden = vec![0.0; self.n_hidden];
        let mut grad = vec![0.0; self.params.len()];
        let mut velocity = vec![0.0; self.params.len()];
        let mut report = TrainingReport::default();
        let lr = cfg.learning_rate;
        let mu = cfg.momentum;

        for epoch in 0..cfg.epochs {
            order.shuffle(rng);
            let mut sse = 0.0;
            for batch in order.chunks(cfg.batch_size.max(1)) {
                grad.iter_mut().for_each(|g| *g = 0.0);
                for &i in batch {
                    sse += self.accumulate(x.row(i), y[i], &mut hidden, &mut grad);
                }
                let inv = 1.0 / batch.len() as f64;
                match cfg.learning_rule {
                    LearningRule::Sgd => {
                        for (w, g) in self.params.iter_mut().zip(&grad) {
                            *w -= lr * g * inv;
                        }
                    }
                    LearningRule::Nesterov => {
                        for ((w, v), g) in self.params.iter_mut().zip(&mut velocity).zip(&grad) {
                            let prev = *v;
                            *v = mu * *v - lr * g * inv;
                            *w += -mu * prev + (1.0 + mu) * *v;
                        }
                    }
                }
            }
            let mse = sse / n_rows as f64;
            if !mse.is_finite() {
                return Err(Error::Computation(format!("training diverged at epoch {epoch}")));
            }
            tracing::trace!(epoch, mse, "epoch done");
            report.loss_history.push(mse);
        }
        Ok(report)
    }
}
