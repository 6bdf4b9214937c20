//! Scaler + MLP regressor with JSON persistence.

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use pnn_core::{Error, NetworkConfig, Result};
use pnn_io::NumericTable;

use crate::mlp::{Mlp, TrainingReport};
use crate::scaler::MinMaxScaler;

/// Schema version of persisted models.
pub const MODEL_SCHEMA_V1: &str = "paramnn_model_v1";

/// Inputs of a fixed-condition model.
pub const FIXED_FEATURES: [&str; 2] = ["mwwbb", "mjj"];

/// Inputs of a parameterized model.
pub const PARAM_FEATURES: [&str; 3] = ["mwwbb", "mjj", "jes"];

/// A fitted regressor: min/max scaling followed by the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressorPipeline {
    schema_version: String,
    feature_names: Vec<String>,
    scaler: MinMaxScaler,
    network: Mlp,
    training: TrainingReport,
}

impl RegressorPipeline {
    /// Fit scaler and network on `x` against `y`.
    pub fn fit(
        feature_names: &[&str],
        x: &NumericTable,
        y: &[f64],
        cfg: &NetworkConfig,
    ) -> Result<Self> {
        if feature_names.len() != x.n_cols() {
            return Err(Error::ShapeMismatch(format!(
                "{} feature names for {} columns",
                feature_names.len(),
                x.n_cols()
            )));
        }
        let scaler = MinMaxScaler::fit(x)?;
        let scaled = scaler.transform(x)?;
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let mut network = Mlp::new(x.n_cols(), cfg.hidden_units, &mut rng)?;
        let training = network.train(&scaled, y, cfg, &mut rng)?;
        tracing::debug!(
            rows = x.n_rows(),
            epochs = cfg.epochs,
            final_mse = training.final_loss().unwrap_or(f64::NAN),
            "fitted regressor"
        );
        Ok(Self {
            schema_version: MODEL_SCHEMA_V1.to_string(),
            feature_names: feature_names.iter().map(|s| s.to_string()).collect(),
            scaler,
            network,
            training,
        })
    }

    /// Input feature names, in column order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Input width.
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Loss history of the fit.
    pub fn training(&self) -> &TrainingReport {
        &self.training
    }

    /// Predict one unscaled row.
    pub fn predict_one(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.n_features() {
            return Err(Error::ShapeMismatch(format!(
                "model expects {} features ({}), got {}",
                self.n_features(),
                self.feature_names.join(", "),
                row.len()
            )));
        }
        let mut scaled = vec![0.0; row.len()];
        self.scaler.transform_into(row, &mut scaled);
        Ok(self.network.predict(&scaled))
    }

    /// Predict every row of an unscaled table.
    pub fn predict(&self, x: &NumericTable) -> Result<Vec<f64>> {
        if x.n_cols() != self.n_features() {
            return Err(Error::ShapeMismatch(format!(
                "model expects {} features, table has {}",
                self.n_features(),
                x.n_cols()
            )));
        }
        let mut scaled = vec![0.0; x.n_cols()];
        Ok(x.rows()
            .map(|row| {
                self.scaler.transform_into(row, &mut scaled);
                self.network.predict(&scaled)
            })
            .collect())
    }

    /// Coefficient of determination of the predictions on `(x, y)`.
    pub fn score(&self, x: &NumericTable, y: &[f64]) -> Result<f64> {
        let pred = self.predict(x)?;
        r2_score(y, &pred)
    }

    /// Write as pretty JSON. Parent directories are created.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)? + "\n")?;
        Ok(())
    }

    /// Load a model and check it takes exactly `expected_features`.
    pub fn load(path: &Path, expected_features: &[&str]) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::missing("model", path));
        }
        let bytes = std::fs::read(path)?;
        let model: Self = serde_json::from_slice(&bytes)
            .map_err(|e| Error::ModelLoad(format!("{}: {e}", path.display())))?;
        if model.schema_version != MODEL_SCHEMA_V1 {
            return Err(Error::ModelLoad(format!(
                "{}: unsupported schema '{}', expected '{MODEL_SCHEMA_V1}'",
                path.display(),
                model.schema_version
            )));
        }
        if model.feature_names.iter().map(String::as_str).ne(expected_features.iter().copied()) {
            return Err(Error::ModelLoad(format!(
                "{}: model features [{}] do not match [{}]",
                path.display(),
                model.feature_names.join(", "),
                expected_features.join(", ")
            )));
        }
        if !model.scaler.is_consistent()
            || !model.network.is_consistent()
            || model.scaler.n_features() != model.n_features()
            || model.network.n_inputs() != model.n_features()
        {
            return Err(Error::ModelLoad(format!("{}: inconsistent model parameters", path.display())));
        }
        Ok(model)
    }
}

/// Coefficient of determination `1 - SS_res / SS_tot`.
///
/// A constant target scores 1 when predicted exactly and 0 otherwise.
pub fn r2_score(y: &[f64], pred: &[f64]) -> Result<f64> {
    if y.len() != pred.len() {
        return Err(Error::ShapeMismatch(format!(
            "{} targets but {} predictions",
            y.len(),
            pred.len()
        )));
    }
    if y.is_empty() {
        return Err(Error::Validation("cannot score zero rows".into()));
    }
    let mean = y.iter().sum::<f64>() / y.len() as f64;
    let ss_tot: f64 = y.iter().map(|&v| (v - mean) * (v - mean)).sum();
    let ss_res: f64 = y.iter().zip(pred).map(|(&a, &b)| (a - b) * (a - b)).sum();
    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pnn_core::LearningRule;

    fn tmp_path(name: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("pnn_model_{}_{}_{}", name, std::process::id(), nanos))
    }

    fn toy() -> (NumericTable, Vec<f64>) {
        let mut x = NumericTable::with_columns(2);
        let mut y = Vec::new();
        for i in 0..60 {
            let sig = i % 2 == 0;
            let m = if sig { 500.0 + i as f64 } else { 1500.0 + 10.0 * i as f64 };
            x.push_row(&[m, 80.0 + (i % 7) as f64]).unwrap();
            y.push(if sig { 1.0 } else { 0.0 });
        }
        (x, y)
    }

    fn net() -> NetworkConfig {
        NetworkConfig {
            hidden_units: 3,
            learning_rate: 0.5,
            epochs: 60,
            batch_size: 1,
            learning_rule: LearningRule::Sgd,
            momentum: 0.9,
            seed: 3,
        }
    }

    #[test]
    fn test_r2() {
        assert_relative_eq!(r2_score(&[0.0, 1.0], &[0.0, 1.0]).unwrap(), 1.0);
        assert_relative_eq!(r2_score(&[0.0, 1.0], &[0.5, 0.5]).unwrap(), 0.0);
        assert_relative_eq!(r2_score(&[1.0, 1.0], &[1.0, 1.0]).unwrap(), 1.0);
        assert_relative_eq!(r2_score(&[1.0, 1.0], &[0.0, 1.0]).unwrap(), 0.0);
        assert!(r2_score(&[1.0], &[]).is_err());
    }

    #[test]
    fn test_fit_separates_and_persists() {
        let (x, y) = toy();
        let m = RegressorPipeline::fit(&FIXED_FEATURES, &x, &y, &net()).unwrap();
        assert!(m.score(&x, &y).unwrap() > 0.5);
        let p = tmp_path("fixed.json");
        m.save(&p).unwrap();
        let back = RegressorPipeline::load(&p, &FIXED_FEATURES).unwrap();
        assert_eq!(back.predict(&x).unwrap(), m.predict(&x).unwrap());
        std::fs::remove_file(&p).ok();
    }

    #[test]
    fn test_load_feature_mismatch_is_model_load() {
        let (x, y) = toy();
        let m = RegressorPipeline::fit(&FIXED_FEATURES, &x, &y, &net()).unwrap();
        let p = tmp_path("mismatch.json");
        m.save(&p).unwrap();
        assert!(matches!(
            RegressorPipeline::load(&p, &PARAM_FEATURES),
            Err(Error::ModelLoad(_))
        ));
        std::fs::write(&p, "{not json").unwrap();
        assert!(matches!(RegressorPipeline::load(&p, &FIXED_FEATURES), Err(Error::ModelLoad(_))));
        std::fs::remove_file(&p).ok();
        assert!(matches!(
            RegressorPipeline::load(&p, &FIXED_FEATURES),
            Err(Error::MissingInput { .. })
        ));
    }

    #[test]
    fn test_predict_one_checks_width() {
        let (x, y) = toy();
        let m = RegressorPipeline::fit(&FIXED_FEATURES, &x, &y, &net()).unwrap();
        assert!(matches!(m.predict_one(&[1.0, 2.0, 3.0]), Err(Error::ShapeMismatch(_))));
        let v = m.predict_one(&[500.0, 80.0]).unwrap();
        assert!((0.0..=1.0).contains(&v));
    }
}
