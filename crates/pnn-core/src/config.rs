//! Analysis configuration.
//!
//! One [`AnalysisConfig`] is built per run and passed by reference to every
//! stage. Every section falls back to the values of the reference analysis
//! when omitted, so an empty document is a valid configuration.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, JesKey, Result};

/// Training scale list of the reference analysis.
pub const DEFAULT_JES: [f64; 9] = [0.750, 0.900, 0.950, 0.975, 1.000, 1.025, 1.050, 1.100, 1.250];

/// Top-level configuration shared by all stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Root of the keyed artifact store.
    pub data_dir: PathBuf,
    /// Root directory for rendered plots.
    pub plot_dir: PathBuf,
    /// Directory holding the Parquet event files to extract.
    pub input_dir: PathBuf,
    /// Tree name every event file must carry.
    pub tree: String,
    /// Training scale list, in processing order.
    pub jes: Vec<f64>,
    /// Fixed-condition trainer.
    pub fixed: FixedConfig,
    /// Parameterized trainer.
    pub parameterized: ParameterizedConfig,
    /// Interpolation evaluator.
    pub evaluation: EvaluationConfig,
    /// Analysis tables.
    pub analysis: AnalysisTablesConfig,
    /// RBF heat maps.
    pub heatmap: HeatmapConfig,
    /// Fixed-vs-parameterized grid comparison.
    pub comparison: ComparisonConfig,
    /// Plot selection and output formats.
    pub plots: PlotsConfig,
    /// Toy event generator.
    pub toy: ToyConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            plot_dir: PathBuf::from("plots"),
            input_dir: PathBuf::from("data/events"),
            tree: "xtt".to_string(),
            jes: DEFAULT_JES.to_vec(),
            fixed: FixedConfig::default(),
            parameterized: ParameterizedConfig::default(),
            evaluation: EvaluationConfig::default(),
            analysis: AnalysisTablesConfig::default(),
            heatmap: HeatmapConfig::default(),
            comparison: ComparisonConfig::default(),
            plots: PlotsConfig::default(),
            toy: ToyConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Training scales as keys, in configured order.
    pub fn jes_keys(&self) -> Result<Vec<JesKey>> {
        JesKey::from_values(&self.jes)
    }

    /// Conditions validated at their own scale; every training scale when unset.
    pub fn alpha_keys(&self) -> Result<Vec<JesKey>> {
        match &self.evaluation.alpha {
            Some(alpha) => JesKey::from_values(alpha),
            None => self.jes_keys(),
        }
    }

    /// Scales of the grid comparison; every training scale when unset.
    pub fn grid_alpha_keys(&self) -> Result<Vec<JesKey>> {
        match &self.comparison.grid_alpha {
            Some(alpha) => JesKey::from_values(alpha),
            None => self.jes_keys(),
        }
    }

    /// Check cross-field contracts. Stages call this before touching disk.
    pub fn validate(&self) -> Result<()> {
        let jes = self.jes_keys()?;
        if jes.is_empty() {
            return Err(Error::Validation("jes list must not be empty".into()));
        }
        if self.tree.trim().is_empty() {
            return Err(Error::Validation("tree name must not be empty".into()));
        }
        self.fixed.network.validate("fixed.network")?;
        self.parameterized.network.validate("parameterized.network")?;

        for key in JesKey::from_values(&self.parameterized.holdout)? {
            if !jes.contains(&key) {
                return Err(Error::Validation(format!(
                    "parameterized.holdout value {key} is not in the jes list"
                )));
            }
            if jes.len() < 2 {
                return Err(Error::Validation(
                    "holdout training needs at least two jes values".into(),
                ));
            }
        }

        self.alpha_keys()?;
        if JesKey::from_values(&self.evaluation.probe)?.is_empty() {
            return Err(Error::Validation("evaluation.probe must not be empty".into()));
        }
        JesKey::from_value(self.analysis.reference_jes)?;

        self.heatmap.window.validate("heatmap.window")?;
        if self.heatmap.grid_points < 2 {
            return Err(Error::Validation("heatmap.grid_points must be >= 2".into()));
        }
        if self.heatmap.sample_size < 2 {
            return Err(Error::Validation("heatmap.sample_size must be >= 2".into()));
        }
        self.comparison.window.validate("comparison.window")?;
        if self.comparison.grid_points < 2 {
            return Err(Error::Validation("comparison.grid_points must be >= 2".into()));
        }
        self.grid_alpha_keys()?;
        JesKey::from_values(&self.plots.overlay_jes)?;
        if self.plots.formats.is_empty() {
            return Err(Error::Validation("plots.formats must not be empty".into()));
        }
        if self.toy.events_per_file == 0 {
            return Err(Error::Validation("toy.events_per_file must be > 0".into()));
        }
        Ok(())
    }
}

/// Gradient-descent update rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningRule {
    /// Plain mini-batch SGD.
    Sgd,
    /// Nesterov accelerated momentum.
    Nesterov,
}

/// Hyper-parameters of one MLP fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// Sigmoid units in the hidden layer.
    pub hidden_units: usize,
    /// Step size.
    pub learning_rate: f64,
    /// Passes over the training set.
    pub epochs: usize,
    /// Rows per gradient step.
    pub batch_size: usize,
    /// Update rule.
    pub learning_rule: LearningRule,
    /// Momentum coefficient (Nesterov only).
    pub momentum: f64,
    /// Seed for weight initialisation and shuffling.
    pub seed: u64,
}

impl NetworkConfig {
    /// Fixed-condition defaults: 3 units, lr 0.1, 25 epochs, batch 1, sgd.
    pub fn fixed_default() -> Self {
        Self {
            hidden_units: 3,
            learning_rate: 0.1,
            epochs: 25,
            batch_size: 1,
            learning_rule: LearningRule::Sgd,
            momentum: 0.9,
            seed: 42,
        }
    }

    /// Parameterized defaults: 3 units, lr 0.01, 50 epochs, batch 10, nesterov.
    pub fn parameterized_default() -> Self {
        Self {
            learning_rate: 0.01,
            epochs: 50,
            batch_size: 10,
            learning_rule: LearningRule::Nesterov,
            ..Self::fixed_default()
        }
    }

    fn validate(&self, section: &str) -> Result<()> {
        if self.hidden_units == 0 {
            return Err(Error::Validation(format!("{section}.hidden_units must be > 0")));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::Validation(format!(
                "{section}.learning_rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }
        if self.epochs == 0 {
            return Err(Error::Validation(format!("{section}.epochs must be > 0")));
        }
        if self.batch_size == 0 {
            return Err(Error::Validation(format!("{section}.batch_size must be > 0")));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(Error::Validation(format!(
                "{section}.momentum must be in [0, 1), got {}",
                self.momentum
            )));
        }
        Ok(())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::fixed_default()
    }
}

/// Fixed-condition trainer settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixedConfig {
    /// Network hyper-parameters.
    pub network: NetworkConfig,
}

/// Parameterized trainer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterizedConfig {
    /// Network hyper-parameters. Omitted fields fall back to the
    /// parameterized defaults.
    #[serde(deserialize_with = "parameterized_network")]
    pub network: NetworkConfig,
    /// Scales to leave out, one extra model per value.
    pub holdout: Vec<f64>,
}

impl Default for ParameterizedConfig {
    fn default() -> Self {
        Self { network: NetworkConfig::parameterized_default(), holdout: Vec::new() }
    }
}

/// Network fields given in a document; unset ones keep a base config.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct NetworkOverrides {
    hidden_units: Option<usize>,
    learning_rate: Option<f64>,
    epochs: Option<usize>,
    batch_size: Option<usize>,
    learning_rule: Option<LearningRule>,
    momentum: Option<f64>,
    seed: Option<u64>,
}

impl NetworkOverrides {
    fn over(self, base: NetworkConfig) -> NetworkConfig {
        NetworkConfig {
            hidden_units: self.hidden_units.unwrap_or(base.hidden_units),
            learning_rate: self.learning_rate.unwrap_or(base.learning_rate),
            epochs: self.epochs.unwrap_or(base.epochs),
            batch_size: self.batch_size.unwrap_or(base.batch_size),
            learning_rule: self.learning_rule.unwrap_or(base.learning_rule),
            momentum: self.momentum.unwrap_or(base.momentum),
            seed: self.seed.unwrap_or(base.seed),
        }
    }
}

fn parameterized_network<'de, D>(deserializer: D) -> std::result::Result<NetworkConfig, D::Error>
where
    D: Deserializer<'de>,
{
    NetworkOverrides::deserialize(deserializer)
        .map(|o| o.over(NetworkConfig::parameterized_default()))
}

/// Interpolation evaluator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluationConfig {
    /// Conditions validated at their own scale. Unset means every `jes` value.
    pub alpha: Option<Vec<f64>>,
    /// Scales every event is probed at in the sweep.
    pub probe: Vec<f64>,
    /// Prefer the holdout model of a scale when one exists.
    pub use_holdout: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            alpha: None,
            probe: vec![0.5, 0.7, 0.9, 1.1, 1.3, 1.5],
            use_holdout: true,
        }
    }
}

/// Analysis table settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisTablesConfig {
    /// Scale of the fixed model applied to every condition.
    pub reference_jes: f64,
}

impl Default for AnalysisTablesConfig {
    fn default() -> Self {
        Self { reference_jes: 1.0 }
    }
}

/// Rectangular mass window `x × y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Window {
    /// `[lo, hi]` of the primary mass.
    pub x: [f64; 2],
    /// `[lo, hi]` of the secondary mass.
    pub y: [f64; 2],
}

impl Window {
    fn validate(&self, section: &str) -> Result<()> {
        let ok = |r: [f64; 2]| r[0].is_finite() && r[1].is_finite() && r[0] < r[1];
        if !ok(self.x) || !ok(self.y) {
            return Err(Error::Validation(format!(
                "{section} must have finite lo < hi, got x={:?} y={:?}",
                self.x, self.y
            )));
        }
        Ok(())
    }
}

/// RBF heat-map settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeatmapConfig {
    /// Physical window of the interpolation grid.
    pub window: Window,
    /// Grid points per axis.
    pub grid_points: usize,
    /// Scattered inputs: first half and last half of the table.
    pub sample_size: usize,
    /// Overlay the scattered inputs.
    pub scatter: bool,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            window: Window { x: [0.0, 3000.0], y: [0.0, 500.0] },
            grid_points: 100,
            sample_size: 1000,
            scatter: true,
        }
    }
}

/// Fixed-vs-parameterized grid comparison settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparisonConfig {
    /// Scales to compare. Unset means every `jes` value.
    pub grid_alpha: Option<Vec<f64>>,
    /// Grid points per axis.
    pub grid_points: usize,
    /// Physical window of the grid.
    pub window: Window,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            grid_alpha: None,
            grid_points: 60,
            window: Window { x: [0.0, 3000.0], y: [0.0, 3000.0] },
        }
    }
}

/// Plot file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotFormat {
    /// Scalable vector graphics (always available).
    Svg,
    /// Raster via resvg.
    Png,
    /// Vector PDF via svg2pdf.
    Pdf,
}

impl PlotFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }
}

/// Plot selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotsConfig {
    /// Scales drawn in overlay plots (output curves, ROC, histograms).
    pub overlay_jes: Vec<f64>,
    /// Formats written for every plot.
    pub formats: Vec<PlotFormat>,
    /// Keep every n-th point of output curves (1 keeps all).
    pub decimate: usize,
}

impl Default for PlotsConfig {
    fn default() -> Self {
        Self {
            overlay_jes: vec![0.750, 1.000, 1.250],
            formats: vec![PlotFormat::Svg, PlotFormat::Png],
            decimate: 1,
        }
    }
}

/// Toy event generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToyConfig {
    /// Events per (class, scale) file.
    pub events_per_file: usize,
    /// Resonance mass of the signal hypothesis.
    pub mx: f64,
    /// Generator seed.
    pub seed: u64,
}

impl Default for ToyConfig {
    fn default() -> Self {
        Self { events_per_file: 2000, mx: 500.0, seed: 1234 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_reference_analysis() {
        let cfg: AnalysisConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, AnalysisConfig::default());
        assert_eq!(cfg.jes_keys().unwrap().len(), 9);
        assert_eq!(cfg.fixed.network.batch_size, 1);
        assert_eq!(cfg.parameterized.network.learning_rule, LearningRule::Nesterov);
        assert_eq!(cfg.parameterized.network.epochs, 50);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let cfg: AnalysisConfig = serde_json::from_str(
            r#"{"jes":[0.9,1.0],"fixed":{"network":{"epochs":3}},"heatmap":{"grid_points":20}}"#,
        )
        .unwrap();
        assert_eq!(cfg.fixed.network.epochs, 3);
        assert_eq!(cfg.fixed.network.learning_rate, 0.1);
        assert_eq!(cfg.heatmap.grid_points, 20);
        assert_eq!(cfg.heatmap.sample_size, 1000);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_partial_parameterized_network_keeps_its_defaults() {
        let cfg: AnalysisConfig =
            serde_json::from_str(r#"{"parameterized":{"network":{"epochs":5}}}"#).unwrap();
        let net = &cfg.parameterized.network;
        assert_eq!(net.epochs, 5);
        assert_eq!(net.learning_rule, LearningRule::Nesterov);
        assert_eq!(net.learning_rate, 0.01);
        assert_eq!(net.batch_size, 10);
        assert_eq!(cfg.fixed.network, NetworkConfig::fixed_default());

        let cfg: AnalysisConfig =
            serde_json::from_str(r#"{"fixed":{"network":{"epochs":5}}}"#).unwrap();
        assert_eq!(cfg.fixed.network.learning_rule, LearningRule::Sgd);
        assert_eq!(cfg.parameterized.network, NetworkConfig::parameterized_default());

        assert!(
            serde_json::from_str::<AnalysisConfig>(r#"{"parameterized":{"network":{"epochz":5}}}"#)
                .is_err()
        );
    }

    #[test]
    fn test_alpha_lists_default_to_training_scales() {
        let cfg: AnalysisConfig = serde_json::from_str(r#"{"jes":[0.9,1.0,1.1]}"#).unwrap();
        assert_eq!(cfg.alpha_keys().unwrap(), cfg.jes_keys().unwrap());
        assert_eq!(cfg.grid_alpha_keys().unwrap().len(), 3);

        let cfg: AnalysisConfig = serde_json::from_str(
            r#"{"jes":[0.9,1.0,1.1],"evaluation":{"alpha":[1.1]},"comparison":{"grid_alpha":[]}}"#,
        )
        .unwrap();
        assert_eq!(cfg.alpha_keys().unwrap(), vec![JesKey::from_millis(1100)]);
        assert!(cfg.grid_alpha_keys().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_json::from_str::<AnalysisConfig>(r#"{"jes_list":[1.0]}"#).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_contracts() {
        let mut cfg = AnalysisConfig::default();
        cfg.parameterized.holdout = vec![0.8];
        assert!(cfg.validate().is_err());

        let mut cfg = AnalysisConfig::default();
        cfg.jes = vec![1.0, 1.0];
        assert!(cfg.validate().is_err());

        let mut cfg = AnalysisConfig::default();
        cfg.fixed.network.learning_rate = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = AnalysisConfig::default();
        cfg.heatmap.window.x = [10.0, 10.0];
        assert!(cfg.validate().is_err());
    }
}
