//! Probing the parameterized model at arbitrary scales.

use std::fmt;

use pnn_core::{AnalysisConfig, ArtifactKind, ArtifactStore, EvaluationRecord, JesKey, Result};
use pnn_io::extract::col;
use pnn_io::{ConditionDataset, NumericTable, load_dataset, write_scalar, write_table};

use crate::parameterized::{load_holdout_model, load_param_model};
use crate::pipeline::RegressorPipeline;
use crate::roc::roc_curve;

/// Evaluate a parameterized model at one `(mwwbb, mjj, jes)` point.
///
/// The output is passed through unmodified; nothing here clamps it.
pub fn predict_at(model: &RegressorPipeline, mwwbb: f64, mjj: f64, jes: f64) -> Result<f64> {
    model.predict_one(&[mwwbb, mjj, jes])
}

/// Which parameterized model scored a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChoice {
    /// Trained on every condition.
    Complete,
    /// Trained without this condition.
    Holdout(JesKey),
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => f.write_str("complete"),
            Self::Holdout(k) => write!(f, "holdout {k}"),
        }
    }
}

/// Pick the model for condition `key`: its holdout model when allowed and
/// present, the complete model otherwise.
pub fn select_param_model(
    store: &ArtifactStore,
    key: JesKey,
    use_holdout: bool,
) -> Result<(RegressorPipeline, ModelChoice)> {
    if use_holdout && store.entry(ArtifactKind::HoldoutModel, Some(key)).is_some() {
        return Ok((load_holdout_model(store, key)?, ModelChoice::Holdout(key)));
    }
    Ok((load_param_model(store)?, ModelChoice::Complete))
}

/// Validation of one condition at its own scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleEvaluation {
    /// Condition.
    pub jes: JesKey,
    /// Model used.
    pub model: ModelChoice,
    /// Rows evaluated.
    pub n_events: usize,
    /// AUC against the condition's labels.
    pub auc: f64,
}

fn predict_dataset(model: &RegressorPipeline, dataset: &ConditionDataset, jes: f64) -> Result<Vec<f64>> {
    let mut out = Vec::with_capacity(dataset.len());
    let mut outside = 0usize;
    for row in dataset.table.rows() {
        let p = predict_at(model, row[col::MWWBB], row[col::MJJ], jes)?;
        if !(0.0..=1.0).contains(&p) {
            outside += 1;
        }
        out.push(p);
    }
    if outside > 0 {
        tracing::warn!(jes, outside, "predictions outside [0, 1]");
    }
    Ok(out)
}

/// Evaluate every `evaluation.alpha` condition (every training scale when
/// unset) at its own scale and persist
/// `(mwwbb, mjj, output, label)` rows, ROC points and AUC per scale.
pub fn evaluate_alpha(store: &mut ArtifactStore, config: &AnalysisConfig) -> Result<Vec<ScaleEvaluation>> {
    config.validate()?;
    let alpha = config.alpha_keys()?;
    tracing::info!(conditions = alpha.len(), "processing parameterized evaluation");
    for &key in &alpha {
        store.resolve(ArtifactKind::Dataset, Some(key))?;
    }
    store.resolve(ArtifactKind::ParamModel, None)?;

    let mut results = Vec::with_capacity(alpha.len());
    for key in alpha {
        let (model, choice) = select_param_model(store, key, config.evaluation.use_holdout)?;
        let dataset = load_dataset(store, key)?;
        let pred = predict_dataset(&model, &dataset, key.value())?;
        let labels = dataset.targets();

        let mut outputs = NumericTable::with_columns(4);
        for ((row, &p), &y) in dataset.table.rows().zip(&pred).zip(&labels) {
            outputs.push_row(&[row[col::MWWBB], row[col::MJJ], p, y])?;
        }
        let path = store.path(ArtifactKind::ParamOutputs, Some(key))?;
        write_table(&path, &outputs)?;
        store.record(ArtifactKind::ParamOutputs, Some(key), &path)?;

        let roc = roc_curve(&labels, &pred)?;
        let auc = roc.auc();
        let path = store.path(ArtifactKind::ParamRoc, Some(key))?;
        write_table(&path, &roc.to_table()?)?;
        store.record(ArtifactKind::ParamRoc, Some(key), &path)?;
        let path = store.path(ArtifactKind::ParamAuc, Some(key))?;
        write_scalar(&path, auc)?;
        store.record(ArtifactKind::ParamAuc, Some(key), &path)?;

        tracing::info!(jes = %key, model = %choice, auc, "parameterized ROC AUC");
        results.push(ScaleEvaluation { jes: key, model: choice, n_events: dataset.len(), auc });
    }
    Ok(results)
}

/// Evaluate every event of `dataset` at every probe scale, passing each
/// record to `sink` (event-major: all probes of one event, then the next).
/// Returns the number of records produced.
pub fn sweep<F>(
    model: &RegressorPipeline,
    dataset: &ConditionDataset,
    probe: &[JesKey],
    mut sink: F,
) -> Result<usize>
where
    F: FnMut(EvaluationRecord) -> Result<()>,
{
    let mut n = 0;
    let mut outside = 0usize;
    for row in dataset.table.rows() {
        for &scale in probe {
            let nn = predict_at(model, row[col::MWWBB], row[col::MJJ], scale.value())?;
            if !(0.0..=1.0).contains(&nn) {
                outside += 1;
            }
            sink(EvaluationRecord {
                label: row[col::TARGET],
                mwwbb: row[col::MWWBB],
                mjj: row[col::MJJ],
                nn,
                jes_gen: dataset.jes.value(),
                jes_eval: scale.value(),
            })?;
            n += 1;
        }
    }
    if outside > 0 {
        tracing::warn!(jes = %dataset.jes, outside, "sweep predictions outside [0, 1]");
    }
    Ok(n)
}
