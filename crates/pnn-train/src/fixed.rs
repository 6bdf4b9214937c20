//! Fixed-condition training: one `(mwwbb, mjj)` regressor per JES value.

use pnn_core::{AnalysisConfig, ArtifactKind, ArtifactStore, JesKey, NetworkConfig, Result};
use pnn_io::extract::col;
use pnn_io::{NumericTable, load_dataset, write_scalar, write_table};

use crate::pipeline::{FIXED_FEATURES, RegressorPipeline, r2_score};
use crate::roc::roc_curve;

/// Outcome of training one condition.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedConditionResult {
    /// Condition.
    pub jes: JesKey,
    /// Training rows.
    pub n_events: usize,
    /// Training-set R².
    pub score: f64,
    /// Training-set AUC against the condition's own labels.
    pub auc: f64,
}

/// Load the fixed model of one condition.
pub fn load_fixed_model(store: &ArtifactStore, key: JesKey) -> Result<RegressorPipeline> {
    RegressorPipeline::load(&store.resolve(ArtifactKind::FixedModel, Some(key))?, &FIXED_FEATURES)
}

/// Train every configured condition.
///
/// All condition datasets are resolved before the first fit, so a missing
/// dataset aborts the run without training anything.
pub fn train_fixed(
    store: &mut ArtifactStore,
    config: &AnalysisConfig,
) -> Result<Vec<FixedConditionResult>> {
    config.validate()?;
    let keys = config.jes_keys()?;
    tracing::info!(conditions = keys.len(), "processing fixed training");
    for &key in &keys {
        store.resolve(ArtifactKind::Dataset, Some(key))?;
    }
    keys.iter().map(|&key| train_condition(store, key, &config.fixed.network)).collect()
}

fn train_condition(
    store: &mut ArtifactStore,
    key: JesKey,
    network: &NetworkConfig,
) -> Result<FixedConditionResult> {
    let dataset = load_dataset(store, key)?;
    let x = dataset.masses()?;
    let y = dataset.targets();

    let model = RegressorPipeline::fit(&FIXED_FEATURES, &x, &y, network)?;
    let pred = model.predict(&x)?;
    let score = r2_score(&y, &pred)?;
    tracing::info!(jes = %key, score, "fixed training score");

    let path = store.path(ArtifactKind::FixedModel, Some(key))?;
    model.save(&path)?;
    store.record(ArtifactKind::FixedModel, Some(key), &path)?;

    let mut outputs = NumericTable::with_columns(5);
    for (row, &p) in dataset.table.rows().zip(&pred) {
        outputs.push_row(&[row[col::MWWBB], row[col::MJJ], row[col::JES], row[col::TARGET], p])?;
    }
    let path = store.path(ArtifactKind::FixedOutputs, Some(key))?;
    write_table(&path, &outputs)?;
    store.record(ArtifactKind::FixedOutputs, Some(key), &path)?;

    let roc = roc_curve(&y, &pred)?;
    let auc = roc.auc();
    let path = store.path(ArtifactKind::FixedRoc, Some(key))?;
    write_table(&path, &roc.to_table()?)?;
    store.record(ArtifactKind::FixedRoc, Some(key), &path)?;

    let path = store.path(ArtifactKind::FixedAuc, Some(key))?;
    write_scalar(&path, auc)?;
    store.record(ArtifactKind::FixedAuc, Some(key), &path)?;
    tracing::info!(jes = %key, auc, "fixed ROC AUC");

    Ok(FixedConditionResult { jes: key, n_events: dataset.len(), score, auc })
}
