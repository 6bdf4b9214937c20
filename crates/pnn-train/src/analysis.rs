//! Comma-separated evaluation tables for downstream statistical analysis.
//!
//! All three tables share the [`EvaluationRecord`] layout, so they can be
//! merged or exported to Parquet without reshaping.

use pnn_core::{AnalysisConfig, ArtifactKind, ArtifactStore, EvaluationRecord, JesKey, Result};
use pnn_io::export::RecordWriter;
use pnn_io::extract::col;
use pnn_io::{load_dataset, read_table, write_scalar, write_table};

use crate::fixed::load_fixed_model;
use crate::interpolate::sweep;
use crate::parameterized::load_param_model;
use crate::roc::roc_curve;

/// AUC of the reference fixed model on one condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceAuc {
    /// Condition the events were generated at.
    pub jes: JesKey,
    /// AUC of the reference model on those events.
    pub auc: f64,
}

/// Apply the fixed model of `analysis.reference_jes` to every condition.
///
/// Writes one table of records (generation scale = condition, evaluation
/// scale = reference) plus ROC points and AUC per condition.
pub fn fixed_reference(store: &mut ArtifactStore, config: &AnalysisConfig) -> Result<Vec<ReferenceAuc>> {
    config.validate()?;
    let reference = JesKey::from_value(config.analysis.reference_jes)?;
    let keys = config.jes_keys()?;
    tracing::info!(reference = %reference, conditions = keys.len(), "processing fixed reference analysis");
    for &key in &keys {
        store.resolve(ArtifactKind::Dataset, Some(key))?;
    }
    let model = load_fixed_model(store, reference)?;

    let table_path = store.path(ArtifactKind::ReferenceAnalysis, None)?;
    let mut writer = RecordWriter::create(&table_path)?;
    let mut aucs = Vec::with_capacity(keys.len());
    for key in keys {
        let dataset = load_dataset(store, key)?;
        let pred = model.predict(&dataset.masses()?)?;
        for (row, &nn) in dataset.table.rows().zip(&pred) {
            writer.write(&EvaluationRecord {
                label: row[col::TARGET],
                mwwbb: row[col::MWWBB],
                mjj: row[col::MJJ],
                nn,
                jes_gen: key.value(),
                jes_eval: reference.value(),
            })?;
        }

        let roc = roc_curve(&dataset.targets(), &pred)?;
        let auc = roc.auc();
        let path = store.path(ArtifactKind::ReferenceRoc, Some(key))?;
        write_table(&path, &roc.to_table()?)?;
        store.record(ArtifactKind::ReferenceRoc, Some(key), &path)?;
        let path = store.path(ArtifactKind::ReferenceAuc, Some(key))?;
        write_scalar(&path, auc)?;
        store.record(ArtifactKind::ReferenceAuc, Some(key), &path)?;
        tracing::info!(jes = %key, auc, "reference fixed model AUC");
        aucs.push(ReferenceAuc { jes: key, auc });
    }
    let rows = writer.finish()?;
    store.record(ArtifactKind::ReferenceAnalysis, None, &table_path)?;
    tracing::debug!(rows, "reference analysis table written");
    Ok(aucs)
}

/// Convert each fixed training table into records evaluated at the
/// condition's own scale. Returns the total number of records.
pub fn fixed_self(store: &mut ArtifactStore, config: &AnalysisConfig) -> Result<usize> {
    config.validate()?;
    let keys = config.jes_keys()?;
    tracing::info!(conditions = keys.len(), "processing fixed self analysis");
    for &key in &keys {
        store.resolve(ArtifactKind::FixedOutputs, Some(key))?;
    }
    let mut total = 0;
    for key in keys {
        // fixed outputs: mwwbb mjj jes target output
        let table = read_table(&store.resolve(ArtifactKind::FixedOutputs, Some(key))?)?;
        let path = store.path(ArtifactKind::SelfAnalysis, Some(key))?;
        let mut writer = RecordWriter::create(&path)?;
        for r in table.rows() {
            writer.write(&EvaluationRecord {
                label: r[3],
                mwwbb: r[0],
                mjj: r[1],
                nn: r[4],
                jes_gen: r[2],
                jes_eval: r[2],
            })?;
        }
        total += writer.finish()?;
        store.record(ArtifactKind::SelfAnalysis, Some(key), &path)?;
    }
    Ok(total)
}

/// Probe the complete parameterized model at every `evaluation.probe` scale
/// for every event of every condition. Returns the number of records.
pub fn parameterized_sweep(store: &mut ArtifactStore, config: &AnalysisConfig) -> Result<usize> {
    config.validate()?;
    let keys = config.jes_keys()?;
    let probe = JesKey::from_values(&config.evaluation.probe)?;
    tracing::info!(
        conditions = keys.len(),
        probes = probe.len(),
        "processing parameterized sweep analysis"
    );
    for &key in &keys {
        store.resolve(ArtifactKind::Dataset, Some(key))?;
    }
    let model = load_param_model(store)?;

    let path = store.path(ArtifactKind::SweepAnalysis, None)?;
    let mut writer = RecordWriter::create(&path)?;
    for key in keys {
        let dataset = load_dataset(store, key)?;
        let n = sweep(&model, &dataset, &probe, |r| writer.write(&r))?;
        tracing::debug!(jes = %key, records = n, "swept condition");
    }
    let rows = writer.finish()?;
    store.record(ArtifactKind::SweepAnalysis, None, &path)?;
    Ok(rows)
}
