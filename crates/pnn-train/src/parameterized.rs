//! Parameterized training: one `(mwwbb, mjj, jes)` regressor across every
//! condition, plus leave-one-condition-out holdout models.

use pnn_core::{AnalysisConfig, ArtifactKind, ArtifactStore, Error, JesKey, Result};
use pnn_io::{ConditionDataset, NumericTable, load_dataset};

use crate::pipeline::{PARAM_FEATURES, RegressorPipeline, r2_score};

/// Outcome of one parameterized fit.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterizedResult {
    /// Held-out condition, `None` for the complete model.
    pub holdout: Option<JesKey>,
    /// Conditions the model was trained on, in order.
    pub conditions: Vec<JesKey>,
    /// Training rows.
    pub n_events: usize,
    /// Training-set R².
    pub score: f64,
}

/// Load the model trained on every condition.
pub fn load_param_model(store: &ArtifactStore) -> Result<RegressorPipeline> {
    RegressorPipeline::load(&store.resolve(ArtifactKind::ParamModel, None)?, &PARAM_FEATURES)
}

/// Load the model that never saw condition `key`.
pub fn load_holdout_model(store: &ArtifactStore, key: JesKey) -> Result<RegressorPipeline> {
    RegressorPipeline::load(&store.resolve(ArtifactKind::HoldoutModel, Some(key))?, &PARAM_FEATURES)
}

/// Stack `(mwwbb, mjj, jes)` rows and labels of every dataset except `exclude`.
pub fn stack_conditions(
    datasets: &[ConditionDataset],
    exclude: Option<JesKey>,
) -> Result<(NumericTable, Vec<f64>)> {
    let mut x = NumericTable::with_columns(PARAM_FEATURES.len());
    let mut y = Vec::new();
    for ds in datasets.iter().filter(|d| Some(d.jes) != exclude) {
        x.extend(&ds.masses_and_scale()?)?;
        y.extend(ds.targets());
    }
    if x.is_empty() {
        return Err(Error::Validation("no training rows left after holdout".into()));
    }
    Ok((x, y))
}

/// Train the complete model and every configured holdout model.
pub fn train_parameterized(
    store: &mut ArtifactStore,
    config: &AnalysisConfig,
) -> Result<Vec<ParameterizedResult>> {
    config.validate()?;
    let keys = config.jes_keys()?;
    let holdout = JesKey::from_values(&config.parameterized.holdout)?;
    tracing::info!(conditions = keys.len(), holdout = holdout.len(), "processing parameterized training");
    for &key in &keys {
        store.resolve(ArtifactKind::Dataset, Some(key))?;
    }
    let datasets = keys.iter().map(|&k| load_dataset(store, k)).collect::<Result<Vec<_>>>()?;

    let mut results = Vec::with_capacity(1 + holdout.len());
    for excluded in std::iter::once(None).chain(holdout.into_iter().map(Some)) {
        let (x, y) = stack_conditions(&datasets, excluded)?;
        let model = RegressorPipeline::fit(&PARAM_FEATURES, &x, &y, &config.parameterized.network)?;
        let score = r2_score(&y, &model.predict(&x)?)?;

        let (kind, label) = match excluded {
            None => (ArtifactKind::ParamModel, "complete".to_string()),
            Some(k) => (ArtifactKind::HoldoutModel, format!("without {k}")),
        };
        tracing::info!(model = %label, rows = x.n_rows(), score, "parameterized training score");
        let path = store.path(kind, excluded)?;
        model.save(&path)?;
        store.record(kind, excluded, &path)?;

        results.push(ParameterizedResult {
            holdout: excluded,
            conditions: keys.iter().copied().filter(|&k| Some(k) != excluded).collect(),
            n_events: x.n_rows(),
            score,
        });
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(millis: u32, n: usize) -> ConditionDataset {
        let k = JesKey::from_millis(millis);
        let mut t = NumericTable::with_columns(5);
        for i in 0..n {
            let target = if i < n / 2 { 1.0 } else { 0.0 };
            t.push_row(&[100.0 * i as f64, 80.0, k.value(), target, 500.0]).unwrap();
        }
        ConditionDataset::new(k, t).unwrap()
    }

    #[test]
    fn test_stack_keeps_order_and_excludes_holdout() {
        let ds = vec![dataset(900, 4), dataset(1000, 2), dataset(1100, 6)];
        let (x, y) = stack_conditions(&ds, None).unwrap();
        assert_eq!(x.n_rows(), 12);
        assert_eq!(y.len(), 12);
        assert_eq!(x.row(0)[2], 0.9);
        assert_eq!(x.row(4)[2], 1.0);
        assert_eq!(x.row(11)[2], 1.1);

        let (x, _) = stack_conditions(&ds, Some(JesKey::from_millis(1000))).unwrap();
        assert_eq!(x.n_rows(), 10);
        assert!(x.rows().all(|r| r[2] != 1.0));

        let only = vec![dataset(1000, 2)];
        assert!(stack_conditions(&only, Some(JesKey::from_millis(1000))).is_err());
    }
}
