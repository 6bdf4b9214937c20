//! Signal + background concatenation into per-scale condition datasets.

use pnn_core::{ArtifactKind, ArtifactStore, Error, JesKey, Result};

use crate::extract::col;
use crate::table::{NumericTable, read_table, write_table};

/// Signal rows followed by background rows, all at one scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionDataset {
    /// Scale of every row.
    pub jes: JesKey,
    /// Rows `[0, n_signal)` are signal, the rest background.
    pub n_signal: usize,
    /// `mwwbb mjj jes target mx` rows.
    pub table: NumericTable,
}

impl ConditionDataset {
    /// Wrap a table, checking the label contract.
    pub fn new(jes: JesKey, table: NumericTable) -> Result<Self> {
        if table.n_cols() != col::N {
            return Err(Error::ShapeMismatch(format!(
                "condition dataset needs {} columns, got {}",
                col::N,
                table.n_cols()
            )));
        }
        let mut n_signal = 0;
        let mut in_background = false;
        for (i, row) in table.rows().enumerate() {
            match row[col::TARGET] {
                t if t == 1.0 && !in_background => n_signal += 1,
                t if t == 0.0 => in_background = true,
                t if t == 1.0 => {
                    return Err(Error::Validation(format!(
                        "dataset {jes}: signal row {i} follows the background block"
                    )));
                }
                t => {
                    return Err(Error::Validation(format!(
                        "dataset {jes}: row {i} has label {t}, expected 0 or 1"
                    )));
                }
            }
        }
        Ok(Self { jes, n_signal, table })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.table.n_rows()
    }

    /// `true` when the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// `(mwwbb, mjj)` feature rows.
    pub fn masses(&self) -> Result<NumericTable> {
        self.table.select(&[col::MWWBB, col::MJJ])
    }

    /// `(mwwbb, mjj, jes)` feature rows.
    pub fn masses_and_scale(&self) -> Result<NumericTable> {
        self.table.select(&[col::MWWBB, col::MJJ, col::JES])
    }

    /// Labels.
    pub fn targets(&self) -> Vec<f64> {
        self.table.column(col::TARGET)
    }
}

/// Stack signal rows on top of background rows.
pub fn concatenate(signal: &NumericTable, background: &NumericTable) -> Result<NumericTable> {
    let mut out = signal.clone();
    out.extend(background)?;
    Ok(out)
}

/// Pair every extracted signal table with the background table of the same
/// scale and write one condition dataset per scale.
///
/// A scale with only one of the two classes extracted is a `MissingInput`.
pub fn concatenate_all(store: &mut ArtifactStore) -> Result<Vec<JesKey>> {
    let signal = store.keys(ArtifactKind::SignalEvents);
    let background = store.keys(ArtifactKind::BackgroundEvents);
    if signal.is_empty() && background.is_empty() {
        return Err(Error::missing("extracted events", store.root().join("root_export")));
    }
    tracing::info!(scales = signal.len(), "processing concatenation");

    for key in &background {
        if !signal.contains(key) {
            store.resolve(ArtifactKind::SignalEvents, Some(*key))?;
        }
    }
    for &key in &signal {
        let sig = read_table(&store.resolve(ArtifactKind::SignalEvents, Some(key))?)?;
        let bkg = read_table(&store.resolve(ArtifactKind::BackgroundEvents, Some(key))?)?;
        let table = concatenate(&sig, &bkg)?;
        // Re-check the label contract on the combined rows.
        let dataset = ConditionDataset::new(key, table)?;
        let path = store.path(ArtifactKind::Dataset, Some(key))?;
        write_table(&path, &dataset.table)?;
        store.record(ArtifactKind::Dataset, Some(key), &path)?;
        tracing::debug!(jes = %key, n_signal = dataset.n_signal, rows = dataset.len(), "concatenated");
    }
    Ok(signal)
}

/// Load the condition dataset of one scale.
pub fn load_dataset(store: &ArtifactStore, key: JesKey) -> Result<ConditionDataset> {
    let path = store.resolve(ArtifactKind::Dataset, Some(key))?;
    ConditionDataset::new(key, read_table(&path)?)
}
