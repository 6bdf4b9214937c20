use serde::{Deserialize, Serialize};

use pnn_core::{ArtifactKind, ArtifactStore, Error, JesKey, Result};
use pnn_io::read_table;

use crate::{ARTIFACT_SCHEMA_V1, MassVariable};

/// Which model's outputs a series shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSource {
    /// Fixed model training outputs.
    Fixed,
    /// Parameterized model validation outputs.
    Parameterized,
}

impl OutputSource {
    /// Stored table kind and the column holding the output.
    fn table(self) -> (ArtifactKind, usize) {
        match self {
            Self::Fixed => (ArtifactKind::FixedOutputs, 4),
            Self::Parameterized => (ArtifactKind::ParamOutputs, 2),
        }
    }
}

/// NN output against one mass variable for one model and scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSeries {
    /// Legend label.
    pub label: String,
    /// Producing model.
    pub source: OutputSource,
    /// Scale.
    pub jes: JesKey,
    /// Mass values, ascending.
    pub x: Vec<f64>,
    /// Output at each mass value.
    pub y: Vec<f64>,
}

/// Output-versus-mass scatter, one series per (model, scale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputCurvesArtifact {
    /// Schema version.
    pub schema_version: String,
    /// Plot title.
    pub title: String,
    /// Mass on the x axis.
    pub variable: MassVariable,
    /// X axis label.
    pub x_label: String,
    /// Y axis label.
    pub y_label: String,
    /// Series in draw order.
    pub series: Vec<OutputSeries>,
}

/// Build output curves from persisted output tables, keeping every
/// `decimate`-th point after sorting by mass.
pub fn output_curves(
    store: &ArtifactStore,
    title: impl Into<String>,
    variable: MassVariable,
    entries: &[(OutputSource, JesKey)],
    decimate: usize,
) -> Result<OutputCurvesArtifact> {
    if decimate == 0 {
        return Err(Error::Validation("decimate must be >= 1".into()));
    }
    let mut series = Vec::with_capacity(entries.len());
    for &(source, key) in entries {
        let (kind, out_col) = source.table();
        let table = read_table(&store.resolve(kind, Some(key))?)?;
        let mut pts: Vec<(f64, f64)> =
            table.rows().map(|r| (r[variable.column()], r[out_col])).collect();
        pts.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (x, y) = pts.into_iter().step_by(decimate).unzip();
        let label = match source {
            OutputSource::Fixed => format!("fixed JES = {key}"),
            OutputSource::Parameterized => format!("parameterized JES = {key}"),
        };
        series.push(OutputSeries { label, source, jes: key, x, y });
    }
    Ok(OutputCurvesArtifact {
        schema_version: ARTIFACT_SCHEMA_V1.to_string(),
        title: title.into(),
        variable,
        x_label: variable.label().to_string(),
        y_label: "NN output".to_string(),
        series,
    })
}
