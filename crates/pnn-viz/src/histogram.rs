use serde::{Deserialize, Serialize};

use pnn_core::{ArtifactKind, ArtifactStore, EventClass, JesKey, Result};
use pnn_io::read_table;

use crate::{ARTIFACT_SCHEMA_V1, MassVariable};

/// One normalised step histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSeries {
    /// Legend label.
    pub label: String,
    /// Event class.
    pub class: EventClass,
    /// Scale.
    pub jes: JesKey,
    /// Density per bin; integrates to 1 over the binned range.
    pub density: Vec<f64>,
}

/// Signal and background mass shapes per scale on shared bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramArtifact {
    /// Schema version.
    pub schema_version: String,
    /// Plot title.
    pub title: String,
    /// Binned variable.
    pub variable: MassVariable,
    /// X axis label.
    pub x_label: String,
    /// Y axis label.
    pub y_label: String,
    /// Bin edges (length = n_bins + 1).
    pub bin_edges: Vec<f64>,
    /// Histograms in draw order.
    pub series: Vec<HistogramSeries>,
}

/// Counts per bin; values outside `[edges[0], edges[last]]` are ignored and
/// the last bin is closed.
pub fn bin_counts(values: &[f64], edges: &[f64]) -> Vec<f64> {
    let n_bins = edges.len().saturating_sub(1);
    let mut counts = vec![0.0; n_bins];
    if n_bins == 0 {
        return counts;
    }
    let (lo, hi) = (edges[0], edges[n_bins]);
    for &v in values {
        if !(lo..=hi).contains(&v) {
            continue;
        }
        // First edge strictly greater than v, minus one.
        let idx = edges.partition_point(|&e| e <= v).saturating_sub(1).min(n_bins - 1);
        counts[idx] += 1.0;
    }
    counts
}

/// Normalise counts to unit area. Returns zero-vector if there are no counts.
pub fn density(counts: &[f64], edges: &[f64]) -> Vec<f64> {
    let total: f64 = counts.iter().sum();
    if total <= 0.0 {
        return vec![0.0; counts.len()];
    }
    counts.iter().zip(edges.windows(2)).map(|(&c, w)| c / (total * (w[1] - w[0]))).collect()
}

/// Signal and background shapes of `variable` at every scale in `keys`.
pub fn mass_histogram(
    store: &ArtifactStore,
    variable: MassVariable,
    keys: &[JesKey],
) -> Result<HistogramArtifact> {
    let bin_edges = variable.histogram_edges();
    let width = bin_edges.get(1).copied().unwrap_or(0.0) - bin_edges.first().copied().unwrap_or(0.0);
    let mut series = Vec::with_capacity(2 * keys.len());
    for &key in keys {
        for class in [EventClass::Signal, EventClass::Background] {
            let table = read_table(&store.resolve(ArtifactKind::events(class), Some(key))?)?;
            let counts = bin_counts(&table.column(variable.column()), &bin_edges);
            series.push(HistogramSeries {
                label: format!("{class} JES = {key}"),
                class,
                jes: key,
                density: density(&counts, &bin_edges),
            });
        }
    }
    Ok(HistogramArtifact {
        schema_version: ARTIFACT_SCHEMA_V1.to_string(),
        title: match keys {
            [only] => format!("JES = {only}"),
            _ => format!("{} shapes", variable.name()),
        },
        variable,
        x_label: variable.label().to_string(),
        y_label: format!("Fraction of events / {width:.0} GeV"),
        bin_edges,
        series,
    })
}
