//! # pnn-viz
//!
//! Plot artifacts for paramnn.
//!
//! Every artifact is a plain serde structure holding the numbers a plot
//! needs (arrays rather than nested objects). Building an artifact reads the
//! pipeline's tables through the artifact store; drawing it is the job of
//! `pnn-viz-render`.

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};

/// RBF heat maps and fixed-vs-parameterized grid comparisons.
pub mod heatmap;
/// Normalised signal/background mass histograms.
pub mod histogram;
/// NN output versus mass.
pub mod outputs;
/// Linear-kernel radial-basis-function interpolation.
pub mod rbf;
/// ROC curves.
pub mod roc;
/// Regular-grid surfaces.
pub mod surface;

pub use heatmap::{GridComparison, HeatmapArtifact, SurfaceKind};
pub use histogram::HistogramArtifact;
pub use outputs::{OutputCurvesArtifact, OutputSource};
pub use rbf::RbfInterpolator;
pub use roc::{RocArtifact, RocSource};
pub use surface::{Surface, difference};

/// Schema version of every artifact in this crate.
pub const ARTIFACT_SCHEMA_V1: &str = "paramnn_viz_v1";

/// Mass variable on a plot axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MassVariable {
    /// Primary mass `m_WWbb`.
    Mwwbb,
    /// Secondary mass `m_jj`.
    Mjj,
}

impl MassVariable {
    /// Column in extracted tables, datasets and output tables.
    pub fn column(self) -> usize {
        match self {
            Self::Mwwbb => 0,
            Self::Mjj => 1,
        }
    }

    /// Axis label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Mwwbb => "m_WWbb [GeV]",
            Self::Mjj => "m_jj [GeV]",
        }
    }

    /// Short name used in file names.
    pub fn name(self) -> &'static str {
        match self {
            Self::Mwwbb => "mwwbb",
            Self::Mjj => "mjj",
        }
    }

    /// Plotted range in GeV.
    pub fn range(self) -> [f64; 2] {
        match self {
            Self::Mwwbb => [0.0, 3000.0],
            Self::Mjj => [0.0, 500.0],
        }
    }

    /// Histogram edges: 50 GeV from 0 below 3000 for `mwwbb`, 15 GeV from 0
    /// below 500 for `mjj`.
    pub fn histogram_edges(self) -> Vec<f64> {
        let [lo, hi] = self.range();
        let width = match self {
            Self::Mwwbb => 50.0,
            Self::Mjj => 15.0,
        };
        (0..).map(|i| lo + i as f64 * width).take_while(|&e| e < hi).collect()
    }
}
