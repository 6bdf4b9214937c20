use serde::{Deserialize, Serialize};

use pnn_core::{ArtifactKind, ArtifactStore, JesKey, Result};
use pnn_io::{read_scalar, read_table};
use pnn_train::RocCurve;

use crate::ARTIFACT_SCHEMA_V1;

/// Which stage produced a ROC table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RocSource {
    /// Fixed model on its own condition.
    Fixed,
    /// Parameterized model at the condition's scale.
    Parameterized,
    /// Reference fixed model applied to another condition.
    Reference,
}

impl RocSource {
    fn kinds(self) -> (ArtifactKind, ArtifactKind) {
        match self {
            Self::Fixed => (ArtifactKind::FixedRoc, ArtifactKind::FixedAuc),
            Self::Parameterized => (ArtifactKind::ParamRoc, ArtifactKind::ParamAuc),
            Self::Reference => (ArtifactKind::ReferenceRoc, ArtifactKind::ReferenceAuc),
        }
    }

    /// Legend prefix.
    pub fn label(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Parameterized => "parameterized",
            Self::Reference => "fixed (reference)",
        }
    }
}

/// One ROC curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocSeries {
    /// Legend label (without the AUC).
    pub label: String,
    /// Producing stage.
    pub source: RocSource,
    /// Scale of the evaluated events.
    pub jes: JesKey,
    /// False-positive rate.
    pub fpr: Vec<f64>,
    /// True-positive rate.
    pub tpr: Vec<f64>,
    /// Area under the curve.
    pub auc: f64,
}

/// ROC curves overlaid on one plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocArtifact {
    /// Schema version.
    pub schema_version: String,
    /// Plot title.
    pub title: String,
    /// Curves in draw order.
    pub curves: Vec<RocSeries>,
}

/// Collect persisted ROC points and AUCs into one artifact.
pub fn roc_artifact(
    store: &ArtifactStore,
    title: impl Into<String>,
    entries: &[(RocSource, JesKey)],
) -> Result<RocArtifact> {
    let mut curves = Vec::with_capacity(entries.len());
    for &(source, key) in entries {
        let (roc_kind, auc_kind) = source.kinds();
        let roc = RocCurve::from_table(&read_table(&store.resolve(roc_kind, Some(key))?)?)?;
        let auc = read_scalar(&store.resolve(auc_kind, Some(key))?)?;
        curves.push(RocSeries {
            label: format!("{} JES = {key}", source.label()),
            source,
            jes: key,
            fpr: roc.fpr,
            tpr: roc.tpr,
            auc,
        });
    }
    Ok(RocArtifact { schema_version: ARTIFACT_SCHEMA_V1.to_string(), title: title.into(), curves })
}
