//! Keyed artifact store.
//!
//! The store is the only place that turns `(ArtifactKind, JesKey)` into a
//! path. Every write is recorded in `manifest.json` under the store root with
//! its size and sha256, and later stages resolve their inputs through it.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Error, EventClass, JesKey, Result};

/// Manifest file name under the store root.
pub const MANIFEST_FILE: &str = "manifest.json";

const MANIFEST_SCHEMA: &str = "paramnn_manifest_v1";

/// Every artifact the pipeline persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Extracted signal events of one scale.
    SignalEvents,
    /// Extracted background events of one scale.
    BackgroundEvents,
    /// Signal-then-background dataset of one scale.
    Dataset,
    /// Fixed model of one scale.
    FixedModel,
    /// Parameterized model trained on every scale.
    ParamModel,
    /// Parameterized model with one scale held out.
    HoldoutModel,
    /// Fixed training rows `(mwwbb, mjj, jes, label, output)`.
    FixedOutputs,
    /// Parameterized validation rows `(mwwbb, mjj, output, label)`.
    ParamOutputs,
    /// Fixed ROC points.
    FixedRoc,
    /// Fixed AUC.
    FixedAuc,
    /// Parameterized ROC points.
    ParamRoc,
    /// Parameterized AUC.
    ParamAuc,
    /// Reference fixed model applied to every scale (CSV).
    ReferenceAnalysis,
    /// Reference fixed model ROC points per scale.
    ReferenceRoc,
    /// Reference fixed model AUC per scale.
    ReferenceAuc,
    /// Fixed models evaluated at their own scale (CSV).
    SelfAnalysis,
    /// Parameterized probe sweep (CSV).
    SweepAnalysis,
    /// Columnar export of the reference analysis.
    ReferenceColumnar,
    /// Columnar export of one self analysis table.
    SelfColumnar,
    /// Columnar export of the sweep.
    SweepColumnar,
}

impl ArtifactKind {
    /// Stable snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::SignalEvents => "signal_events",
            Self::BackgroundEvents => "background_events",
            Self::Dataset => "dataset",
            Self::FixedModel => "fixed_model",
            Self::ParamModel => "param_model",
            Self::HoldoutModel => "holdout_model",
            Self::FixedOutputs => "fixed_outputs",
            Self::ParamOutputs => "param_outputs",
            Self::FixedRoc => "fixed_roc",
            Self::FixedAuc => "fixed_auc",
            Self::ParamRoc => "param_roc",
            Self::ParamAuc => "param_auc",
            Self::ReferenceAnalysis => "reference_analysis",
            Self::ReferenceRoc => "reference_roc",
            Self::ReferenceAuc => "reference_auc",
            Self::SelfAnalysis => "self_analysis",
            Self::SweepAnalysis => "sweep_analysis",
            Self::ReferenceColumnar => "reference_columnar",
            Self::SelfColumnar => "self_columnar",
            Self::SweepColumnar => "sweep_columnar",
        }
    }

    /// Extracted-event kind of a class.
    pub fn events(class: EventClass) -> Self {
        match class {
            EventClass::Signal => Self::SignalEvents,
            EventClass::Background => Self::BackgroundEvents,
        }
    }

    /// Whether artifacts of this kind exist once per scale.
    pub fn is_keyed(self) -> bool {
        !matches!(
            self,
            Self::ParamModel
                | Self::ReferenceAnalysis
                | Self::SweepAnalysis
                | Self::ReferenceColumnar
                | Self::SweepColumnar
        )
    }

    fn relpath(self, key: Option<JesKey>) -> Result<String> {
        let keyed = |key: Option<JesKey>| {
            key.ok_or_else(|| {
                Error::Validation(format!("artifact kind '{}' needs a JES key", self.name()))
            })
        };
        if !self.is_keyed() && key.is_some() {
            return Err(Error::Validation(format!(
                "artifact kind '{}' is not keyed by JES",
                self.name()
            )));
        }
        Ok(match self {
            Self::SignalEvents | Self::BackgroundEvents => {
                return Err(Error::Validation(format!(
                    "artifact kind '{}' is addressed through the manifest",
                    self.name()
                )));
            }
            Self::Dataset => format!("concatenated/ttbar_mx_{}.dat", keyed(key)?),
            Self::FixedModel => format!("models/fixed_{}.json", keyed(key)?),
            Self::ParamModel => "models/param_complete.json".to_string(),
            Self::HoldoutModel => format!("models/param_{}.json", keyed(key)?),
            Self::FixedOutputs => format!("plot_data/fixed_{}.dat", keyed(key)?),
            Self::ParamOutputs => format!("plot_data/param_{}.dat", keyed(key)?),
            Self::FixedRoc => format!("plot_data/roc/fixed_roc_{}.dat", keyed(key)?),
            Self::FixedAuc => format!("plot_data/auc/fixed_auc_{}.dat", keyed(key)?),
            Self::ParamRoc => format!("plot_data/roc/param_roc_{}.dat", keyed(key)?),
            Self::ParamAuc => format!("plot_data/auc/param_auc_{}.dat", keyed(key)?),
            Self::ReferenceAnalysis => "analysis_data/fixed.csv".to_string(),
            Self::ReferenceRoc => format!("analysis_data/roc/fixed_roc_{}.dat", keyed(key)?),
            Self::ReferenceAuc => format!("analysis_data/auc/fixed_auc_{}.dat", keyed(key)?),
            Self::SelfAnalysis => format!("analysis_data/fixed_{}.csv", keyed(key)?),
            Self::SweepAnalysis => "analysis_data/parameterized.csv".to_string(),
            Self::ReferenceColumnar => "analysis_data/fixed.parquet".to_string(),
            Self::SelfColumnar => format!("analysis_data/fixed_{}.parquet", keyed(key)?),
            Self::SweepColumnar => "analysis_data/parameterized.parquet".to_string(),
        })
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One recorded artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Artifact kind.
    pub kind: ArtifactKind,
    /// Scale key, for keyed kinds.
    pub jes: Option<JesKey>,
    /// Path relative to the store root, `/`-separated.
    pub path: String,
    /// File size in bytes.
    pub bytes: u64,
    /// Hex sha256 of the file contents.
    pub sha256: String,
}

/// `manifest.json` contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Schema identifier.
    pub schema_version: String,
    /// Entries keyed by `"<kind>/<jes>"` (or `"<kind>/all"`).
    pub entries: BTreeMap<String, ManifestEntry>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self { schema_version: MANIFEST_SCHEMA.to_string(), entries: BTreeMap::new() }
    }
}

fn entry_key(kind: ArtifactKind, key: Option<JesKey>) -> String {
    match key {
        Some(k) => format!("{}/{}", kind.name(), k),
        None => format!("{}/all", kind.name()),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    let out = h.finalize();
    let mut s = String::with_capacity(64);
    for b in out {
        s.push_str(&format!("{:02x}", b));
    }
    s
}

/// Directory-backed artifact store.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    manifest: Manifest,
}

impl ArtifactStore {
    /// Open a store rooted at `root`, loading an existing manifest if present.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let manifest_path = root.join(MANIFEST_FILE);
        let manifest = if manifest_path.is_file() {
            let bytes = std::fs::read(&manifest_path)?;
            let manifest: Manifest = serde_json::from_slice(&bytes)?;
            if manifest.schema_version != MANIFEST_SCHEMA {
                return Err(Error::Validation(format!(
                    "unsupported manifest schema '{}' in {}",
                    manifest.schema_version,
                    manifest_path.display()
                )));
            }
            manifest
        } else {
            Manifest::default()
        };
        tracing::debug!(root = %root.display(), entries = manifest.entries.len(), "opened artifact store");
        Ok(Self { root, manifest })
    }

    /// Store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Manifest as currently recorded.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Canonical path of an artifact. Parent directories are created.
    pub fn path(&self, kind: ArtifactKind, key: Option<JesKey>) -> Result<PathBuf> {
        let path = self.root.join(kind.relpath(key)?);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    /// Path of an extracted-events table. Parent directories are created.
    pub fn events_path(&self, class: EventClass, mx: f64, key: JesKey) -> Result<PathBuf> {
        let path = self
            .root
            .join("root_export")
            .join(format!("{}_mx_{:.0}_jes_{}.dat", class.prefix(), mx, key));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    /// Record a written artifact and persist the manifest.
    pub fn record(&mut self, kind: ArtifactKind, key: Option<JesKey>, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path)?;
        let rel = path.strip_prefix(&self.root).map_err(|_| {
            Error::Validation(format!(
                "artifact {} is outside the store root {}",
                path.display(),
                self.root.display()
            ))
        })?;
        let rel = rel.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>();
        let entry = ManifestEntry {
            kind,
            jes: key,
            path: rel.join("/"),
            bytes: bytes.len() as u64,
            sha256: sha256_hex(&bytes),
        };
        let k = entry_key(kind, key);
        if let Some(prev) = self.manifest.entries.get(&k)
            && prev.path != entry.path
        {
            tracing::warn!(entry = %k, old = %prev.path, new = %entry.path, "replacing artifact");
        }
        tracing::debug!(entry = %k, path = %entry.path, bytes = entry.bytes, "recorded artifact");
        self.manifest.entries.insert(k, entry);
        self.save()
    }

    /// Write the manifest to `<root>/manifest.json`.
    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.root.join(MANIFEST_FILE);
        let tmp = self.root.join(format!("{MANIFEST_FILE}.tmp"));
        std::fs::write(&tmp, serde_json::to_string_pretty(&self.manifest)? + "\n")?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Manifest entry of an artifact, if recorded.
    pub fn entry(&self, kind: ArtifactKind, key: Option<JesKey>) -> Option<&ManifestEntry> {
        self.manifest.entries.get(&entry_key(kind, key))
    }

    /// Locate an existing artifact: the manifest first, then the canonical path.
    pub fn resolve(&self, kind: ArtifactKind, key: Option<JesKey>) -> Result<PathBuf> {
        if let Some(entry) = self.entry(kind, key) {
            let path = self.root.join(&entry.path);
            if path.is_file() {
                return Ok(path);
            }
            return Err(Error::missing(describe(kind, key), path));
        }
        match kind.relpath(key) {
            Ok(rel) => {
                let path = self.root.join(rel);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(Error::missing(describe(kind, key), path))
                }
            }
            Err(_)
                if key.is_some()
                    && matches!(kind, ArtifactKind::SignalEvents | ArtifactKind::BackgroundEvents) =>
            {
                Err(Error::missing(describe(kind, key), self.root.join(MANIFEST_FILE)))
            }
            Err(e) => Err(e),
        }
    }

    /// Scale keys recorded for a kind, ascending.
    pub fn keys(&self, kind: ArtifactKind) -> Vec<JesKey> {
        let mut keys: Vec<JesKey> = self
            .manifest
            .entries
            .values()
            .filter(|e| e.kind == kind)
            .filter_map(|e| e.jes)
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

fn describe(kind: ArtifactKind, key: Option<JesKey>) -> String {
    match key {
        Some(k) => format!("{} for jes {}", kind.name(), k),
        None => kind.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_root(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("pnn_store_{}_{}_{}", name, std::process::id(), nanos))
    }

    #[test]
    fn test_canonical_paths() {
        let root = tmp_root("paths");
        let store = ArtifactStore::open(&root).unwrap();
        let k = JesKey::from_value(0.975).unwrap();
        assert_eq!(
            store.path(ArtifactKind::FixedModel, Some(k)).unwrap(),
            root.join("models/fixed_0.975.json")
        );
        assert_eq!(
            store.path(ArtifactKind::Dataset, Some(k)).unwrap(),
            root.join("concatenated/ttbar_mx_0.975.dat")
        );
        assert_eq!(
            store.path(ArtifactKind::ParamModel, None).unwrap(),
            root.join("models/param_complete.json")
        );
        assert_eq!(
            store.events_path(EventClass::Signal, 500.0, k).unwrap(),
            root.join("root_export/sig_mx_500_jes_0.975.dat")
        );
        assert!(store.path(ArtifactKind::FixedModel, None).is_err());
        assert!(store.path(ArtifactKind::ParamModel, Some(k)).is_err());
        assert!(store.path(ArtifactKind::SignalEvents, Some(k)).is_err());
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_record_and_reopen() {
        let root = tmp_root("record");
        let k = JesKey::from_value(1.0).unwrap();
        {
            let mut store = ArtifactStore::open(&root).unwrap();
            let p = store.events_path(EventClass::Background, 0.0, k).unwrap();
            std::fs::write(&p, "1.0 2.0\n").unwrap();
            store.record(ArtifactKind::BackgroundEvents, Some(k), &p).unwrap();
        }
        let store = ArtifactStore::open(&root).unwrap();
        let entry = store.entry(ArtifactKind::BackgroundEvents, Some(k)).unwrap();
        assert_eq!(entry.path, "root_export/bkg_mx_0_jes_1.000.dat");
        assert_eq!(entry.bytes, 8);
        assert_eq!(entry.sha256.len(), 64);
        assert_eq!(store.keys(ArtifactKind::BackgroundEvents), vec![k]);
        assert!(store.resolve(ArtifactKind::BackgroundEvents, Some(k)).is_ok());
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_resolve_missing_is_missing_input() {
        let root = tmp_root("missing");
        let store = ArtifactStore::open(&root).unwrap();
        let k = JesKey::from_value(1.1).unwrap();
        match store.resolve(ArtifactKind::Dataset, Some(k)) {
            Err(Error::MissingInput { what, path }) => {
                assert!(what.contains("1.100"));
                assert!(path.ends_with("concatenated/ttbar_mx_1.100.dat"));
            }
            other => panic!("expected MissingInput, got {other:?}"),
        }
        assert!(matches!(
            store.resolve(ArtifactKind::SignalEvents, Some(k)),
            Err(Error::MissingInput { .. })
        ));
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_resolve_falls_back_to_canonical_path() {
        let root = tmp_root("canonical");
        let store = ArtifactStore::open(&root).unwrap();
        let k = JesKey::from_value(0.9).unwrap();
        let p = store.path(ArtifactKind::Dataset, Some(k)).unwrap();
        std::fs::write(&p, "").unwrap();
        assert_eq!(store.resolve(ArtifactKind::Dataset, Some(k)).unwrap(), p);
        std::fs::remove_dir_all(&root).ok();
    }
}
