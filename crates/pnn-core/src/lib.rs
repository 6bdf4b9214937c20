//! # pnn-core
//!
//! Core types and contracts for paramnn.
//!
//! Every library stage returns [`Result`], reads its knobs from one shared
//! [`AnalysisConfig`] and turns `(ArtifactKind, JesKey)` pairs into paths
//! exclusively through the [`ArtifactStore`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use config::{
    AnalysisConfig, AnalysisTablesConfig, ComparisonConfig, EvaluationConfig, FixedConfig,
    HeatmapConfig, LearningRule, NetworkConfig, ParameterizedConfig, PlotFormat, PlotsConfig,
    ToyConfig, Window,
};
pub use error::{Error, Result};
pub use store::{ArtifactKind, ArtifactStore, Manifest, ManifestEntry};
pub use types::{EvaluationRecord, Event, EventClass, JesKey};
