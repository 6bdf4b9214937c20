//! Pipeline file shared by `paramnn run` and the per-stage subcommands.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use pnn_core::AnalysisConfig;
use pnn_viz_render::config::VizConfig;

/// One pipeline stage, in the order `run` executes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Generate,
    Extract,
    Concat,
    TrainFixed,
    TrainParam,
    Evaluate,
    Analysis,
    Export,
    Plot,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Extract => "extract",
            Self::Concat => "concat",
            Self::TrainFixed => "train-fixed",
            Self::TrainParam => "train-param",
            Self::Evaluate => "evaluate",
            Self::Analysis => "analysis",
            Self::Export => "export",
            Self::Plot => "plot",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PipelineFile {
    config: AnalysisConfig,
    render: Option<serde_yaml_ng::Value>,
    stages: Vec<Stage>,
}

/// Resolved pipeline: analysis config, renderer config and stage list.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub config: AnalysisConfig,
    pub render: VizConfig,
    pub stages: Vec<Stage>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self { config: AnalysisConfig::default(), render: VizConfig::default(), stages: Vec::new() }
    }
}

/// Read a pipeline file. JSON when the extension is `.json`, YAML otherwise.
pub fn read_pipeline(path: &Path) -> Result<Pipeline> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read pipeline file {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase();
    let file: PipelineFile = if ext == "json" {
        serde_json::from_slice(&bytes)
            .with_context(|| format!("invalid pipeline file {}", path.display()))?
    } else {
        serde_yaml_ng::from_slice(&bytes)
            .with_context(|| format!("invalid pipeline file {}", path.display()))?
    };
    let render = VizConfig::from_value(file.render.unwrap_or(serde_yaml_ng::Value::Null))
        .with_context(|| format!("invalid render section in {}", path.display()))?;
    file.config
        .validate()
        .with_context(|| format!("invalid config section in {}", path.display()))?;
    tracing::info!(path = %path.display(), stages = file.stages.len(), "loaded pipeline");
    Ok(Pipeline { config: file.config, render, stages: file.stages })
}

/// Pipeline from `--config`, or the reference analysis when omitted.
pub fn load(path: Option<&Path>) -> Result<Pipeline> {
    match path {
        Some(p) => read_pipeline(p),
        None => Ok(Pipeline::default()),
    }
}
