//! # pnn-viz-render
//!
//! Draws `pnn-viz` artifacts. Every plot is built on an SVG canvas; PNG
//! (resvg) and PDF (svg2pdf) are conversions of that SVG behind the `png`
//! and `pdf` features.

pub mod canvas;
pub mod color;
pub mod config;
#[cfg(any(feature = "png", feature = "pdf"))]
pub mod font;
pub mod header;
pub mod layout;
pub mod output;
pub mod plots;
pub mod primitives;
pub mod text;
pub mod theme;

use config::VizConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown artifact kind: {0}")]
    UnknownKind(String),
    #[error("unknown output format: {0}")]
    UnknownFormat(String),
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("layout error: {0}")]
    Layout(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "png")]
    #[error("PNG encoding error: {0}")]
    Png(String),
    #[cfg(feature = "pdf")]
    #[error("PDF conversion error: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Artifact kinds understood by [`render_svg`].
pub const KINDS: &[&str] = &["roc", "outputs", "heatmap", "comparison", "histogram"];

/// Render an artifact JSON to an SVG string.
pub fn render_svg(artifact_json: &str, kind: &str, config: &VizConfig) -> Result<String> {
    match kind {
        "roc" => {
            let art: pnn_viz::RocArtifact = serde_json::from_str(artifact_json)?;
            plots::roc::render(&art, config)
        }
        "outputs" => {
            let art: pnn_viz::OutputCurvesArtifact = serde_json::from_str(artifact_json)?;
            plots::outputs::render(&art, config)
        }
        "heatmap" => {
            let art: pnn_viz::HeatmapArtifact = serde_json::from_str(artifact_json)?;
            plots::heatmap::render(&art, config)
        }
        "comparison" => {
            let art: pnn_viz::GridComparison = serde_json::from_str(artifact_json)?;
            plots::heatmap::render_comparison(&art, config)
        }
        "histogram" => {
            let art: pnn_viz::HistogramArtifact = serde_json::from_str(artifact_json)?;
            plots::histogram::render(&art, config)
        }
        other => Err(RenderError::UnknownKind(other.to_string())),
    }
}

/// Render an artifact JSON to bytes in `format` (`svg`, `png`, `pdf`).
pub fn render_to_bytes(artifact_json: &str, kind: &str, format: &str, config: &VizConfig) -> Result<Vec<u8>> {
    let svg = render_svg(artifact_json, kind, config)?;
    svg_to_bytes(svg, format, config)
}

/// Convert an already rendered SVG document to `format`.
#[cfg_attr(not(feature = "png"), allow(unused_variables))]
pub fn svg_to_bytes(svg: String, format: &str, config: &VizConfig) -> Result<Vec<u8>> {
    match format {
        "svg" => Ok(svg.into_bytes()),
        #[cfg(feature = "png")]
        "png" => output::png::svg_to_png(&svg, config.output.dpi),
        #[cfg(feature = "pdf")]
        "pdf" => output::pdf::svg_to_pdf(&svg),
        other => Err(RenderError::UnknownFormat(other.to_string())),
    }
}

/// Render an artifact JSON to a file; the format comes from the extension.
pub fn render_to_file(artifact_json: &str, kind: &str, path: &std::path::Path, config: &VizConfig) -> Result<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("svg");
    let bytes = render_to_bytes(artifact_json, kind, ext, config)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}
