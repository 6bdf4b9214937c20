use serde::{Deserialize, Serialize};

use pnn_core::{ArtifactKind, ArtifactStore, ComparisonConfig, HeatmapConfig, JesKey, Result};
use pnn_io::{NumericTable, read_table};
use pnn_train::RegressorPipeline;
use pnn_train::interpolate::predict_at;

use crate::ARTIFACT_SCHEMA_V1;
use crate::rbf::RbfInterpolator;
use crate::surface::{Surface, difference, steps, window_axes};

/// What a surface holds, which decides its colormap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    /// Model output in `[0, 1]` (sequential colormap).
    Output,
    /// Signed difference of two outputs (diverging colormap).
    Difference,
}

/// A colored surface with optional scattered inputs on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapArtifact {
    /// Schema version.
    pub schema_version: String,
    /// Plot title.
    pub title: String,
    /// X axis label.
    pub x_label: String,
    /// Y axis label.
    pub y_label: String,
    /// Colorbar label.
    pub z_label: String,
    /// Colormap family.
    pub kind: SurfaceKind,
    /// Color scale limits.
    pub z_range: [f64; 2],
    /// Gridded values.
    pub surface: Surface,
    /// Scattered `(x, y, z)` inputs drawn as dots.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scatter: Vec<[f64; 3]>,
}

/// The first `n / 2` and last `n - n / 2` rows (signal and background
/// blocks). The whole table when it is not longer than `n`.
pub fn head_tail_sample(table: &NumericTable, n: usize) -> Result<NumericTable> {
    let rows = table.n_rows();
    if rows <= n {
        return Ok(table.clone());
    }
    let head = n / 2;
    let mut out = table.slice_rows(0..head);
    out.extend(&table.slice_rows(rows - (n - head)..rows))?;
    Ok(out)
}

/// RBF heat map of column `cols[2]` over columns `cols[0]`, `cols[1]`.
pub fn rbf_heatmap(
    title: impl Into<String>,
    table: &NumericTable,
    cols: [usize; 3],
    cfg: &HeatmapConfig,
) -> Result<HeatmapArtifact> {
    let sample = head_tail_sample(table, cfg.sample_size)?.select(&cols)?;
    let points: Vec<[f64; 3]> = sample.rows().map(|r| [r[0], r[1], r[2]]).collect();
    let rbf = RbfInterpolator::fit(&points)?;
    let (x, y) = window_axes(&cfg.window, cfg.grid_points);
    let surface = Surface::from_fn(x, y, |xv, yv| Ok(rbf.eval(xv, yv)))?;
    let title = title.into();
    tracing::debug!(title = %title, nodes = rbf.n_nodes(), grid = cfg.grid_points, "built RBF surface");
    Ok(HeatmapArtifact {
        schema_version: ARTIFACT_SCHEMA_V1.to_string(),
        title,
        x_label: "m_WWbb [GeV]".into(),
        y_label: "m_jj [GeV]".into(),
        z_label: "NN output".into(),
        kind: SurfaceKind::Output,
        z_range: [0.0, 1.0],
        surface,
        scatter: if cfg.scatter { points } else { Vec::new() },
    })
}

/// Heat map of the fixed model's training outputs at one scale.
pub fn fixed_heatmap(store: &ArtifactStore, key: JesKey, cfg: &HeatmapConfig) -> Result<HeatmapArtifact> {
    // mwwbb mjj jes target output
    let table = read_table(&store.resolve(ArtifactKind::FixedOutputs, Some(key))?)?;
    rbf_heatmap(format!("Fixed training, JES = {key}"), &table, [0, 1, 4], cfg)
}

/// Heat map of the parameterized model's validation outputs at one scale.
pub fn param_heatmap(store: &ArtifactStore, key: JesKey, cfg: &HeatmapConfig) -> Result<HeatmapArtifact> {
    // mwwbb mjj output label
    let table = read_table(&store.resolve(ArtifactKind::ParamOutputs, Some(key))?)?;
    rbf_heatmap(format!("Parameterized, JES = {key}"), &table, [0, 1, 2], cfg)
}

/// Fixed and parameterized models on one mass grid plus their difference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridComparison {
    /// Scale compared at.
    pub jes: JesKey,
    /// Fixed model surface.
    pub fixed: HeatmapArtifact,
    /// Parameterized model surface.
    pub parameterized: HeatmapArtifact,
    /// `fixed - parameterized`.
    pub difference: HeatmapArtifact,
}

/// Predict both models on the comparison grid at scale `jes`.
pub fn grid_comparison(
    fixed: &RegressorPipeline,
    param: &RegressorPipeline,
    jes: JesKey,
    cfg: &ComparisonConfig,
) -> Result<GridComparison> {
    let n = cfg.grid_points;
    let x = steps(cfg.window.x[0], cfg.window.x[1], n);
    let y = steps(cfg.window.y[0], cfg.window.y[1], n);
    let fixed_s = Surface::from_fn(x.clone(), y.clone(), |a, b| fixed.predict_one(&[a, b]))?;
    let param_s = Surface::from_fn(x, y, |a, b| predict_at(param, a, b, jes.value()))?;
    let diff = difference(&fixed_s, &param_s)?;

    let make = |title: String, kind, z_range, z_label: &str, surface| HeatmapArtifact {
        schema_version: ARTIFACT_SCHEMA_V1.to_string(),
        title,
        x_label: "m_WWbb [GeV]".into(),
        y_label: "m_jj [GeV]".into(),
        z_label: z_label.into(),
        kind,
        z_range,
        surface,
        scatter: Vec::new(),
    };
    Ok(GridComparison {
        jes,
        fixed: make(format!("Fixed, JES = {jes}"), SurfaceKind::Output, [0.0, 1.0], "NN output", fixed_s),
        parameterized: make(
            format!("Parameterized, JES = {jes}"),
            SurfaceKind::Output,
            [0.0, 1.0],
            "NN output",
            param_s,
        ),
        difference: make(
            format!("Fixed - parameterized, JES = {jes}"),
            SurfaceKind::Difference,
            [-1.0, 1.0],
            "output difference",
            diff,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_tail_sample() {
        let t = NumericTable::from_columns(&[&(0..10).map(|v| v as f64).collect::<Vec<_>>()]).unwrap();
        let s = head_tail_sample(&t, 4).unwrap();
        assert_eq!(s.column(0), vec![0.0, 1.0, 8.0, 9.0]);
        let s = head_tail_sample(&t, 5).unwrap();
        assert_eq!(s.column(0), vec![0.0, 1.0, 7.0, 8.0, 9.0]);
        assert_eq!(head_tail_sample(&t, 20).unwrap().n_rows(), 10);
    }

    #[test]
    fn test_rbf_heatmap_uses_configured_window() {
        let t = NumericTable::from_row_major(
            3,
            vec![100.0, 50.0, 0.9, 900.0, 60.0, 0.8, 2000.0, 300.0, 0.1, 2500.0, 400.0, 0.2],
        )
        .unwrap();
        let cfg = HeatmapConfig { grid_points: 10, sample_size: 4, ..HeatmapConfig::default() };
        let art = rbf_heatmap("t", &t, [0, 1, 2], &cfg).unwrap();
        assert_eq!(art.surface.x.first(), Some(&0.0));
        assert_eq!(art.surface.x.last(), Some(&3000.0));
        assert_eq!(art.surface.y.last(), Some(&500.0));
        assert_eq!(art.surface.z.len(), 100);
        assert_eq!(art.scatter.len(), 4);
        let json = serde_json::to_string(&art).unwrap();
        let back: HeatmapArtifact = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, SurfaceKind::Output);
    }
}
