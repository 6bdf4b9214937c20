use serde::{Deserialize, Serialize};

use crate::color::{Color, Colormap};
use crate::theme::BuiltinTheme;

/// Render configuration (YAML or programmatic). Colormaps and palettes are
/// looked up here; nothing is process-global.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    pub theme: String,
    pub figure: FigureConfig,
    pub font: FontConfig,
    pub axes: AxesConfig,
    pub grid: GridConfig,
    pub header: HeaderConfig,
    pub palette: String,
    pub colormaps: ColormapConfig,
    pub roc: RocConfig,
    pub histogram: HistogramConfig,
    pub heatmap: HeatmapStyle,
    pub output: OutputConfig,
}

impl Default for VizConfig {
    fn default() -> Self {
        BuiltinTheme::Paramnn.base_config()
    }
}

impl VizConfig {
    pub fn palette_colors(&self) -> Vec<Color> {
        crate::color::palette_colors(&self.palette)
    }

    /// Palette color `i`, cycling.
    pub fn series_color(&self, i: usize) -> Color {
        let colors = self.palette_colors();
        colors.get(i % colors.len().max(1)).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 460.8,  // 6.4" * 72
            height: 345.6, // 4.8" * 72
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub size: f64,
    pub label_size: f64,
    pub tick_size: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self { size: 10.0, label_size: 11.0, tick_size: 8.5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    pub tick_direction: String,
    pub show_top_ticks: bool,
    pub show_right_ticks: bool,
    pub tick_length: f64,
    pub minor_tick_length: f64,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            tick_direction: "in".into(),
            show_top_ticks: true,
            show_right_ticks: true,
            tick_length: 5.0,
            minor_tick_length: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub show: bool,
    pub color: Color,
    pub alpha: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { show: true, color: Color::hex("#b0b0b0"), alpha: 0.6 }
    }
}

/// Label drawn above the plot frame, left of the title.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub label: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColormapConfig {
    /// Outputs in [0, 1].
    pub output: Colormap,
    /// Signed differences.
    pub difference: Colormap,
}

impl Default for ColormapConfig {
    fn default() -> Self {
        Self { output: Colormap::Viridis, difference: Colormap::ViridisDiverging }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RocConfig {
    pub show_diagonal: bool,
    pub diagonal_color: Color,
    pub line_width: f64,
}

impl Default for RocConfig {
    fn default() -> Self {
        Self { show_diagonal: true, diagonal_color: Color::hex("#ff0000"), line_width: 1.2 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramConfig {
    pub line_width: f64,
    pub alpha: f64,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self { line_width: 2.0, alpha: 0.75 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapStyle {
    pub scatter_radius: f64,
    pub scatter_outline: Color,
    pub colorbar_width: f64,
    pub colorbar_steps: usize,
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        Self {
            scatter_radius: 1.6,
            scatter_outline: Color::rgb(40, 40, 40),
            colorbar_width: 12.0,
            colorbar_steps: 64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dpi: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dpi: 220 }
    }
}

/// Recursive mapping merge; `overlay` wins on conflicts.
fn merge_yaml(base: &mut serde_yaml_ng::Value, overlay: serde_yaml_ng::Value) {
    use serde_yaml_ng::Value;
    match (base, overlay) {
        (Value::Mapping(b), Value::Mapping(o)) => {
            for (k, v) in o {
                match b.get_mut(&k) {
                    Some(slot) => merge_yaml(slot, v),
                    None => {
                        b.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

impl VizConfig {
    /// Layer a user document over the base config of the theme it names.
    pub fn from_value(user: serde_yaml_ng::Value) -> crate::Result<Self> {
        let theme = user.get("theme").and_then(|t| t.as_str()).unwrap_or("paramnn");
        let mut base = serde_yaml_ng::to_value(BuiltinTheme::parse(theme).base_config())
            .map_err(|e| crate::RenderError::Config(e.to_string()))?;
        if !user.is_null() {
            merge_yaml(&mut base, user);
        }
        serde_yaml_ng::from_value(base).map_err(|e| crate::RenderError::Config(e.to_string()))
    }
}

/// Resolve a VizConfig from an optional YAML string.
/// Priority: user YAML overrides, then the named theme, then defaults.
pub fn resolve_config(user_yaml: Option<&str>) -> crate::Result<VizConfig> {
    match user_yaml {
        None => Ok(VizConfig::default()),
        Some(yaml) => {
            let value: serde_yaml_ng::Value = serde_yaml_ng::from_str(yaml)
                .map_err(|e| crate::RenderError::Config(e.to_string()))?;
            VizConfig::from_value(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_then_user_override() {
        let cfg = resolve_config(Some("theme: paper\nfont:\n  size: 14\n")).unwrap();
        assert_eq!(cfg.theme, "paper");
        assert_eq!(cfg.font.size, 14.0);
        // Untouched fields keep the theme's values.
        assert_eq!(cfg.font.tick_size, BuiltinTheme::Paper.base_config().font.tick_size);
        assert!(!cfg.grid.show);
    }

    #[test]
    fn colormaps_by_name() {
        let cfg = resolve_config(Some("colormaps:\n  difference: rd_bu\n")).unwrap();
        assert_eq!(cfg.colormaps.difference, Colormap::RdBu);
        assert_eq!(cfg.colormaps.output, Colormap::Viridis);
        assert!(resolve_config(Some("colormaps:\n  output: jet\n")).is_err());
    }

    #[test]
    fn empty_document_is_default() {
        let cfg = resolve_config(Some("")).unwrap();
        assert_eq!(cfg.theme, "paramnn");
        assert_eq!(cfg.output.dpi, 220);
    }
}
