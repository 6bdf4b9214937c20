use crate::color::{Color, Colormap};
use crate::config::*;

/// Built-in theme presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTheme {
    /// matplotlib-like defaults: classic color cycle, dashed grid.
    Paramnn,
    /// Larger type, colorblind-safe palette, no grid.
    Paper,
    /// Outward ticks on two sides only.
    Minimal,
}

impl BuiltinTheme {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "paper" => Self::Paper,
            "minimal" => Self::Minimal,
            _ => Self::Paramnn,
        }
    }

    pub fn base_config(self) -> VizConfig {
        match self {
            Self::Paramnn => paramnn(),
            Self::Paper => paper(),
            Self::Minimal => minimal(),
        }
    }
}

fn paramnn() -> VizConfig {
    VizConfig {
        theme: "paramnn".into(),
        figure: FigureConfig::default(),
        font: FontConfig::default(),
        axes: AxesConfig::default(),
        grid: GridConfig::default(),
        header: HeaderConfig::default(),
        palette: "classic".into(),
        colormaps: ColormapConfig::default(),
        roc: RocConfig::default(),
        histogram: HistogramConfig::default(),
        heatmap: HeatmapStyle::default(),
        output: OutputConfig::default(),
    }
}

fn paper() -> VizConfig {
    VizConfig {
        theme: "paper".into(),
        figure: FigureConfig { width: 504.0, height: 396.0 },
        font: FontConfig { size: 12.0, label_size: 13.0, tick_size: 10.5 },
        axes: AxesConfig { tick_length: 6.0, ..AxesConfig::default() },
        grid: GridConfig { show: false, ..GridConfig::default() },
        header: HeaderConfig { label: "paramnn".into(), status: "Simulation".into() },
        palette: "wong".into(),
        roc: RocConfig { diagonal_color: Color::hex("#7f7f7f"), line_width: 1.6, ..RocConfig::default() },
        ..paramnn()
    }
}

fn minimal() -> VizConfig {
    VizConfig {
        theme: "minimal".into(),
        figure: FigureConfig { width: 432.0, height: 302.4 },
        font: FontConfig { size: 9.0, label_size: 10.0, tick_size: 8.0 },
        axes: AxesConfig {
            tick_direction: "out".into(),
            show_top_ticks: false,
            show_right_ticks: false,
            tick_length: 4.0,
            minor_tick_length: 2.0,
        },
        grid: GridConfig { show: false, ..GridConfig::default() },
        palette: "tableau10".into(),
        colormaps: ColormapConfig { output: Colormap::Viridis, difference: Colormap::RdBu },
        ..paramnn()
    }
}
