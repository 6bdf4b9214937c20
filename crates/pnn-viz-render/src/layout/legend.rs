use crate::canvas::Canvas;
use crate::color::Color;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

pub struct LegendEntry {
    pub label: String,
    pub color: Color,
    pub kind: LegendKind,
}

pub enum LegendKind {
    /// Line swatch with optional dash pattern.
    Line(Option<String>),
    Marker,
}

/// Corner of the plot area the legend box is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPosition {
    UpperRight,
    LowerRight,
}

/// Draw a framed legend inside the plot area.
pub fn draw_legend(
    canvas: &mut Canvas,
    area: &PlotArea,
    entries: &[LegendEntry],
    font_size: f64,
    position: LegendPosition,
) {
    if entries.is_empty() {
        return;
    }

    let row_height = font_size + 3.0;
    let swatch_w = 16.0;
    let gap = 5.0;
    let padding = 5.0;
    let inset = 6.0;

    let text_style = TextStyle {
        size: font_size * 0.85,
        baseline: TextBaseline::Central,
        ..Default::default()
    };

    let max_w = entries
        .iter()
        .map(|e| canvas.measure_text(&e.label, &text_style).width)
        .fold(0.0_f64, f64::max);

    let legend_w = (padding + swatch_w + gap + max_w + padding).min(area.width - 2.0 * inset);
    let legend_h = padding + entries.len() as f64 * row_height + padding;

    let lx = area.right() - legend_w - inset;
    let ly = match position {
        LegendPosition::LowerRight => area.bottom() - legend_h - inset,
        LegendPosition::UpperRight => area.top + inset,
    };

    let bg = Style::filled(Color::rgba(255, 255, 255, 0.85)).with_stroke(Color::rgb(200, 200, 200), 0.5);
    canvas.rect(lx, ly, legend_w, legend_h, &bg);

    for (i, entry) in entries.iter().enumerate() {
        let ey = ly + padding + i as f64 * row_height + row_height / 2.0;
        let sx = lx + padding;
        match &entry.kind {
            LegendKind::Line(dash) => {
                let ls = LineStyle { color: entry.color, width: 1.5, dash: dash.clone() };
                canvas.line(sx, ey, sx + swatch_w, ey, &ls);
            }
            LegendKind::Marker => {
                canvas.marker(sx + swatch_w / 2.0, ey, &MarkerStyle { color: entry.color, ..Default::default() });
            }
        }
        canvas.text(sx + swatch_w + gap, ey, &entry.label, &text_style);
    }
}
