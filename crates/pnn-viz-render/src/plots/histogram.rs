use pnn_core::EventClass;
use pnn_viz::HistogramArtifact;

use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::header::draw_header;
use crate::layout::axes::Axis;
use crate::layout::legend::{self, LegendEntry, LegendKind, LegendPosition};
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::draw_axes;
use crate::primitives::*;

/// Normalised step histograms. With several scales on one plot, background
/// outlines are dashed.
pub fn render(artifact: &HistogramArtifact, config: &VizConfig) -> crate::Result<String> {
    let edges = &artifact.bin_edges;
    if edges.len() < 2 || artifact.series.is_empty() {
        return Ok(super::empty_svg("No histogram data"));
    }

    let mut canvas = Canvas::new(config.figure.width, config.figure.height)?;
    let x_axis = Axis::fixed(edges[0], artifact.variable.range()[1], 7).with_label(&artifact.x_label);
    let y_max = artifact
        .series
        .iter()
        .flat_map(|s| s.density.iter().copied())
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let y_axis = Axis::auto_linear(0.0, if y_max > 0.0 { y_max * 1.1 } else { 1.0 }, 6).with_label(&artifact.y_label);
    let area = PlotArea::auto(&canvas, &y_axis, &x_axis, &artifact.title, 0.0, config);
    draw_header(&mut canvas, &area, &artifact.title, config);
    draw_axes(&mut canvas, &area, &x_axis, &y_axis, config);

    let multi_scale = artifact.series.iter().any(|s| s.jes != artifact.series[0].jes);
    let edge_px: Vec<f64> = edges.iter().map(|&e| x_axis.data_to_pixel(e, area.left, area.right())).collect();
    let baseline = y_axis.data_to_pixel(0.0, area.bottom(), area.top);

    canvas.push_clip(area.left, area.top, area.width, area.height);
    let mut entries = Vec::with_capacity(artifact.series.len());
    for (i, s) in artifact.series.iter().enumerate() {
        if s.density.len() + 1 != edges.len() {
            return Err(crate::RenderError::Layout(format!(
                "histogram series '{}' has {} bins for {} edges",
                s.label,
                s.density.len(),
                edges.len()
            )));
        }
        let color = config.series_color(i).with_alpha(config.histogram.alpha);
        let dashed = multi_scale && s.class == EventClass::Background;
        let style = LineStyle {
            color,
            width: config.histogram.line_width,
            dash: dashed.then(|| "6 3".to_string()),
        };
        let values: Vec<f64> = s.density.iter().map(|&d| y_axis.data_to_pixel(d, area.bottom(), area.top)).collect();
        canvas.step_outline(&edge_px, &values, baseline, &style);

        let label = if multi_scale { s.label.clone() } else { capitalised(s.class) };
        entries.push(LegendEntry { label, color, kind: LegendKind::Line(style.dash.clone()) });
    }
    canvas.pop_clip();

    legend::draw_legend(&mut canvas, &area, &entries, config.font.size, LegendPosition::UpperRight);
    canvas.finish_svg()
}

fn capitalised(class: EventClass) -> String {
    match class {
        EventClass::Signal => "Signal".into(),
        EventClass::Background => "Background".into(),
    }
}
