use pnn_viz::{OutputCurvesArtifact, OutputSource};

use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::header::draw_header;
use crate::layout::axes::Axis;
use crate::layout::legend::{self, LegendEntry, LegendKind, LegendPosition};
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::{Frame, draw_axes};
use crate::primitives::*;

/// NN output against mass as markers. One color per scale; fixed series are
/// filled dots, parameterized series hollow circles.
pub fn render(artifact: &OutputCurvesArtifact, config: &VizConfig) -> crate::Result<String> {
    if artifact.series.iter().all(|s| s.x.is_empty()) {
        return Ok(super::empty_svg("No output curves"));
    }

    let mut canvas = Canvas::new(config.figure.width, config.figure.height)?;
    let [lo, hi] = artifact.variable.range();
    let x_axis = Axis::fixed(lo, hi, 7).with_label(&artifact.x_label);
    let y_axis = Axis::fixed(0.0, 1.0, 6).with_label(&artifact.y_label);
    let area = PlotArea::auto(&canvas, &y_axis, &x_axis, &artifact.title, 0.0, config);
    draw_header(&mut canvas, &area, &artifact.title, config);
    draw_axes(&mut canvas, &area, &x_axis, &y_axis, config);
    let frame = Frame { area: &area, x: &x_axis, y: &y_axis };

    // Same scale, same color across sources.
    let mut scales = Vec::new();
    for s in &artifact.series {
        if !scales.contains(&s.jes) {
            scales.push(s.jes);
        }
    }

    canvas.push_clip(area.left, area.top, area.width, area.height);
    let mut entries = Vec::with_capacity(artifact.series.len());
    for s in &artifact.series {
        let idx = scales.iter().position(|k| *k == s.jes).unwrap_or(0);
        let color = config.series_color(idx);
        let marker = match s.source {
            OutputSource::Fixed => MarkerStyle { size: 1.6, color, fill: true },
            OutputSource::Parameterized => MarkerStyle { size: 2.6, color: color.with_alpha(0.5), fill: false },
        };
        for (&x, &y) in s.x.iter().zip(&s.y) {
            let (px, py) = frame.px(x, y);
            canvas.marker(px, py, &marker);
        }
        entries.push(LegendEntry { label: s.label.clone(), color, kind: LegendKind::Marker });
    }
    canvas.pop_clip();

    legend::draw_legend(&mut canvas, &area, &entries, config.font.size, LegendPosition::LowerRight);
    canvas.finish_svg()
}
