use pnn_viz::RocArtifact;

use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::header::draw_header;
use crate::layout::axes::Axis;
use crate::layout::legend::{self, LegendEntry, LegendKind, LegendPosition};
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::{Frame, draw_axes};
use crate::primitives::*;

/// ROC curves on the unit square, AUC in the legend, chance diagonal dashed.
pub fn render(artifact: &RocArtifact, config: &VizConfig) -> crate::Result<String> {
    if artifact.curves.is_empty() {
        return Ok(super::empty_svg("No ROC curves"));
    }

    let mut canvas = Canvas::new(config.figure.width, config.figure.height)?;
    let x_axis = Axis::fixed(0.0, 1.0, 6).with_label("Background efficiency");
    let y_axis = Axis::fixed(0.0, 1.0, 6).with_label("Signal efficiency");
    let area = PlotArea::auto(&canvas, &y_axis, &x_axis, &artifact.title, 0.0, config);
    draw_header(&mut canvas, &area, &artifact.title, config);
    draw_axes(&mut canvas, &area, &x_axis, &y_axis, config);
    let frame = Frame { area: &area, x: &x_axis, y: &y_axis };

    canvas.push_clip(area.left, area.top, area.width, area.height);
    if config.roc.show_diagonal {
        let (x0, y0) = frame.px(0.0, 0.0);
        let (x1, y1) = frame.px(1.0, 1.0);
        canvas.line(x0, y0, x1, y1, &LineStyle::dashed(config.roc.diagonal_color, 1.0));
    }
    let mut entries = Vec::with_capacity(artifact.curves.len());
    for (i, curve) in artifact.curves.iter().enumerate() {
        let color = config.series_color(i);
        canvas.polyline(&frame.polyline(&curve.fpr, &curve.tpr), &LineStyle::solid(color, config.roc.line_width));
        entries.push(LegendEntry {
            label: format!("{} (AUC = {:.3})", curve.label, curve.auc),
            color,
            kind: LegendKind::Line(None),
        });
    }
    canvas.pop_clip();

    legend::draw_legend(&mut canvas, &area, &entries, config.font.size, LegendPosition::LowerRight);
    canvas.finish_svg()
}
