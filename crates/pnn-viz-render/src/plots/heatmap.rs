use pnn_viz::{GridComparison, HeatmapArtifact, Surface, SurfaceKind};

use crate::RenderError;
use crate::canvas::Canvas;
use crate::color::Colormap;
use crate::config::VizConfig;
use crate::header::draw_header;
use crate::layout::axes::Axis;
use crate::layout::margins::PlotArea;
use crate::layout::multi_panel::RowLayout;
use crate::plots::axes_draw::{Frame, draw_axes, draw_frame};
use crate::primitives::*;

/// One heat map with colorbar.
pub fn render(artifact: &HeatmapArtifact, config: &VizConfig) -> crate::Result<String> {
    if artifact.surface.z.is_empty() {
        return Ok(super::empty_svg("No surface"));
    }
    let mut canvas = Canvas::new(config.figure.width, config.figure.height)?;
    draw_panel(&mut canvas, [0.0, 0.0, config.figure.width, config.figure.height], artifact, config)?;
    canvas.finish_svg()
}

/// Fixed, parameterized and difference maps in one row.
pub fn render_comparison(cmp: &GridComparison, config: &VizConfig) -> crate::Result<String> {
    let panel_w = config.figure.width;
    let row = RowLayout::new(3, panel_w, config.figure.height, 0.0);
    let mut canvas = Canvas::new(row.total_width(), config.figure.height)?;
    for (panel, art) in row.panels.iter().zip([&cmp.fixed, &cmp.parameterized, &cmp.difference]) {
        draw_panel(&mut canvas, *panel, art, config)?;
    }
    canvas.finish_svg()
}

fn colormap(kind: SurfaceKind, config: &VizConfig) -> Colormap {
    match kind {
        SurfaceKind::Output => config.colormaps.output,
        SurfaceKind::Difference => config.colormaps.difference,
    }
}

/// Cell boundaries around each grid coordinate: midpoints between
/// neighbours, the outer coordinates at the ends.
fn cell_bounds(v: &[f64]) -> Vec<(f64, f64)> {
    let n = v.len();
    (0..n)
        .map(|i| {
            let lo = if i == 0 { v[0] } else { 0.5 * (v[i - 1] + v[i]) };
            let hi = if i + 1 == n { v[n - 1] } else { 0.5 * (v[i] + v[i + 1]) };
            (lo, hi)
        })
        .collect()
}

fn check_surface(s: &Surface) -> crate::Result<()> {
    if s.x.len() < 2 || s.y.len() < 2 || s.z.len() != s.x.len() * s.y.len() {
        return Err(RenderError::Layout(format!(
            "surface has {} values for a {}x{} grid",
            s.z.len(),
            s.x.len(),
            s.y.len()
        )));
    }
    Ok(())
}

fn draw_panel(canvas: &mut Canvas, panel: [f64; 4], art: &HeatmapArtifact, config: &VizConfig) -> crate::Result<()> {
    let s = &art.surface;
    check_surface(s)?;
    let cmap = colormap(art.kind, config);
    let [z_lo, z_hi] = art.z_range;

    let x_axis = Axis::fixed(s.x[0], s.x[s.x.len() - 1], 6).with_label(&art.x_label);
    let y_axis = Axis::fixed(s.y[0], s.y[s.y.len() - 1], 6).with_label(&art.y_label);
    let cb_gap = 10.0;
    let cb_w = config.heatmap.colorbar_width;
    let extra_right = cb_gap + cb_w + 4.0 * config.font.tick_size + config.font.label_size + 8.0;
    let area = PlotArea::within(panel, &y_axis, &x_axis, &art.title, extra_right, config);
    draw_header(canvas, &area, &art.title, config);
    let frame = Frame { area: &area, x: &x_axis, y: &y_axis };

    // Cells; y grows upward, so the top edge comes from the high bound.
    let xb = cell_bounds(&s.x);
    let yb = cell_bounds(&s.y);
    for (iy, &(y0, y1)) in yb.iter().enumerate() {
        for (ix, &(x0, x1)) in xb.iter().enumerate() {
            let (px0, py1) = frame.px(x0, y1);
            let (px1, py0) = frame.px(x1, y0);
            // Slight overlap hides hairline seams between cells.
            let fill = cmap.map(s.at(ix, iy), z_lo, z_hi);
            canvas.rect(px0, py1, px1 - px0 + 0.3, py0 - py1 + 0.3, &Style::filled(fill));
        }
    }

    if !art.scatter.is_empty() {
        canvas.push_clip(area.left, area.top, area.width, area.height);
        for &[x, y, z] in &art.scatter {
            let (px, py) = frame.px(x, y);
            let style = Style::filled(cmap.map(z, z_lo, z_hi)).with_stroke(config.heatmap.scatter_outline, 0.3);
            canvas.circle(px, py, config.heatmap.scatter_radius, &style);
        }
        canvas.pop_clip();
    }

    // Grid lines would hide the surface.
    let no_grid = VizConfig { grid: crate::config::GridConfig { show: false, ..config.grid.clone() }, ..config.clone() };
    draw_axes(canvas, &area, &x_axis, &y_axis, &no_grid);

    draw_colorbar(canvas, &area, cb_gap, cmap, art, config);
    Ok(())
}

fn draw_colorbar(canvas: &mut Canvas, area: &PlotArea, gap: f64, cmap: Colormap, art: &HeatmapArtifact, config: &VizConfig) {
    let [z_lo, z_hi] = art.z_range;
    let bar = PlotArea::manual(area.right() + gap, area.top, config.heatmap.colorbar_width, area.height);
    let steps = config.heatmap.colorbar_steps.max(2);
    let h = bar.height / steps as f64;
    for i in 0..steps {
        // Top of the bar is z_hi.
        let t = 1.0 - (i as f64 + 0.5) / steps as f64;
        canvas.rect(bar.left, bar.top + i as f64 * h, bar.width, h + 0.3, &Style::filled(cmap.at(t)));
    }
    draw_frame(canvas, &bar);

    let z_axis = Axis::fixed(z_lo, z_hi, 5);
    let tick_style = TextStyle::sized(config.font.tick_size).anchored(TextAnchor::Start, TextBaseline::Central);
    let tick_line = LineStyle::solid(crate::color::Color::rgb(0, 0, 0), 0.6);
    let mut widest: f64 = 0.0;
    for (v, label) in z_axis.tick_positions.iter().zip(&z_axis.tick_labels) {
        let py = z_axis.data_to_pixel(*v, bar.bottom(), bar.top);
        canvas.line(bar.right(), py, bar.right() + 3.0, py, &tick_line);
        canvas.text(bar.right() + 5.0, py, label, &tick_style);
        widest = widest.max(canvas.measure_text(label, &tick_style).width);
    }
    if !art.z_label.is_empty() {
        let style = TextStyle::sized(config.font.label_size).anchored(TextAnchor::Middle, TextBaseline::Central);
        let x = bar.right() + 5.0 + widest + 4.0 + config.font.label_size * 0.5;
        canvas.text_rotated(x, bar.top + bar.height / 2.0, &art.z_label, &style, -90.0);
    }
}
