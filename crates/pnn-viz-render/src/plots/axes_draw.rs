use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// Box frame with ticks, optional grid, tick labels and axis labels.
pub fn draw_axes(canvas: &mut Canvas, area: &PlotArea, x_axis: &Axis, y_axis: &Axis, config: &VizConfig) {
    let frame_color = Color::rgb(0, 0, 0);
    let tick_line = LineStyle::solid(frame_color, 0.6);
    let minor_line = LineStyle::solid(frame_color, 0.4);
    let grid_line = LineStyle {
        color: config.grid.color.with_alpha(config.grid.alpha),
        width: 0.5,
        dash: Some("3 3".into()),
    };

    // Outward ticks point away from the frame; `dir` flips the sign.
    let dir = if config.axes.tick_direction == "in" { 1.0 } else { -1.0 };
    let tl = config.axes.tick_length;
    let mtl = config.axes.minor_tick_length;
    let inside = |px: f64, lo: f64, hi: f64| px >= lo - 0.5 && px <= hi + 0.5;

    let x_label_style = TextStyle::sized(config.font.tick_size).anchored(TextAnchor::Middle, TextBaseline::Hanging);
    for (i, &val) in x_axis.tick_positions.iter().enumerate() {
        let px = x_axis.data_to_pixel(val, area.left, area.right());
        if !inside(px, area.left, area.right()) {
            continue;
        }
        if config.grid.show {
            canvas.line(px, area.top, px, area.bottom(), &grid_line);
        }
        canvas.line(px, area.bottom(), px, area.bottom() - dir * tl, &tick_line);
        if config.axes.show_top_ticks {
            canvas.line(px, area.top, px, area.top + dir * tl, &tick_line);
        }
        if let Some(label) = x_axis.tick_labels.get(i) {
            let y = area.bottom() + 3.0 + if dir < 0.0 { tl } else { 0.0 };
            canvas.text(px, y, label, &x_label_style);
        }
    }
    for &val in &x_axis.minor_ticks {
        let px = x_axis.data_to_pixel(val, area.left, area.right());
        if inside(px, area.left, area.right()) {
            canvas.line(px, area.bottom(), px, area.bottom() - dir * mtl, &minor_line);
        }
    }

    let y_label_style = TextStyle::sized(config.font.tick_size).anchored(TextAnchor::End, TextBaseline::Central);
    for (i, &val) in y_axis.tick_positions.iter().enumerate() {
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        if !inside(py, area.top, area.bottom()) {
            continue;
        }
        if config.grid.show {
            canvas.line(area.left, py, area.right(), py, &grid_line);
        }
        canvas.line(area.left, py, area.left + dir * tl, py, &tick_line);
        if config.axes.show_right_ticks {
            canvas.line(area.right(), py, area.right() - dir * tl, py, &tick_line);
        }
        if let Some(label) = y_axis.tick_labels.get(i) {
            let x = area.left - 4.0 - if dir < 0.0 { tl } else { 0.0 };
            canvas.text(x, py, label, &y_label_style);
        }
    }
    for &val in &y_axis.minor_ticks {
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        if inside(py, area.top, area.bottom()) {
            canvas.line(area.left, py, area.left + dir * mtl, py, &minor_line);
        }
    }

    draw_frame(canvas, area);

    let label_style = TextStyle::sized(config.font.label_size).anchored(TextAnchor::Middle, TextBaseline::Alphabetic);
    if !x_axis.label.is_empty() {
        let y = area.bottom() + config.font.tick_size + 16.0 + if dir < 0.0 { tl } else { 0.0 };
        canvas.text(area.left + area.width / 2.0, y, &x_axis.label, &label_style);
    }
    if !y_axis.label.is_empty() {
        let x = area.left - PlotArea::y_label_offset(y_axis, config);
        canvas.text_rotated(x, area.top + area.height / 2.0, &y_axis.label, &label_style, -90.0);
    }
}

/// Frame rectangle only.
pub fn draw_frame(canvas: &mut Canvas, area: &PlotArea) {
    let style = LineStyle::solid(Color::rgb(0, 0, 0), 0.8);
    canvas.line(area.left, area.top, area.right(), area.top, &style);
    canvas.line(area.left, area.bottom(), area.right(), area.bottom(), &style);
    canvas.line(area.left, area.top, area.left, area.bottom(), &style);
    canvas.line(area.right(), area.top, area.right(), area.bottom(), &style);
}

/// Pixel mapping for one (x axis, y axis, area) triple.
pub struct Frame<'a> {
    pub area: &'a PlotArea,
    pub x: &'a Axis,
    pub y: &'a Axis,
}

impl Frame<'_> {
    pub fn px(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.x.data_to_pixel(x, self.area.left, self.area.right()),
            self.y.data_to_pixel(y, self.area.bottom(), self.area.top),
        )
    }

    pub fn polyline(&self, xs: &[f64], ys: &[f64]) -> Vec<(f64, f64)> {
        xs.iter().zip(ys).map(|(&x, &y)| self.px(x, y)).collect()
    }
}
