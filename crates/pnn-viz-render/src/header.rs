use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// Vertical space the header needs above the frame.
pub fn header_height(title: &str, config: &VizConfig) -> f64 {
    if title.is_empty() && config.header.label.is_empty() {
        12.0
    } else {
        config.font.label_size * 1.3 + 14.0
    }
}

/// Draw the optional **label** *status* on the left and the plot title
/// centred above the frame.
pub fn draw_header(canvas: &mut Canvas, area: &PlotArea, title: &str, config: &VizConfig) {
    let y = area.top - 6.0;

    if !config.header.label.is_empty() {
        let bold = TextStyle::sized(config.font.label_size * 1.2).bold();
        canvas.text(area.left, y, &config.header.label, &bold);
        let name_w = canvas.measure_text(&config.header.label, &bold).width;
        if !config.header.status.is_empty() {
            let status = TextStyle { color: Color::rgb(80, 80, 80), ..TextStyle::sized(config.font.label_size) };
            canvas.text(area.left + name_w + 5.0, y, &config.header.status, &status);
        }
    }

    if !title.is_empty() {
        let style = TextStyle::sized(config.font.label_size * 1.1)
            .anchored(TextAnchor::Middle, TextBaseline::Alphabetic);
        let x = if config.header.label.is_empty() { area.left + area.width / 2.0 } else { area.right() };
        let style = if config.header.label.is_empty() {
            style
        } else {
            TextStyle { anchor: TextAnchor::End, ..style }
        };
        canvas.text(x, y, title, &style);
    }
}
