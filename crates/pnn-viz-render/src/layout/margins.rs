use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::header::header_height;
use crate::layout::axes::Axis;
use crate::primitives::TextStyle;
use crate::text::measure_text;

/// Rectangular plot area within the canvas.
#[derive(Debug, Clone, Copy)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

fn max_tick_width(axis: &Axis, config: &VizConfig) -> f64 {
    let style = TextStyle::sized(config.font.tick_size);
    axis.tick_labels.iter().map(|l| measure_text(l, &style).width).fold(0.0_f64, f64::max)
}

impl PlotArea {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Area at an explicit position, e.g. a colorbar beside the plot.
    pub fn manual(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Margins over the whole canvas.
    pub fn auto(
        canvas: &Canvas,
        y_axis: &Axis,
        x_axis: &Axis,
        title: &str,
        extra_right: f64,
        config: &VizConfig,
    ) -> Self {
        Self::within([0.0, 0.0, canvas.width, canvas.height], y_axis, x_axis, title, extra_right, config)
    }

    /// Margins from tick labels, axis labels and the header inside
    /// `frame = [left, top, width, height]`. `extra_right` reserves room for
    /// a colorbar.
    pub fn within(
        frame: [f64; 4],
        y_axis: &Axis,
        x_axis: &Axis,
        title: &str,
        extra_right: f64,
        config: &VizConfig,
    ) -> Self {
        let mut left = 12.0 + max_tick_width(y_axis, config) + 8.0;
        if !y_axis.label.is_empty() {
            left += config.font.label_size + 8.0;
        }

        let mut bottom = 12.0 + config.font.tick_size + 6.0;
        if !x_axis.label.is_empty() {
            bottom += config.font.label_size + 6.0;
        }

        let top = header_height(title, config);
        let right = 15.0 + extra_right;

        let [fx, fy, fw, fh] = frame;
        Self {
            left: fx + left,
            top: fy + top,
            width: (fw - left - right).max(50.0),
            height: (fh - top - bottom).max(50.0),
        }
    }

    /// Horizontal distance from the frame to the rotated y-axis label.
    pub fn y_label_offset(y_axis: &Axis, config: &VizConfig) -> f64 {
        max_tick_width(y_axis, config) + 12.0 + config.font.label_size * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margins_fit_in_frame() {
        let cfg = VizConfig::default();
        let x = Axis::fixed(0.0, 3000.0, 6).with_label("m_WWbb [GeV]");
        let y = Axis::fixed(0.0, 500.0, 6).with_label("m_jj [GeV]");
        let a = PlotArea::within([100.0, 0.0, 400.0, 300.0], &y, &x, "t", 40.0, &cfg);
        assert!(a.left > 100.0);
        assert!(a.right() <= 500.0 - 40.0);
        assert!(a.bottom() < 300.0);
    }

    #[test]
    fn manual_area_keeps_its_box() {
        let a = PlotArea::manual(410.0, 20.0, 18.0, 250.0);
        assert_eq!((a.left, a.top), (410.0, 20.0));
        assert_eq!(a.right(), 428.0);
        assert_eq!(a.bottom(), 270.0);
    }
}
