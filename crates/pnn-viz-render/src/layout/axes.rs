/// Linear axis with tick generation and data to pixel mapping.
#[derive(Debug, Clone)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub label: String,
    pub tick_positions: Vec<f64>,
    pub tick_labels: Vec<String>,
    pub minor_ticks: Vec<f64>,
}

impl Axis {
    /// Auto-scale to "nice number" limits that enclose the data.
    pub fn auto_linear(data_min: f64, data_max: f64, target_ticks: usize) -> Self {
        let (lo, hi) = finite_span(data_min, data_max);
        let (nice_min, nice_max, step) = nice_range(lo, hi, target_ticks);
        Self::with_ticks(nice_min, nice_max, step)
    }

    /// Exact limits with nice ticks inside them (ROC unit square, heat-map
    /// windows, colorbars).
    pub fn fixed(min: f64, max: f64, target_ticks: usize) -> Self {
        let (lo, hi) = finite_span(min, max);
        let (_, _, step) = nice_range(lo, hi, target_ticks);
        Self::with_ticks(lo, hi, step)
    }

    fn with_ticks(min: f64, max: f64, step: f64) -> Self {
        let first = (min / step).ceil() * step;
        let mut ticks = Vec::new();
        let mut labels = Vec::new();
        let mut k = 0;
        loop {
            let v = first + k as f64 * step;
            if v > max + step * 1e-6 {
                break;
            }
            ticks.push(v);
            labels.push(format_tick(v, step));
            k += 1;
        }

        // Five minor subdivisions per major step.
        let minor_step = step / 5.0;
        let minor_first = (min / minor_step).ceil() * minor_step;
        let mut minor = Vec::new();
        let mut k = 0;
        loop {
            let v = minor_first + k as f64 * minor_step;
            if v > max + minor_step * 1e-6 {
                break;
            }
            if !ticks.iter().any(|t| (t - v).abs() < minor_step * 0.01) {
                minor.push(v);
            }
            k += 1;
        }

        Self { min, max, label: String::new(), tick_positions: ticks, tick_labels: labels, minor_ticks: minor }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Map a data value to a pixel coordinate.
    pub fn data_to_pixel(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        let frac = (value - self.min) / (self.max - self.min);
        px_min + frac * (px_max - px_min)
    }
}

/// Guard against empty, inverted or non-finite data ranges.
fn finite_span(lo: f64, hi: f64) -> (f64, f64) {
    let (lo, hi) = match (lo.is_finite(), hi.is_finite()) {
        (true, true) => (lo.min(hi), lo.max(hi)),
        (true, false) => (lo, lo),
        (false, true) => (hi, hi),
        (false, false) => (0.0, 1.0),
    };
    if (hi - lo).abs() < 1e-15 { (lo - 0.5, hi + 0.5) } else { (lo, hi) }
}

/// "Nice numbers" algorithm for pleasant tick spacing.
fn nice_range(data_min: f64, data_max: f64, target_ticks: usize) -> (f64, f64, f64) {
    let rough_step = (data_max - data_min) / (target_ticks.max(2) - 1) as f64;
    let step = nice_step(rough_step);
    ((data_min / step).floor() * step, (data_max / step).ceil() * step, step)
}

fn nice_step(rough: f64) -> f64 {
    let exp = rough.abs().log10().floor();
    let frac = rough / 10.0_f64.powf(exp);
    let nice_frac = if frac <= 1.5 {
        1.0
    } else if frac <= 3.5 {
        2.0
    } else if frac <= 7.5 {
        5.0
    } else {
        10.0
    };
    nice_frac * 10.0_f64.powf(exp)
}

fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 { 0 } else { (-step.log10().floor()) as usize };
    // Avoid "-0".
    let v = if value.abs() < step * 0.01 { 0.0 } else { value };
    format!("{v:.decimals$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_linear_encloses_data() {
        let ax = Axis::auto_linear(0.013, 9.7, 6);
        assert!(ax.min <= 0.013 && ax.max >= 9.7);
        assert_eq!(ax.tick_labels.first().map(String::as_str), Some("0"));
    }

    #[test]
    fn fixed_keeps_limits() {
        let ax = Axis::fixed(0.0, 1.0, 6);
        assert_eq!((ax.min, ax.max), (0.0, 1.0));
        assert_eq!(ax.tick_labels, vec!["0.0", "0.2", "0.4", "0.6", "0.8", "1.0"]);
        let ax = Axis::fixed(0.0, 3000.0, 6);
        assert_eq!(ax.tick_labels.last().map(String::as_str), Some("3000"));
    }

    #[test]
    fn degenerate_ranges() {
        let ax = Axis::auto_linear(2.0, 2.0, 5);
        assert!(ax.max > ax.min);
        let ax = Axis::fixed(f64::NAN, f64::INFINITY, 5);
        assert_eq!((ax.min, ax.max), (0.0, 1.0));
    }

    #[test]
    fn data_to_pixel_linear() {
        let ax = Axis::fixed(0.0, 100.0, 5);
        assert!((ax.data_to_pixel(50.0, 0.0, 500.0) - 250.0).abs() < 1e-9);
        // Inverted pixel range for y axes.
        assert!((ax.data_to_pixel(25.0, 400.0, 0.0) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn nice_step_values() {
        assert!((nice_step(3.2) - 2.0).abs() < 1e-9);
        assert!((nice_step(0.7) - 0.5).abs() < 1e-9);
        assert!((nice_step(15.0) - 10.0).abs() < 1e-9);
        assert!((nice_step(4.5) - 5.0).abs() < 1e-9);
    }
}
