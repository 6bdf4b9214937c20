/// Equal-width panels side by side, each `[left, top, width, height]` in
/// canvas points. Used for the fixed / parameterized / difference row.
#[derive(Debug, Clone)]
pub struct RowLayout {
    pub panels: Vec<[f64; 4]>,
}

impl RowLayout {
    pub fn new(n: usize, panel_width: f64, height: f64, gap: f64) -> Self {
        let panels = (0..n).map(|i| [i as f64 * (panel_width + gap), 0.0, panel_width, height]).collect();
        Self { panels }
    }

    pub fn total_width(&self) -> f64 {
        self.panels.last().map(|p| p[0] + p[2]).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_widths() {
        let row = RowLayout::new(3, 100.0, 80.0, 10.0);
        assert_eq!(row.panels.len(), 3);
        assert_eq!(row.panels[2][0], 220.0);
        assert_eq!(row.total_width(), 320.0);
    }
}
