use crate::primitives::{FontWeight, TextStyle};

/// Font stack written into every `<text>` element.
pub const FONT_FAMILY: &str = "DejaVu Sans, Helvetica, Arial, sans-serif";

#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
}

/// Advance width of one character in ems, for a generic sans-serif face.
fn advance_em(ch: char) -> f64 {
    match ch {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.28,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | ' ' | '-' | '/' => 0.36,
        'm' | 'w' | 'M' | 'W' => 0.86,
        '0'..='9' => 0.56,
        'A'..='Z' => 0.68,
        c if c.is_ascii() => 0.54,
        // Greek letters, arrows, superscripts.
        _ => 0.62,
    }
}

/// Approximate text extent in points. Layout only needs margins that are
/// large enough; the renderer places glyphs itself.
pub fn measure_text(text: &str, style: &TextStyle) -> TextMetrics {
    let bold = if style.weight == FontWeight::Bold { 1.07 } else { 1.0 };
    let width = text.chars().map(advance_em).sum::<f64>() * style.size * bold;
    TextMetrics { width, height: style.size * 1.2, ascent: style.size * 0.93 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_scales_with_size() {
        let small = measure_text("Hello", &TextStyle::sized(10.0));
        let big = measure_text("Hello", &TextStyle::sized(20.0));
        assert!(small.width > 15.0 && small.width < 40.0);
        assert!((big.width - 2.0 * small.width).abs() < 1e-9);
        assert!(small.ascent > 0.0 && small.height > small.ascent);
    }

    #[test]
    fn bold_wider_than_regular() {
        let r = measure_text("Test", &TextStyle::sized(12.0));
        let b = measure_text("Test", &TextStyle::sized(12.0).bold());
        assert!(b.width > r.width);
    }
}
