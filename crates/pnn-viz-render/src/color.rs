use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` (leading `#` optional). `None` on anything else.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Like [`Color::parse_hex`] but black on malformed input; for constants.
    pub fn hex(s: &str) -> Self {
        Self::parse_hex(s).unwrap_or_default()
    }

    /// From unit-interval channels.
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        let q = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgb(q(r), q(g), q(b))
    }

    pub const fn with_alpha(mut self, a: f64) -> Self {
        self.a = a;
        self
    }

    pub fn to_svg_fill(&self) -> String {
        if (self.a - 1.0).abs() < 1e-6 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a)
        }
    }

    /// Linear interpolation between two colors.
    pub fn lerp(a: Color, b: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: u8, y: u8| (x as f64 * (1.0 - t) + y as f64 * t).round() as u8;
        Color { r: mix(a.r, b.r), g: mix(a.g, b.g), b: mix(a.b, b.b), a: a.a * (1.0 - t) + b.a * t }
    }

    /// Relative luminance in [0, 1], used to pick readable text on fills.
    pub fn luminance(&self) -> f64 {
        (0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64) / 255.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_svg_fill())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Color::parse_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color '{s}'")))
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(0, 0, 0)
    }
}

// --- Palettes ---

/// matplotlib's classic single-letter cycle, as in the analysis plots.
pub const CLASSIC: &[&str] =
    &["#0000ff", "#008000", "#ff0000", "#00bfbf", "#bf00bf", "#bfbf00", "#000000", "#a52a2a", "#ffa500"];

pub const TABLEAU10: &[&str] = &[
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

pub const WONG: &[&str] =
    &["#0072b2", "#d55e00", "#56b4e9", "#e69f00", "#f0e442", "#009e73", "#cc79a7"];

pub fn palette_colors(name: &str) -> Vec<Color> {
    let strs = match name {
        "tableau10" => TABLEAU10,
        "wong" => WONG,
        _ => CLASSIC,
    };
    strs.iter().map(|s| Color::hex(s)).collect()
}

// --- Colormaps ---

/// Viridis control points from dark purple to yellow, interpolated linearly.
const VIRIDIS: [[f64; 3]; 17] = [
    [0.267004, 0.004874, 0.329415],
    [0.282327, 0.094955, 0.417331],
    [0.277018, 0.185228, 0.489898],
    [0.253935, 0.265254, 0.529983],
    [0.221989, 0.339161, 0.548752],
    [0.190631, 0.407061, 0.556089],
    [0.163625, 0.471133, 0.558148],
    [0.139147, 0.533812, 0.555298],
    [0.120565, 0.596422, 0.543611],
    [0.134692, 0.658636, 0.517649],
    [0.208030, 0.718701, 0.472873],
    [0.327796, 0.773980, 0.406640],
    [0.477504, 0.821444, 0.318195],
    [0.647257, 0.858400, 0.209861],
    [0.824940, 0.884720, 0.106217],
    [0.974417, 0.903590, 0.130215],
    [0.993248, 0.906157, 0.143936],
];

/// Continuous colormap selected by name in the render configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Colormap {
    /// Sequential, for outputs in [0, 1].
    Viridis,
    /// Viridis ends through white at the centre, for signed differences.
    ViridisDiverging,
    /// Blue, white, red.
    RdBu,
    /// Black to white.
    Greys,
}

impl Colormap {
    /// Color at `t` in [0, 1] (clamped; NaN maps to the low end).
    pub fn at(self, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Viridis => table_lookup(&VIRIDIS, t),
            Self::ViridisDiverging => {
                let lo = table_lookup(&VIRIDIS, 0.0);
                let hi = table_lookup(&VIRIDIS, 1.0);
                let white = Color::rgb(255, 255, 255);
                if t < 0.5 { Color::lerp(lo, white, 2.0 * t) } else { Color::lerp(white, hi, 2.0 * t - 1.0) }
            }
            Self::RdBu => {
                let white = Color::rgb(255, 255, 255);
                if t < 0.5 {
                    Color::lerp(Color::hex("#2166ac"), white, 2.0 * t)
                } else {
                    Color::lerp(white, Color::hex("#b2182b"), 2.0 * t - 1.0)
                }
            }
            Self::Greys => Color::lerp(Color::rgb(0, 0, 0), Color::rgb(255, 255, 255), t),
        }
    }

    /// Color of `value` on the scale `[lo, hi]`.
    pub fn map(self, value: f64, lo: f64, hi: f64) -> Color {
        let span = hi - lo;
        let t = if span.abs() < f64::EPSILON { 0.5 } else { (value - lo) / span };
        self.at(t)
    }
}

fn table_lookup(table: &[[f64; 3]], t: f64) -> Color {
    let pos = t * (table.len() - 1) as f64;
    let i = (pos.floor() as usize).min(table.len() - 2);
    let f = pos - i as f64;
    let [r0, g0, b0] = table[i];
    let [r1, g1, b1] = table[i + 1];
    Color::from_unit(r0 + (r1 - r0) * f, g0 + (g1 - g0) * f, b0 + (b1 - b0) * f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        let c = Color::hex("#1D4ED8");
        assert_eq!((c.r, c.g, c.b), (0x1D, 0x4E, 0xD8));
        assert!(Color::parse_hex("#12345").is_none());
        assert!(Color::parse_hex("zz0000").is_none());
    }

    #[test]
    fn svg_fill_alpha() {
        assert_eq!(Color::rgb(29, 78, 216).to_svg_fill(), "#1d4ed8");
        assert_eq!(Color::rgb(29, 78, 216).with_alpha(0.5).to_svg_fill(), "rgba(29,78,216,0.500)");
    }

    #[test]
    fn viridis_endpoints() {
        let lo = Colormap::Viridis.at(0.0);
        let hi = Colormap::Viridis.at(1.0);
        assert_eq!((lo.r, lo.g, lo.b), (68, 1, 84));
        assert_eq!((hi.r, hi.g, hi.b), (253, 231, 37));
        assert!(Colormap::Viridis.at(0.9).luminance() > Colormap::Viridis.at(0.1).luminance());
    }

    #[test]
    fn viridis_table_brightens_monotonically() {
        let lum: Vec<f64> = (0..=16).map(|i| Colormap::Viridis.at(i as f64 / 16.0).luminance()).collect();
        for pair in lum.windows(2) {
            assert!(pair[1] >= pair[0], "viridis luminance must not decrease: {pair:?}");
        }
        assert_eq!(VIRIDIS.len(), 17);
    }

    #[test]
    fn diverging_centre_is_white() {
        for cmap in [Colormap::ViridisDiverging, Colormap::RdBu] {
            let c = cmap.map(0.0, -1.0, 1.0);
            assert_eq!((c.r, c.g, c.b), (255, 255, 255));
        }
    }

    #[test]
    fn palette_lookup() {
        assert_eq!(palette_colors("classic").len(), 9);
        assert_eq!(palette_colors("wong").len(), 7);
        assert_eq!(palette_colors("unknown").len(), 9);
    }
}
