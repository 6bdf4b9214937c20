//! Common data types for paramnn

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A jet-energy-scale value keyed as integer thousandths.
///
/// `0.975` becomes `975`, so equality and ordering never depend on float
/// formatting. Displays as `%.3f`, which is also the form used in file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub struct JesKey(u32);

impl JesKey {
    /// Key a scale value. Rejects non-finite and non-positive values.
    pub fn from_value(value: f64) -> Result<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(Error::Validation(format!("invalid JES value: {value}")));
        }
        let millis = (value * 1000.0).round();
        if millis < 1.0 || millis > u32::MAX as f64 {
            return Err(Error::Validation(format!("JES value out of range: {value}")));
        }
        Ok(Self(millis as u32))
    }

    /// Key a list of scale values, rejecting duplicates after rounding.
    pub fn from_values(values: &[f64]) -> Result<Vec<Self>> {
        let mut out = Vec::with_capacity(values.len());
        for &v in values {
            let key = Self::from_value(v)?;
            if out.contains(&key) {
                return Err(Error::Validation(format!("duplicate JES value: {key}")));
            }
            out.push(key);
        }
        Ok(out)
    }

    /// Key from thousandths directly.
    pub const fn from_millis(millis: u32) -> Self {
        Self(millis)
    }

    /// Integer thousandths.
    pub const fn millis(self) -> u32 {
        self.0
    }

    /// The scale value as a float.
    pub fn value(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl fmt::Display for JesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.0 / 1000, self.0 % 1000)
    }
}

impl From<JesKey> for f64 {
    fn from(key: JesKey) -> Self {
        key.value()
    }
}

impl TryFrom<f64> for JesKey {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::from_value(value)
    }
}

/// Signal or background, as encoded by the event `target` leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventClass {
    /// `target == 1`
    Signal,
    /// `target == 0`
    Background,
}

impl EventClass {
    /// Map a label value to a class. Only exactly `0` and `1` are valid.
    pub fn from_target(target: f64) -> Option<Self> {
        if target == 1.0 {
            Some(Self::Signal)
        } else if target == 0.0 {
            Some(Self::Background)
        } else {
            None
        }
    }

    /// Label value of this class.
    pub fn target(self) -> f64 {
        match self {
            Self::Signal => 1.0,
            Self::Background => 0.0,
        }
    }

    /// File name prefix (`sig` / `bkg`).
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Signal => "sig",
            Self::Background => "bkg",
        }
    }
}

impl fmt::Display for EventClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Signal => "signal",
            Self::Background => "background",
        })
    }
}

/// One simulated collision event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Primary reconstructed mass (WWbb system).
    pub mwwbb: f64,
    /// Secondary reconstructed mass (dijet system).
    pub mjj: f64,
    /// Generator-level resonance mass parameter.
    pub mx: f64,
    /// Systematic scale factor the event was generated with.
    pub jes: f64,
    /// Label: 1 signal, 0 background.
    pub target: f64,
}

impl Event {
    /// Row in extracted-table layout: `mwwbb mjj jes target mx`.
    pub fn to_row(&self) -> [f64; 5] {
        [self.mwwbb, self.mjj, self.jes, self.target, self.mx]
    }
}

/// One model evaluation of one event.
///
/// `jes_eval` differs from `jes_gen` only when a parameterized model is probed
/// at a scale other than the one the event was generated with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Event label.
    pub label: f64,
    /// Primary mass.
    pub mwwbb: f64,
    /// Secondary mass.
    pub mjj: f64,
    /// Model output.
    pub nn: f64,
    /// Scale the event was generated with.
    pub jes_gen: f64,
    /// Scale the model was evaluated at.
    pub jes_eval: f64,
}

impl EvaluationRecord {
    /// Column names in table order.
    pub const COLUMNS: [&'static str; 6] = ["label", "mwwbb", "mjj", "nn", "jes_true", "jes_param"];

    /// Row in table order.
    pub fn to_row(&self) -> [f64; 6] {
        [self.label, self.mwwbb, self.mjj, self.nn, self.jes_gen, self.jes_eval]
    }

    /// Inverse of [`EvaluationRecord::to_row`].
    pub fn from_row(row: &[f64]) -> Result<Self> {
        if row.len() != Self::COLUMNS.len() {
            return Err(Error::ShapeMismatch(format!(
                "evaluation record needs {} columns, got {}",
                Self::COLUMNS.len(),
                row.len()
            )));
        }
        Ok(Self {
            label: row[0],
            mwwbb: row[1],
            mjj: row[2],
            nn: row[3],
            jes_gen: row[4],
            jes_eval: row[5],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jes_key_rounding_and_display() {
        let k = JesKey::from_value(0.975).unwrap();
        assert_eq!(k.millis(), 975);
        assert_eq!(k.to_string(), "0.975");
        approx::assert_relative_eq!(k.value(), 0.975);
        assert_eq!(JesKey::from_value(1.0).unwrap().to_string(), "1.000");
        assert_eq!(JesKey::from_value(1.25).unwrap().to_string(), "1.250");
        // Float noise collapses to the same key.
        assert_eq!(JesKey::from_value(0.1 + 0.2 + 0.675).unwrap(), k);
    }

    #[test]
    fn test_jes_key_rejects_bad_values() {
        assert!(JesKey::from_value(0.0).is_err());
        assert!(JesKey::from_value(-1.0).is_err());
        assert!(JesKey::from_value(f64::NAN).is_err());
        assert!(JesKey::from_values(&[1.0, 1.0004]).is_err());
    }

    #[test]
    fn test_jes_key_serde_as_float() {
        let k = JesKey::from_millis(1025);
        let s = serde_json::to_string(&k).unwrap();
        assert_eq!(s, "1.025");
        let back: JesKey = serde_json::from_str(&s).unwrap();
        assert_eq!(back, k);
        assert!(serde_json::from_str::<JesKey>("-2.0").is_err());
    }

    #[test]
    fn test_event_class_from_target() {
        assert_eq!(EventClass::from_target(1.0), Some(EventClass::Signal));
        assert_eq!(EventClass::from_target(0.0), Some(EventClass::Background));
        assert_eq!(EventClass::from_target(0.5), None);
        assert_eq!(EventClass::from_target(2.0), None);
        assert_eq!(EventClass::Signal.prefix(), "sig");
    }

    #[test]
    fn test_evaluation_record_row() {
        let r = EvaluationRecord {
            label: 1.0,
            mwwbb: 500.0,
            mjj: 80.0,
            nn: 0.9,
            jes_gen: 0.95,
            jes_eval: 1.0,
        };
        assert_eq!(EvaluationRecord::from_row(&r.to_row()).unwrap(), r);
        assert!(EvaluationRecord::from_row(&[1.0, 2.0]).is_err());
    }
}
