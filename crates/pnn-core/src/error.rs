//! Error types for paramnn

use std::path::PathBuf;

use thiserror::Error;

/// paramnn error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An input file, leaf or artifact does not exist.
    #[error("missing input ({what}): {}", path.display())]
    MissingInput {
        /// What was being looked up (a file kind, a leaf name, ...).
        what: String,
        /// Where it was expected.
        path: PathBuf,
    },

    /// Unparsable or ragged numeric table row.
    #[error("malformed row in {} at line {line}: {reason}", path.display())]
    MalformedRow {
        /// Table path.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Parser message.
        reason: String,
    },

    /// First event label of a file is neither 0 nor 1.
    #[error("unknown event label {value} in {}: expected 0 (background) or 1 (signal)", path.display())]
    UnknownLabel {
        /// Event file path.
        path: PathBuf,
        /// Offending label value.
        value: f64,
    },

    /// Persisted model is unreadable or incompatible.
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// Dimension disagreement (features, grids, rows).
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// CSV / Parquet / Arrow encode or decode failure.
    #[error("Format error: {0}")]
    Format(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

impl Error {
    /// Shorthand for [`Error::MissingInput`].
    pub fn missing(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Error::MissingInput { what: what.into(), path: path.into() }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_path() {
        let e = Error::missing("leaf 'mjj'", "/data/sig.parquet");
        assert_eq!(e.to_string(), "missing input (leaf 'mjj'): /data/sig.parquet");

        let e = Error::MalformedRow {
            path: PathBuf::from("t.dat"),
            line: 7,
            reason: "expected 5 columns, got 4".into(),
        };
        assert!(e.to_string().contains("t.dat at line 7"));

        let e = Error::UnknownLabel { path: PathBuf::from("x.parquet"), value: 0.5 };
        assert!(e.to_string().contains("0.5"));
    }
}
