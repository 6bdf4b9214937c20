//! Event extraction: Parquet event files to whitespace tables.
//!
//! Each input file holds events of one class at one scale. The class is
//! inferred from the label of the first event; every later event must agree
//! with the first on both label and scale.

use std::path::{Path, PathBuf};

use pnn_core::{ArtifactKind, ArtifactStore, Error, Event, EventClass, JesKey, Result};

use crate::event_parquet;
use crate::table::{NumericTable, write_table};

/// Column order of extracted tables and condition datasets.
pub mod col {
    /// Primary mass.
    pub const MWWBB: usize = 0;
    /// Secondary mass.
    pub const MJJ: usize = 1;
    /// Scale.
    pub const JES: usize = 2;
    /// Label.
    pub const TARGET: usize = 3;
    /// Generator mass.
    pub const MX: usize = 4;
    /// Total.
    pub const N: usize = 5;
}

/// Summary of one extracted file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFile {
    /// Input Parquet file.
    pub source: PathBuf,
    /// Written table.
    pub path: PathBuf,
    /// Class inferred from the first event.
    pub class: EventClass,
    /// Scale of every event in the file.
    pub jes: JesKey,
    /// Generator mass of the first event.
    pub mx: f64,
    /// Rows written.
    pub n_events: usize,
}

/// Class and scale shared by every event of a file.
pub fn classify(path: &Path, events: &[Event]) -> Result<(EventClass, JesKey)> {
    let Some(first) = events.first() else {
        return Err(Error::Validation(format!("{} contains no events", path.display())));
    };
    let class = EventClass::from_target(first.target)
        .ok_or_else(|| Error::UnknownLabel { path: path.to_path_buf(), value: first.target })?;
    let jes = JesKey::from_value(first.jes)?;
    for (i, e) in events.iter().enumerate().skip(1) {
        if e.target != first.target {
            return Err(Error::Validation(format!(
                "{}: event {i} has label {} but the file is {class} (label {})",
                path.display(),
                e.target,
                first.target
            )));
        }
        if JesKey::from_value(e.jes)? != jes {
            return Err(Error::Validation(format!(
                "{}: event {i} has jes {} but the file is jes {jes}",
                path.display(),
                e.jes
            )));
        }
    }
    Ok((class, jes))
}

/// Extract one event file into the store.
pub fn extract_file(store: &mut ArtifactStore, input: &Path, tree: &str) -> Result<ExtractedFile> {
    let events = event_parquet::read_events(input, tree)?;
    let (class, jes) = classify(input, &events)?;
    let mx = events[0].mx;

    let mut table = NumericTable::with_columns(col::N);
    for e in &events {
        table.push_row(&e.to_row())?;
    }
    let path = store.events_path(class, mx, jes)?;
    write_table(&path, &table)?;
    store.record(ArtifactKind::events(class), Some(jes), &path)?;

    tracing::info!(
        source = %input.display(),
        class = %class,
        jes = %jes,
        n_events = events.len(),
        "extracted events"
    );
    Ok(ExtractedFile { source: input.to_path_buf(), path, class, jes, mx, n_events: events.len() })
}

/// Extract every `*.parquet` file of a directory, in file-name order.
pub fn extract_dir(store: &mut ArtifactStore, dir: &Path, tree: &str) -> Result<Vec<ExtractedFile>> {
    if !dir.is_dir() {
        return Err(Error::missing("event directory", dir));
    }
    let mut inputs: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "parquet"))
        .collect();
    inputs.sort();
    if inputs.is_empty() {
        return Err(Error::missing("*.parquet event files", dir));
    }
    tracing::info!(dir = %dir.display(), files = inputs.len(), "processing event extraction");
    inputs.iter().map(|p| extract_file(store, p, tree)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(target: f64, jes: f64) -> Event {
        Event { mwwbb: 500.0, mjj: 80.0, mx: 500.0, jes, target }
    }

    #[test]
    fn test_classify_signal_and_background() {
        let p = Path::new("f.parquet");
        let (c, k) = classify(p, &[ev(1.0, 0.95), ev(1.0, 0.95)]).unwrap();
        assert_eq!(c, EventClass::Signal);
        assert_eq!(k.to_string(), "0.950");
        let (c, _) = classify(p, &[ev(0.0, 1.0)]).unwrap();
        assert_eq!(c, EventClass::Background);
    }

    #[test]
    fn test_unknown_first_label_is_error() {
        let p = Path::new("f.parquet");
        match classify(p, &[ev(0.5, 1.0), ev(1.0, 1.0)]) {
            Err(Error::UnknownLabel { value, .. }) => assert_eq!(value, 0.5),
            other => panic!("expected UnknownLabel, got {other:?}"),
        }
    }

    #[test]
    fn test_mixed_file_rejected() {
        let p = Path::new("f.parquet");
        assert!(matches!(classify(p, &[ev(1.0, 1.0), ev(0.0, 1.0)]), Err(Error::Validation(_))));
        assert!(matches!(classify(p, &[ev(1.0, 1.0), ev(1.0, 1.1)]), Err(Error::Validation(_))));
        assert!(classify(p, &[]).is_err());
    }
}
