//! Comma-separated analysis tables and their columnar (Parquet) export.
//!
//! Analysis tables hold [`EvaluationRecord`] rows under the header
//! `label,mwwbb,mjj,nn,jes_true,jes_param`.

use std::collections::HashMap;
use std::path::Path;

use pnn_core::{Error, EvaluationRecord, Result};

use crate::event_parquet::{META_KEY_SCHEMA_VERSION, write_columns_parquet};

/// Schema version of exported analysis tables.
pub const ANALYSIS_SCHEMA_V1: &str = "paramnn_analysis_v1";

/// Parquet metadata key for the export title.
pub const META_KEY_TITLE: &str = "pnn.title";

fn csv_err(path: &Path, e: csv::Error) -> Error {
    let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
    match e.into_kind() {
        csv::ErrorKind::Io(io) => Error::Io(io),
        other => Error::MalformedRow {
            path: path.to_path_buf(),
            line,
            reason: format!("{other:?}"),
        },
    }
}

/// Streaming writer of an analysis table.
pub struct RecordWriter {
    path: std::path::PathBuf,
    inner: csv::Writer<std::fs::File>,
    rows: usize,
}

impl RecordWriter {
    /// Create the file (and parent directories) and write the header.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut inner = csv::Writer::from_path(path).map_err(|e| csv_err(path, e))?;
        inner.write_record(EvaluationRecord::COLUMNS).map_err(|e| csv_err(path, e))?;
        Ok(Self { path: path.to_path_buf(), inner, rows: 0 })
    }

    /// Append one record.
    pub fn write(&mut self, r: &EvaluationRecord) -> Result<()> {
        let row = r.to_row().map(|v| format!("{v:.6}"));
        self.inner.write_record(&row).map_err(|e| csv_err(&self.path, e))?;
        self.rows += 1;
        Ok(())
    }

    /// Flush and return the number of records written.
    pub fn finish(mut self) -> Result<usize> {
        self.inner.flush()?;
        tracing::debug!(path = %self.path.display(), rows = self.rows, "wrote analysis table");
        Ok(self.rows)
    }
}

/// Read an analysis table.
pub fn read_records_csv(path: &Path) -> Result<Vec<EvaluationRecord>> {
    if !path.is_file() {
        return Err(Error::missing("analysis table", path));
    }
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| csv_err(path, e))?;
    let headers = rdr.headers().map_err(|e| csv_err(path, e))?.clone();
    if headers.iter().ne(EvaluationRecord::COLUMNS) {
        return Err(Error::MalformedRow {
            path: path.to_path_buf(),
            line: 1,
            reason: format!(
                "header {:?} does not match {:?}",
                headers.iter().collect::<Vec<_>>(),
                EvaluationRecord::COLUMNS
            ),
        });
    }
    let mut out = Vec::new();
    let mut row = Vec::with_capacity(EvaluationRecord::COLUMNS.len());
    for rec in rdr.records() {
        let rec = rec.map_err(|e| csv_err(path, e))?;
        let line = rec.position().map(|p| p.line() as usize).unwrap_or(0);
        row.clear();
        for field in rec.iter() {
            let v: f64 = field.trim().parse().map_err(|e| Error::MalformedRow {
                path: path.to_path_buf(),
                line,
                reason: format!("invalid number '{field}': {e}"),
            })?;
            row.push(v);
        }
        out.push(EvaluationRecord::from_row(&row).map_err(|e| Error::MalformedRow {
            path: path.to_path_buf(),
            line,
            reason: e.to_string(),
        })?);
    }
    Ok(out)
}

/// Export an analysis table to Parquet with one `Float64` column per field.
///
/// Returns the number of rows written.
pub fn export_records_parquet(csv_path: &Path, parquet_path: &Path, title: &str) -> Result<usize> {
    let records = read_records_csv(csv_path)?;
    let cols: Vec<Vec<f64>> = (0..EvaluationRecord::COLUMNS.len())
        .map(|j| records.iter().map(|r| r.to_row()[j]).collect())
        .collect();
    let named: Vec<(&str, &[f64])> = EvaluationRecord::COLUMNS
        .iter()
        .zip(cols.iter())
        .map(|(n, c)| (*n, c.as_slice()))
        .collect();
    let metadata = HashMap::from([
        (META_KEY_SCHEMA_VERSION.to_string(), ANALYSIS_SCHEMA_V1.to_string()),
        (META_KEY_TITLE.to_string(), title.to_string()),
    ]);
    write_columns_parquet(parquet_path, &named, metadata)?;
    tracing::info!(
        source = %csv_path.display(),
        output = %parquet_path.display(),
        rows = records.len(),
        "exported analysis table"
    );
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_path(name: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("pnn_export_{}_{}_{}", name, std::process::id(), nanos))
    }

    #[test]
    fn test_csv_header_and_rows() {
        let p = tmp_path("a.csv");
        let r = EvaluationRecord {
            label: 1.0,
            mwwbb: 512.25,
            mjj: 80.5,
            nn: 0.75,
            jes_gen: 0.95,
            jes_eval: 1.0,
        };
        let mut w = RecordWriter::create(&p).unwrap();
        w.write(&r).unwrap();
        w.write(&r).unwrap();
        assert_eq!(w.finish().unwrap(), 2);
        let text = std::fs::read_to_string(&p).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "label,mwwbb,mjj,nn,jes_true,jes_param");
        assert_eq!(lines.next().unwrap(), "1.000000,512.250000,80.500000,0.750000,0.950000,1.000000");
        assert_eq!(read_records_csv(&p).unwrap(), vec![r, r]);
        std::fs::remove_file(&p).ok();
    }

    #[test]
    fn test_bad_header_rejected() {
        let p = tmp_path("b.csv");
        std::fs::write(&p, "a,b\n1,2\n").unwrap();
        assert!(matches!(read_records_csv(&p), Err(Error::MalformedRow { line: 1, .. })));
        std::fs::remove_file(&p).ok();
    }
}
