//! Whitespace-delimited numeric tables.
//!
//! One row per line, columns separated by whitespace, values written with six
//! decimals. Blank lines and lines starting with `#` are skipped on read.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use pnn_core::{Error, Result};

/// Dense row-major table of `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericTable {
    n_cols: usize,
    data: Vec<f64>,
}

impl NumericTable {
    /// Empty table with a fixed column count.
    pub fn with_columns(n_cols: usize) -> Self {
        Self { n_cols, data: Vec::new() }
    }

    /// Build from row-major data.
    pub fn from_row_major(n_cols: usize, data: Vec<f64>) -> Result<Self> {
        if n_cols == 0 {
            return Err(Error::ShapeMismatch("table must have at least one column".into()));
        }
        if data.len() % n_cols != 0 {
            return Err(Error::ShapeMismatch(format!(
                "{} values do not fill rows of {} columns",
                data.len(),
                n_cols
            )));
        }
        Ok(Self { n_cols, data })
    }

    /// Build from equally long columns.
    pub fn from_columns(columns: &[&[f64]]) -> Result<Self> {
        let Some(first) = columns.first() else {
            return Err(Error::ShapeMismatch("table must have at least one column".into()));
        };
        let n_rows = first.len();
        if let Some(bad) = columns.iter().position(|c| c.len() != n_rows) {
            return Err(Error::ShapeMismatch(format!(
                "column {bad} has {} rows, expected {n_rows}",
                columns[bad].len()
            )));
        }
        let n_cols = columns.len();
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for i in 0..n_rows {
            data.extend(columns.iter().map(|c| c[i]));
        }
        Ok(Self { n_cols, data })
    }

    /// Append one row.
    pub fn push_row(&mut self, row: &[f64]) -> Result<()> {
        if row.len() != self.n_cols {
            return Err(Error::ShapeMismatch(format!(
                "row has {} values, table has {} columns",
                row.len(),
                self.n_cols
            )));
        }
        self.data.extend_from_slice(row);
        Ok(())
    }

    /// Append all rows of `other`.
    pub fn extend(&mut self, other: &NumericTable) -> Result<()> {
        if other.n_cols != self.n_cols {
            return Err(Error::ShapeMismatch(format!(
                "cannot append a {}-column table to a {}-column table",
                other.n_cols, self.n_cols
            )));
        }
        self.data.extend_from_slice(&other.data);
        Ok(())
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        if self.n_cols == 0 { 0 } else { self.data.len() / self.n_cols }
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// `true` when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row `i`.
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n_cols..(i + 1) * self.n_cols]
    }

    /// Iterate rows.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.n_cols.max(1))
    }

    /// Copy of column `j`.
    pub fn column(&self, j: usize) -> Vec<f64> {
        self.rows().map(|r| r[j]).collect()
    }

    /// New table with the selected columns, in the given order.
    pub fn select(&self, cols: &[usize]) -> Result<NumericTable> {
        if let Some(&bad) = cols.iter().find(|&&c| c >= self.n_cols) {
            return Err(Error::ShapeMismatch(format!(
                "column {bad} out of range for a {}-column table",
                self.n_cols
            )));
        }
        let mut data = Vec::with_capacity(self.n_rows() * cols.len());
        for r in self.rows() {
            data.extend(cols.iter().map(|&c| r[c]));
        }
        NumericTable::from_row_major(cols.len(), data)
    }

    /// Rows `range` as a new table.
    pub fn slice_rows(&self, range: std::ops::Range<usize>) -> NumericTable {
        let start = range.start.min(self.n_rows());
        let end = range.end.min(self.n_rows()).max(start);
        Self { n_cols: self.n_cols, data: self.data[start * self.n_cols..end * self.n_cols].to_vec() }
    }

    /// Row-major backing data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Read a whitespace-delimited table. Every row must have the same width.
pub fn read_table(path: &Path) -> Result<NumericTable> {
    if !path.is_file() {
        return Err(Error::missing("numeric table", path));
    }
    let reader = BufReader::new(std::fs::File::open(path)?);
    let mut table: Option<NumericTable> = None;
    let mut row = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        row.clear();
        for tok in trimmed.split_whitespace() {
            let v: f64 = tok.parse().map_err(|e| Error::MalformedRow {
                path: path.to_path_buf(),
                line: idx + 1,
                reason: format!("invalid number '{tok}': {e}"),
            })?;
            row.push(v);
        }
        let t = table.get_or_insert_with(|| NumericTable::with_columns(row.len()));
        if row.len() != t.n_cols() {
            return Err(Error::MalformedRow {
                path: path.to_path_buf(),
                line: idx + 1,
                reason: format!("expected {} columns, got {}", t.n_cols(), row.len()),
            });
        }
        t.push_row(&row)?;
    }
    table.ok_or_else(|| Error::MalformedRow {
        path: path.to_path_buf(),
        line: 0,
        reason: "table has no rows".into(),
    })
}

/// Write a table with six decimals per value. Parent directories are created.
pub fn write_table(path: &Path, table: &NumericTable) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut w = BufWriter::new(std::fs::File::create(path)?);
    let mut line = String::new();
    for row in table.rows() {
        line.clear();
        for (j, v) in row.iter().enumerate() {
            if j > 0 {
                line.push(' ');
            }
            line.push_str(&format!("{v:.6}"));
        }
        line.push('\n');
        w.write_all(line.as_bytes())?;
    }
    w.flush()?;
    tracing::debug!(path = %path.display(), rows = table.n_rows(), "wrote table");
    Ok(())
}

/// Write a single value in scientific notation (AUC files).
pub fn write_scalar(path: &Path, value: f64) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, format!("{value:.18e}\n"))?;
    Ok(())
}

/// Read a single-value file written by [`write_scalar`].
pub fn read_scalar(path: &Path) -> Result<f64> {
    if !path.is_file() {
        return Err(Error::missing("scalar", path));
    }
    let text = std::fs::read_to_string(path)?;
    let tok = text.trim();
    tok.parse().map_err(|e| Error::MalformedRow {
        path: path.to_path_buf(),
        line: 1,
        reason: format!("invalid number '{tok}': {e}"),
    })
}
