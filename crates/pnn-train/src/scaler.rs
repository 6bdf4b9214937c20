//! Per-feature min/max scaling to `[0, 1]`.

use serde::{Deserialize, Serialize};

use pnn_core::{Error, Result};
use pnn_io::NumericTable;

/// Affine map `x -> (x - min) * scale` fitted on training rows.
///
/// A constant column gets `scale = 1`, so it maps to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: Vec<f64>,
    scale: Vec<f64>,
}

impl MinMaxScaler {
    /// Fit on a non-empty table of finite values.
    pub fn fit(x: &NumericTable) -> Result<Self> {
        if x.is_empty() {
            return Err(Error::Validation("cannot fit scaler on an empty table".into()));
        }
        let p = x.n_cols();
        let mut lo = vec![f64::INFINITY; p];
        let mut hi = vec![f64::NEG_INFINITY; p];
        for (i, row) in x.rows().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                if !v.is_finite() {
                    return Err(Error::Validation(format!(
                        "non-finite feature value at row {i}, column {j}"
                    )));
                }
                lo[j] = lo[j].min(v);
                hi[j] = hi[j].max(v);
            }
        }
        let scale = lo
            .iter()
            .zip(&hi)
            .map(|(&l, &h)| if h > l { 1.0 / (h - l) } else { 1.0 })
            .collect();
        Ok(Self { min: lo, scale })
    }

    /// Number of features.
    pub fn n_features(&self) -> usize {
        self.min.len()
    }

    /// Scale one row into `out`.
    #[inline]
    pub fn transform_into(&self, row: &[f64], out: &mut [f64]) {
        for ((o, &v), (&m, &s)) in out.iter_mut().zip(row).zip(self.min.iter().zip(&self.scale)) {
            *o = (v - m) * s;
        }
    }

    /// Scale a whole table.
    pub fn transform(&self, x: &NumericTable) -> Result<NumericTable> {
        if x.n_cols() != self.n_features() {
            return Err(Error::ShapeMismatch(format!(
                "scaler fitted on {} features, got {}",
                self.n_features(),
                x.n_cols()
            )));
        }
        let mut data = vec![0.0; x.as_slice().len()];
        for (row, out) in x.rows().zip(data.chunks_exact_mut(x.n_cols())) {
            self.transform_into(row, out);
        }
        NumericTable::from_row_major(x.n_cols(), data)
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.min.len() == self.scale.len()
            && self.min.iter().chain(&self.scale).all(|v| v.is_finite())
    }
}
