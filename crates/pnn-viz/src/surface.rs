use serde::{Deserialize, Serialize};

use pnn_core::{Error, Result, Window};

/// Values on a regular `x × y` grid, stored y-major (`z[iy * nx + ix]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// Grid x coordinates, ascending.
    pub x: Vec<f64>,
    /// Grid y coordinates, ascending.
    pub y: Vec<f64>,
    /// Values, y-major.
    pub z: Vec<f64>,
}

impl Surface {
    /// Evaluate `f(x, y)` at every grid point.
    pub fn from_fn<F>(x: Vec<f64>, y: Vec<f64>, mut f: F) -> Result<Self>
    where
        F: FnMut(f64, f64) -> Result<f64>,
    {
        let mut z = Vec::with_capacity(x.len() * y.len());
        for &yv in &y {
            for &xv in &x {
                z.push(f(xv, yv)?);
            }
        }
        Ok(Self { x, y, z })
    }

    /// Grid points along x.
    pub fn nx(&self) -> usize {
        self.x.len()
    }

    /// Grid points along y.
    pub fn ny(&self) -> usize {
        self.y.len()
    }

    /// Value at grid indices.
    pub fn at(&self, ix: usize, iy: usize) -> f64 {
        self.z[iy * self.x.len() + ix]
    }

    /// Smallest and largest finite value.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.z.iter().filter(|v| v.is_finite()).fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// `n` evenly spaced points from `lo` to `hi` inclusive.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n).map(|i| if i == n - 1 { hi } else { lo + step * i as f64 }).collect()
        }
    }
}

/// `n` points starting at `lo` with step `(hi - lo) / n` (the upper edge is
/// excluded).
pub fn steps(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let step = (hi - lo) / n as f64;
    (0..n).map(|i| lo + step * i as f64).collect()
}

/// Inclusive grid axes spanning a window.
pub fn window_axes(window: &Window, n: usize) -> (Vec<f64>, Vec<f64>) {
    (linspace(window.x[0], window.x[1], n), linspace(window.y[0], window.y[1], n))
}

/// Pointwise `a - b` on identical grids.
pub fn difference(a: &Surface, b: &Surface) -> Result<Surface> {
    if a.x != b.x || a.y != b.y || a.z.len() != b.z.len() {
        return Err(Error::ShapeMismatch(format!(
            "cannot subtract a {}x{} surface from a {}x{} surface on a different grid",
            b.nx(),
            b.ny(),
            a.nx(),
            a.ny()
        )));
    }
    Ok(Surface {
        x: a.x.clone(),
        y: a.y.clone(),
        z: a.z.iter().zip(&b.z).map(|(&p, &q)| p - q).collect(),
    })
}
