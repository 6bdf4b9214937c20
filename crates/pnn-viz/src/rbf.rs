use nalgebra::{DMatrix, DVector};

use pnn_core::{Error, Result};

/// Scattered-data interpolant `f(p) = Σ_j w_j · |p - p_j|` (linear kernel).
///
/// Weights solve the dense interpolation system `A w = z` with
/// `A_ij = |p_i - p_j|`. The interpolant reproduces every node exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct RbfInterpolator {
    nodes: Vec<[f64; 2]>,
    weights: Vec<f64>,
}

/// Drop points whose `(x, y)` repeats an earlier point (first one wins).
///
/// Coincident nodes make the interpolation matrix singular.
pub fn dedup_points(points: &[[f64; 3]]) -> Vec<[f64; 3]> {
    let mut seen = std::collections::HashSet::with_capacity(points.len());
    points
        .iter()
        .filter(|p| seen.insert((p[0].to_bits(), p[1].to_bits())))
        .copied()
        .collect()
}

#[inline]
fn dist(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

impl RbfInterpolator {
    /// Fit through `(x, y, z)` triples.
    pub fn fit(points: &[[f64; 3]]) -> Result<Self> {
        if let Some(p) = points.iter().find(|p| p.iter().any(|v| !v.is_finite())) {
            return Err(Error::Validation(format!("non-finite RBF input point {p:?}")));
        }
        let unique = dedup_points(points);
        if unique.len() < points.len() {
            tracing::debug!(dropped = points.len() - unique.len(), "dropped coincident RBF nodes");
        }
        let nodes: Vec<[f64; 2]> = unique.iter().map(|p| [p[0], p[1]]).collect();
        let n = nodes.len();
        match n {
            0 => return Err(Error::Validation("RBF interpolation needs at least one point".into())),
            // A single node has A = [0]; the only sensible surface is flat.
            1 => return Ok(Self { nodes, weights: vec![unique[0][2]] }),
            _ => {}
        }

        let a = DMatrix::from_fn(n, n, |i, j| dist(nodes[i], nodes[j]));
        let z = DVector::from_iterator(n, unique.iter().map(|p| p[2]));
        let w = a
            .lu()
            .solve(&z)
            .ok_or_else(|| Error::Computation(format!("singular RBF system with {n} nodes")))?;
        if w.iter().any(|v| !v.is_finite()) {
            return Err(Error::Computation(format!("RBF weights not finite ({n} nodes)")));
        }
        Ok(Self { nodes, weights: w.iter().copied().collect() })
    }

    /// Nodes after de-duplication.
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Interpolated value at `(x, y)`.
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        if self.nodes.len() == 1 {
            return self.weights[0];
        }
        self.nodes.iter().zip(&self.weights).map(|(&p, &w)| w * dist(p, [x, y])).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reproduces_nodes() {
        let pts = [
            [0.0, 0.0, 0.1],
            [100.0, 0.0, 0.9],
            [0.0, 50.0, 0.4],
            [70.0, 80.0, 0.2],
            [30.0, 20.0, 0.7],
        ];
        let rbf = RbfInterpolator::fit(&pts).unwrap();
        for p in &pts {
            assert_relative_eq!(rbf.eval(p[0], p[1]), p[2], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_coincident_points_are_deduplicated() {
        let pts = [[1.0, 1.0, 0.5], [1.0, 1.0, 0.9], [2.0, 3.0, 0.1]];
        let rbf = RbfInterpolator::fit(&pts).unwrap();
        assert_eq!(rbf.n_nodes(), 2);
        assert_relative_eq!(rbf.eval(1.0, 1.0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_single_point_is_flat() {
        let rbf = RbfInterpolator::fit(&[[3.0, 4.0, 0.25]]).unwrap();
        assert_eq!(rbf.eval(-100.0, 7.0), 0.25);
    }

    #[test]
    fn test_rejects_empty_and_nan() {
        assert!(RbfInterpolator::fit(&[]).is_err());
        assert!(RbfInterpolator::fit(&[[f64::NAN, 0.0, 0.0]]).is_err());
    }

    #[test]
    fn test_linear_along_a_line() {
        // Two nodes: the interpolant is linear between them.
        let rbf = RbfInterpolator::fit(&[[0.0, 0.0, 0.0], [10.0, 0.0, 1.0]]).unwrap();
        assert_relative_eq!(rbf.eval(5.0, 0.0), 0.5, epsilon = 1e-12);
    }
}
