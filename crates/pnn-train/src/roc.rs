//! ROC curve and trapezoidal AUC.

use pnn_core::{Error, Result};
use pnn_io::NumericTable;

/// Receiver operating characteristic of a score against 0/1 labels.
///
/// Points run from `(0, 0)` to `(1, 1)` with decreasing threshold. Collinear
/// intermediate points are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    /// False-positive rate per threshold.
    pub fpr: Vec<f64>,
    /// True-positive rate per threshold.
    pub tpr: Vec<f64>,
    /// Score threshold per point; the first is `+inf`.
    pub thresholds: Vec<f64>,
}

impl RocCurve {
    /// Area under the curve.
    pub fn auc(&self) -> f64 {
        trapezoid(&self.fpr, &self.tpr)
    }

    /// `(fpr, tpr)` rows.
    pub fn to_table(&self) -> Result<NumericTable> {
        NumericTable::from_columns(&[&self.fpr, &self.tpr])
    }

    /// Rebuild from `(fpr, tpr)` rows (thresholds are not persisted).
    pub fn from_table(table: &NumericTable) -> Result<Self> {
        if table.n_cols() != 2 {
            return Err(Error::ShapeMismatch(format!(
                "ROC table needs 2 columns, got {}",
                table.n_cols()
            )));
        }
        let fpr = table.column(0);
        let tpr = table.column(1);
        let thresholds = vec![f64::NAN; fpr.len()];
        Ok(Self { fpr, tpr, thresholds })
    }
}

/// Compute the ROC of `scores` against `labels` (1 positive, 0 negative).
///
/// Both classes must be present, otherwise the curve is undefined.
pub fn roc_curve(labels: &[f64], scores: &[f64]) -> Result<RocCurve> {
    if labels.len() != scores.len() {
        return Err(Error::ShapeMismatch(format!(
            "{} labels but {} scores",
            labels.len(),
            scores.len()
        )));
    }
    if let Some(bad) = labels.iter().find(|&&l| l != 0.0 && l != 1.0) {
        return Err(Error::Validation(format!("ROC labels must be 0 or 1, got {bad}")));
    }
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(Error::Computation("ROC scores contain non-finite values".into()));
    }
    let n_pos = labels.iter().filter(|&&l| l == 1.0).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(Error::Computation(format!(
            "ROC undefined with {n_pos} positive and {n_neg} negative samples"
        )));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    // Cumulative counts at the last index of each distinct score.
    let mut tps = Vec::new();
    let mut fps = Vec::new();
    let mut thr = Vec::new();
    let (mut tp, mut fp) = (0usize, 0usize);
    for (pos, &i) in order.iter().enumerate() {
        if labels[i] == 1.0 {
            tp += 1;
        } else {
            fp += 1;
        }
        let last_of_group = order.get(pos + 1).is_none_or(|&j| scores[j] != scores[i]);
        if last_of_group {
            tps.push(tp as f64);
            fps.push(fp as f64);
            thr.push(scores[i]);
        }
    }

    let n = tps.len();
    let keep: Vec<usize> = (0..n)
        .filter(|&k| {
            k == 0
                || k == n - 1
                || fps[k - 1] - 2.0 * fps[k] + fps[k + 1] != 0.0
                || tps[k - 1] - 2.0 * tps[k] + tps[k + 1] != 0.0
        })
        .collect();

    let mut curve = RocCurve {
        fpr: Vec::with_capacity(keep.len() + 1),
        tpr: Vec::with_capacity(keep.len() + 1),
        thresholds: Vec::with_capacity(keep.len() + 1),
    };
    curve.fpr.push(0.0);
    curve.tpr.push(0.0);
    curve.thresholds.push(f64::INFINITY);
    for k in keep {
        curve.fpr.push(fps[k] / n_neg as f64);
        curve.tpr.push(tps[k] / n_pos as f64);
        curve.thresholds.push(thr[k]);
    }
    Ok(curve)
}

fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2).zip(y.windows(2)).map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) * 0.5).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_and_inverted() {
        let labels = [1.0, 1.0, 0.0, 0.0];
        let roc = roc_curve(&labels, &[0.9, 0.8, 0.2, 0.1]).unwrap();
        assert_relative_eq!(roc.auc(), 1.0);
        assert_eq!(roc.fpr.first(), Some(&0.0));
        assert_eq!(roc.tpr.last(), Some(&1.0));
        let roc = roc_curve(&labels, &[0.1, 0.2, 0.8, 0.9]).unwrap();
        assert_relative_eq!(roc.auc(), 0.0);
    }

    #[test]
    fn test_known_auc_with_ties() {
        // sklearn.metrics.roc_auc_score([0, 0, 1, 1], [0.1, 0.4, 0.35, 0.8]) == 0.75
        let roc = roc_curve(&[0.0, 0.0, 1.0, 1.0], &[0.1, 0.4, 0.35, 0.8]).unwrap();
        assert_relative_eq!(roc.auc(), 0.75);
        assert_eq!(roc.fpr, vec![0.0, 0.0, 0.5, 0.5, 1.0]);
        assert_eq!(roc.tpr, vec![0.0, 0.5, 0.5, 1.0, 1.0]);

        // A constant score is the diagonal.
        let roc = roc_curve(&[0.0, 1.0, 0.0, 1.0], &[0.5; 4]).unwrap();
        assert_relative_eq!(roc.auc(), 0.5);
    }

    #[test]
    fn test_collinear_points_dropped() {
        let labels = [1.0, 1.0, 1.0, 0.0];
        let roc = roc_curve(&labels, &[0.9, 0.8, 0.7, 0.1]).unwrap();
        assert_eq!(roc.tpr, vec![0.0, 1.0 / 3.0, 1.0, 1.0]);
        assert_relative_eq!(roc.auc(), 1.0);
    }

    #[test]
    fn test_one_class_is_computation_error() {
        assert!(matches!(roc_curve(&[1.0, 1.0], &[0.2, 0.3]), Err(Error::Computation(_))));
        assert!(matches!(roc_curve(&[1.0, 0.5], &[0.2, 0.3]), Err(Error::Validation(_))));
        assert!(roc_curve(&[1.0], &[0.2, 0.3]).is_err());
    }

    #[test]
    fn test_auc_matches_pair_ranking() {
        // 5 of the 6 signal/background pairs are ordered correctly.
        let roc = roc_curve(&[0.0, 1.0, 1.0, 0.0, 1.0], &[0.3, 0.6, 0.2, 0.1, 0.9]).unwrap();
        assert_relative_eq!(roc.auc(), 5.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_table_roundtrip_keeps_auc() {
        let roc = roc_curve(&[0.0, 1.0, 1.0, 0.0, 1.0], &[0.3, 0.6, 0.2, 0.1, 0.9]).unwrap();
        let back = RocCurve::from_table(&roc.to_table().unwrap()).unwrap();
        assert_relative_eq!(back.auc(), roc.auc());
    }
}
