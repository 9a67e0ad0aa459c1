//! Cross-validated score matrices and their per-candidate reductions.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::errors::{DataError, VcResult};

/// Scores shaped `(candidates, folds)`: row `i` holds every fold's score for
/// candidate value `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Array2<f64>", into = "Array2<f64>")]
pub struct ScoreMatrix {
    scores: Array2<f64>,
}

impl ScoreMatrix {
    pub fn new(scores: Array2<f64>) -> VcResult<Self> {
        Self::try_from(scores).map_err(Into::into)
    }

    /// Build from row vectors, one per candidate.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> VcResult<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(DataError::InvalidScores {
                message: format!("row {idx} has {} folds, row 0 has {n_cols}", row.len()),
            }
            .into());
        }
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let scores = Array2::from_shape_vec((n_rows, n_cols), flat).map_err(|e| {
            DataError::InvalidScores {
                message: e.to_string(),
            }
        })?;
        Self::new(scores)
    }

    pub fn n_candidates(&self) -> usize {
        self.scores.nrows()
    }

    pub fn n_folds(&self) -> usize {
        self.scores.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.scores.dim()
    }

    pub fn row(&self, candidate: usize) -> ArrayView1<'_, f64> {
        self.scores.row(candidate)
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.scores
    }

    /// Mean and population standard deviation (ddof = 0) across folds.
    pub fn summarize(&self) -> CurveSummary {
        let n = self.n_folds() as f64;
        let mean: Array1<f64> = self.scores.sum_axis(Axis(1)) / n;
        let std: Array1<f64> = self.scores.std_axis(Axis(1), 0.0);
        CurveSummary {
            mean: mean.to_vec(),
            std: std.to_vec(),
        }
    }
}

impl TryFrom<Array2<f64>> for ScoreMatrix {
    type Error = DataError;

    fn try_from(scores: Array2<f64>) -> Result<Self, Self::Error> {
        if scores.nrows() == 0 || scores.ncols() == 0 {
            return Err(DataError::InvalidScores {
                message: format!(
                    "expected at least one candidate and one fold, got shape {:?}",
                    scores.dim()
                ),
            });
        }
        Ok(Self { scores })
    }
}

impl From<ScoreMatrix> for Array2<f64> {
    fn from(matrix: ScoreMatrix) -> Self {
        matrix.scores
    }
}

/// Per-candidate mean and spread of one score matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSummary {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl CurveSummary {
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// `mean - std` for each candidate.
    pub fn lower(&self) -> Vec<f64> {
        self.mean.iter().zip(&self.std).map(|(m, s)| m - s).collect()
    }

    /// `mean + std` for each candidate.
    pub fn upper(&self) -> Vec<f64> {
        self.mean.iter().zip(&self.std).map(|(m, s)| m + s).collect()
    }

    /// Index of the candidate with the highest mean score.
    pub fn best_index(&self) -> Option<usize> {
        self.mean
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::VcError;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn summarize_reduces_across_folds() {
        let matrix = ScoreMatrix::new(array![[1.0, 2.0, 3.0], [0.5, 0.5, 0.5]]).unwrap();
        let summary = matrix.summarize();

        assert_eq!(summary.len(), 2);
        assert_abs_diff_eq!(summary.mean[0], 2.0, epsilon = 1e-12);
        // population std of [1, 2, 3]
        assert_abs_diff_eq!(summary.std[0], (2.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(summary.mean[1], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(summary.std[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_rows_have_zero_spread() {
        let rows = [0.5, 0.6, 0.9, 0.95, 0.4]
            .iter()
            .map(|v| vec![*v; 3])
            .collect();
        let summary = ScoreMatrix::from_rows(rows).unwrap().summarize();
        for (m, expected) in summary.mean.iter().zip([0.5, 0.6, 0.9, 0.95, 0.4]) {
            assert_abs_diff_eq!(*m, expected, epsilon = 1e-12);
        }
        assert!(summary.std.iter().all(|s| s.abs() < 1e-12));
        assert_eq!(summary.lower().len(), 5);
        assert_eq!(summary.upper().len(), 5);
    }

    #[test]
    fn deserializing_checks_shape() {
        let matrix = ScoreMatrix::new(array![[0.5, 0.7], [0.6, 0.8]]).unwrap();
        let json = serde_json::to_string(&matrix).unwrap();
        let parsed: ScoreMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, matrix);

        let no_folds = r#"{"v":1,"dim":[2,0],"data":[]}"#;
        assert!(serde_json::from_str::<ScoreMatrix>(no_folds).is_err());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let result = ScoreMatrix::from_rows(vec![vec![1.0, 2.0], vec![1.0]]);
        assert!(matches!(
            result,
            Err(VcError::Data(DataError::InvalidScores { .. }))
        ));
    }

    #[test]
    fn zero_fold_matrix_is_rejected() {
        assert!(ScoreMatrix::new(Array2::zeros((3, 0))).is_err());
        assert!(ScoreMatrix::from_rows(Vec::new()).is_err());
    }

    #[test]
    fn best_index_picks_highest_mean() {
        let summary = CurveSummary {
            mean: vec![0.2, 0.9, 0.4],
            std: vec![0.0; 3],
        };
        assert_eq!(summary.best_index(), Some(1));
    }
}
