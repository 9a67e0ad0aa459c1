//! Polynomial ridge regression on a single feature.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use vc_types::{DataError, ModelError, ParamValue, VcResult};

use crate::estimator::{param_f64, param_usize, unknown_param, Estimator, EstimatorKind};

/// Least squares fit of `y ≈ Σ w_d · x^d` for `d` in `0..=degree`, with an
/// L2 penalty `alpha` on every coefficient except the intercept.
///
/// Only the first feature column is used. Tunable parameters: `degree`,
/// `alpha`.
#[derive(Debug, Clone)]
pub struct PolynomialRidge {
    degree: usize,
    alpha: f64,
    coefficients: Option<Array1<f64>>,
}

impl Default for PolynomialRidge {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PolynomialRidge {
    pub fn new(degree: usize) -> Self {
        Self {
            degree,
            alpha: 0.0,
            coefficients: None,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    fn features(&self, x: ArrayView2<'_, f64>) -> Array2<f64> {
        Array2::from_shape_fn((x.nrows(), self.degree + 1), |(i, d)| {
            x[[i, 0]].powi(d as i32)
        })
    }

    /// Solve `a · w = b` by Gaussian elimination with partial pivoting.
    fn solve(&self, mut a: Array2<f64>, mut b: Array1<f64>) -> VcResult<Array1<f64>> {
        let n = a.nrows();
        let singular = || ModelError::Singular {
            estimator: self.name().to_string(),
        };

        for col in 0..n {
            let pivot_row = (col..n)
                .max_by(|&r, &s| {
                    a[[r, col]]
                        .abs()
                        .partial_cmp(&a[[s, col]].abs())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .ok_or_else(singular)?;

            if a[[pivot_row, col]].abs() < 1e-12 {
                return Err(singular().into());
            }
            if pivot_row != col {
                for j in 0..n {
                    a.swap([col, j], [pivot_row, j]);
                }
                b.swap(col, pivot_row);
            }

            for row in (col + 1)..n {
                let factor = a[[row, col]] / a[[col, col]];
                if factor == 0.0 {
                    continue;
                }
                for j in col..n {
                    a[[row, j]] -= factor * a[[col, j]];
                }
                b[row] -= factor * b[col];
            }
        }

        let mut w = Array1::zeros(n);
        for row in (0..n).rev() {
            let tail: f64 = ((row + 1)..n).map(|j| a[[row, j]] * w[j]).sum();
            w[row] = (b[row] - tail) / a[[row, row]];
        }
        Ok(w)
    }
}

impl Estimator for PolynomialRidge {
    fn name(&self) -> &str {
        "PolynomialRidge"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Regressor
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> VcResult<()> {
        match name {
            "degree" => self.degree = param_usize(name, value, 0)?,
            "alpha" => self.alpha = param_f64(name, value, 0.0)?,
            _ => return Err(unknown_param(self.name(), name)),
        }
        Ok(())
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> VcResult<()> {
        if x.nrows() != y.len() {
            return Err(DataError::ShapeMismatch {
                x_rows: x.nrows(),
                y_len: y.len(),
            }
            .into());
        }
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(DataError::Empty.into());
        }

        // Normal equation with ridge penalty: (XᵀX + αI') w = Xᵀy
        let features = self.features(x);
        let xt = features.t();
        let mut gram = xt.dot(&features);
        for d in 1..gram.nrows() {
            gram[[d, d]] += self.alpha;
        }
        let rhs = xt.dot(&y);

        self.coefficients = Some(self.solve(gram, rhs)?);
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> VcResult<Array1<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or_else(|| ModelError::NotFitted {
            estimator: self.name().to_string(),
        })?;
        if x.ncols() == 0 {
            return Err(DataError::Empty.into());
        }
        Ok(self.features(x).dot(coefficients))
    }
}
