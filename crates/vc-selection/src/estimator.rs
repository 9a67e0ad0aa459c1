//! The estimator capability set used by cross-validation.
//!
//! A model takes part in a validation curve when it can be cloned, accept a
//! named hyperparameter, fit on a sample subset and predict. Scoring defaults
//! to accuracy for classifiers and R² for regressors.

use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use vc_types::{ParamError, ParamValue, VcError, VcResult};

use crate::metrics::Scoring;

/// Whether predictions are class labels or continuous targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstimatorKind {
    Classifier,
    Regressor,
}

/// Common trait for every model a validation curve can sweep.
pub trait Estimator: Clone + Send + Sync {
    /// Human-readable estimator name (used in errors and logs).
    fn name(&self) -> &str;

    fn kind(&self) -> EstimatorKind;

    /// Set one hyperparameter by name.
    ///
    /// Unknown names must fail with [`ParamError::Unknown`].
    fn set_param(&mut self, name: &str, value: &ParamValue) -> VcResult<()>;

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> VcResult<()>;

    fn predict(&self, x: ArrayView2<'_, f64>) -> VcResult<Array1<f64>>;

    /// Score with the estimator's default metric.
    fn score(&self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> VcResult<f64> {
        Scoring::default_for(self.kind()).score(self, x, y)
    }
}

pub(crate) fn unknown_param(estimator: &str, name: &str) -> VcError {
    ParamError::Unknown {
        estimator: estimator.to_string(),
        name: name.to_string(),
    }
    .into()
}

pub(crate) fn invalid_value(name: &str, message: impl Into<String>) -> VcError {
    ParamError::InvalidValue {
        name: name.to_string(),
        message: message.into(),
    }
    .into()
}

/// Integer parameter with an inclusive lower bound.
pub(crate) fn param_usize(name: &str, value: &ParamValue, min: usize) -> VcResult<usize> {
    match value.as_i64() {
        Some(v) if v >= min as i64 => Ok(v as usize),
        _ => Err(invalid_value(
            name,
            format!("expected an integer >= {min}, got {value}"),
        )),
    }
}

/// Finite float parameter with an inclusive lower bound.
pub(crate) fn param_f64(name: &str, value: &ParamValue, min: f64) -> VcResult<f64> {
    match value.as_f64() {
        Some(v) if v.is_finite() && v >= min => Ok(v),
        _ => Err(invalid_value(
            name,
            format!("expected a finite number >= {min}, got {value}"),
        )),
    }
}
