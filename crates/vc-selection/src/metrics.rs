//! Scoring metrics.
//!
//! Every scorer follows the "greater is better" convention, so error metrics
//! are exposed negated (`neg_mean_squared_error`).

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use vc_types::{ModelError, VcError, VcResult};

use crate::estimator::{Estimator, EstimatorKind};

type MetricFn = dyn Fn(ArrayView1<'_, f64>, ArrayView1<'_, f64>) -> f64 + Send + Sync;

/// User-supplied metric over `(y_true, y_pred)`.
#[derive(Clone)]
pub struct ScoreFn {
    name: String,
    metric: Arc<MetricFn>,
}

impl ScoreFn {
    pub fn new<F>(name: impl Into<String>, metric: F) -> Self
    where
        F: Fn(ArrayView1<'_, f64>, ArrayView1<'_, f64>) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            metric: Arc::new(metric),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ScoreFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoreFn").field("name", &self.name).finish()
    }
}

/// How a fitted estimator is scored on a fold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    Accuracy,
    R2,
    NegMeanSquaredError,
    NegMeanAbsoluteError,
    #[serde(skip)]
    Custom(ScoreFn),
}

impl Scoring {
    /// Look a scorer up by its identifier.
    pub fn from_name(name: &str) -> VcResult<Self> {
        match name {
            "accuracy" => Ok(Self::Accuracy),
            "r2" => Ok(Self::R2),
            "neg_mean_squared_error" => Ok(Self::NegMeanSquaredError),
            "neg_mean_absolute_error" => Ok(Self::NegMeanAbsoluteError),
            other => Err(ModelError::UnknownScoring {
                name: other.to_string(),
            }
            .into()),
        }
    }

    pub fn default_for(kind: EstimatorKind) -> Self {
        match kind {
            EstimatorKind::Classifier => Self::Accuracy,
            EstimatorKind::Regressor => Self::R2,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Accuracy => "accuracy",
            Self::R2 => "r2",
            Self::NegMeanSquaredError => "neg_mean_squared_error",
            Self::NegMeanAbsoluteError => "neg_mean_absolute_error",
            Self::Custom(f) => f.name(),
        }
    }

    /// Compare predictions against the truth.
    pub fn evaluate(&self, y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> VcResult<f64> {
        if y_true.len() != y_pred.len() {
            return Err(scoring_failed(format!(
                "y_true has {} entries, y_pred has {}",
                y_true.len(),
                y_pred.len()
            )));
        }
        if y_true.is_empty() {
            return Err(scoring_failed("cannot score an empty sample"));
        }
        let value = match self {
            Self::Accuracy => accuracy(y_true, y_pred),
            Self::R2 => r2_score(y_true, y_pred),
            Self::NegMeanSquaredError => -mean_squared_error(y_true, y_pred),
            Self::NegMeanAbsoluteError => -mean_absolute_error(y_true, y_pred),
            Self::Custom(f) => (f.metric)(y_true, y_pred),
        };
        Ok(value)
    }

    /// Predict with `estimator` on `x` and evaluate against `y`.
    pub fn score<E: Estimator>(
        &self,
        estimator: &E,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
    ) -> VcResult<f64> {
        let predictions = estimator.predict(x)?;
        self.evaluate(y, predictions.view())
    }
}

impl FromStr for Scoring {
    type Err = VcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

fn scoring_failed(message: impl Into<String>) -> VcError {
    ModelError::ScoringFailed {
        message: message.into(),
    }
    .into()
}

/// Fraction of exact label matches.
pub fn accuracy(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> f64 {
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| (*t - *p).abs() < 1e-10)
        .count();
    correct as f64 / y_true.len() as f64
}

pub fn mean_squared_error(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> f64 {
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64
}

pub fn mean_absolute_error(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> f64 {
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / y_true.len() as f64
}

/// Coefficient of determination.
///
/// A constant target scores 1.0 when predicted perfectly and 0.0 otherwise.
pub fn r2_score(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> f64 {
    let n = y_true.len() as f64;
    let mean = y_true.sum() / n;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}
