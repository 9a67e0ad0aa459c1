//! # vc-selection
//!
//! Cross-validated hyperparameter sweeps for valcurve.
//!
//! Provides the [`Estimator`] capability set, fold splitters, scorers and
//! [`validation_curve`], which fits one estimator clone per (candidate, fold)
//! pair and collects training and validation scores. Two reference
//! estimators ship with the crate: [`KNeighborsClassifier`] and
//! [`PolynomialRidge`].

mod curve;
mod estimator;
mod linear;
mod metrics;
mod neighbors;
mod split;

pub use curve::{check_inputs, validation_curve, ErrorScore, ValidationCurveConfig};
pub use estimator::{Estimator, EstimatorKind};
pub use linear::PolynomialRidge;
pub use metrics::{
    accuracy, mean_absolute_error, mean_squared_error, r2_score, ScoreFn, Scoring,
};
pub use neighbors::{KNeighborsClassifier, Weights};
pub use split::{CvStrategy, KFold, Split, StratifiedKFold};
