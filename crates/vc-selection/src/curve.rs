//! Validation curves: cross-validated scores for each candidate value of one
//! hyperparameter.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vc_types::{
    config_error, DataError, ParamError, ParamRange, ParamValue, ScoreMatrix, VcResult,
};

use crate::estimator::Estimator;
use crate::metrics::Scoring;
use crate::split::{CvStrategy, Split};

/// What to record when fitting fails on a fold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorScore {
    /// Propagate the fit error.
    Raise,
    /// Record this value for both the train and test score.
    Value(f64),
}

impl Default for ErrorScore {
    fn default() -> Self {
        Self::Raise
    }
}

/// Settings for a validation curve run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationCurveConfig {
    /// Fold splitting strategy.
    pub cv: CvStrategy,

    /// Scorer; `None` uses the estimator's default metric.
    pub scoring: Option<Scoring>,

    /// Worker threads for fold evaluation. `1` runs on the calling thread,
    /// `0` uses the rayon default.
    pub n_jobs: usize,

    pub error_score: ErrorScore,
}

impl Default for ValidationCurveConfig {
    fn default() -> Self {
        Self {
            cv: CvStrategy::default(),
            scoring: None,
            n_jobs: 1,
            error_score: ErrorScore::Raise,
        }
    }
}

impl ValidationCurveConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folds(mut self, n_splits: usize) -> Self {
        self.cv = CvStrategy::Folds(n_splits);
        self
    }

    pub fn with_cv(mut self, cv: CvStrategy) -> Self {
        self.cv = cv;
        self
    }

    pub fn with_scoring(mut self, scoring: Option<Scoring>) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    pub fn with_error_score(mut self, error_score: ErrorScore) -> Self {
        self.error_score = error_score;
        self
    }
}

/// Reject inputs that no split or fit could handle.
pub fn check_inputs(x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> VcResult<()> {
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
    if let Some(((row, column), _)) = x.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(DataError::NonFinite { row, column }.into());
    }
    Ok(())
}

/// Compute training and validation scores for every candidate value.
///
/// Both returned matrices are shaped `(param_range.len(), n_splits)`; row `i`
/// belongs to `param_range.values()[i]`, column `j` to fold `j`.
pub fn validation_curve<E: Estimator>(
    estimator: &E,
    x: ArrayView2<'_, f64>,
    y: ArrayView1<'_, f64>,
    param_name: &str,
    param_range: &ParamRange,
    config: &ValidationCurveConfig,
) -> VcResult<(ScoreMatrix, ScoreMatrix)> {
    check_inputs(x, y)?;
    if param_name.trim().is_empty() {
        return Err(ParamError::EmptyName.into());
    }

    let splits = config.cv.split(y, estimator.kind())?;

    // Fail fast on a name the estimator does not know.
    estimator
        .clone()
        .set_param(param_name, param_range.first())?;

    let scoring = config
        .scoring
        .clone()
        .unwrap_or_else(|| Scoring::default_for(estimator.kind()));
    let n_candidates = param_range.len();
    let n_folds = splits.len();

    info!(
        "Validation curve for {} over {} values of '{}' ({} folds, scoring={}, n_jobs={})",
        estimator.name(),
        n_candidates,
        param_name,
        n_folds,
        scoring.name(),
        config.n_jobs
    );

    let jobs: Vec<(usize, usize)> = (0..n_candidates)
        .flat_map(|candidate| (0..n_folds).map(move |fold| (candidate, fold)))
        .collect();

    let run = |&(candidate, fold): &(usize, usize)| -> VcResult<(f64, f64)> {
        fit_and_score(
            estimator,
            x,
            y,
            param_name,
            &param_range.values()[candidate],
            &splits[fold],
            &scoring,
            config.error_score,
        )
        .map(|scores| {
            debug!(
                "{}={} fold {}: train={:.4} test={:.4}",
                param_name, param_range.values()[candidate], fold, scores.0, scores.1
            );
            scores
        })
    };

    let results: Vec<(f64, f64)> = if config.n_jobs == 1 {
        jobs.iter().map(run).collect::<VcResult<_>>()?
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.n_jobs)
            .build()
            .map_err(|e| config_error!("failed to build worker pool: {}", e))?;
        pool.install(|| jobs.par_iter().map(run).collect::<VcResult<_>>())?
    };

    let mut train = Array2::zeros((n_candidates, n_folds));
    let mut test = Array2::zeros((n_candidates, n_folds));
    for (&(candidate, fold), (train_score, test_score)) in jobs.iter().zip(results) {
        train[[candidate, fold]] = train_score;
        test[[candidate, fold]] = test_score;
    }

    info!("Validation curve for {} completed", estimator.name());
    Ok((ScoreMatrix::new(train)?, ScoreMatrix::new(test)?))
}

#[allow(clippy::too_many_arguments)]
fn fit_and_score<E: Estimator>(
    estimator: &E,
    x: ArrayView2<'_, f64>,
    y: ArrayView1<'_, f64>,
    param_name: &str,
    value: &ParamValue,
    split: &Split,
    scoring: &Scoring,
    error_score: ErrorScore,
) -> VcResult<(f64, f64)> {
    let mut model = estimator.clone();
    model.set_param(param_name, value)?;

    let x_train = x.select(Axis(0), &split.train);
    let y_train = y.select(Axis(0), &split.train);
    let x_test = x.select(Axis(0), &split.test);
    let y_test = y.select(Axis(0), &split.test);

    if let Err(e) = model.fit(x_train.view(), y_train.view()) {
        return match error_score {
            ErrorScore::Raise => Err(e),
            ErrorScore::Value(v) => {
                warn!(
                    "Fit failed for {}={}; recording score {}: {}",
                    param_name, value, v, e
                );
                Ok((v, v))
            }
        };
    }

    let train_score = scoring.score(&model, x_train.view(), y_train.view())?;
    let test_score = scoring.score(&model, x_test.view(), y_test.view())?;
    Ok((train_score, test_score))
}
