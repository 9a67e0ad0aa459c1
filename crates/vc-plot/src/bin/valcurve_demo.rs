//! Validation curve demo
//!
//! Sweeps the neighbour count of a k-nearest-neighbours classifier over a
//! synthetic two-class dataset and writes the resulting figure as SVG.
//!
//! Run with: cargo run --bin valcurve-demo

use std::str::FromStr;

use anyhow::Context;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vc_plot::{PlotStyle, ValidationCurvePlotter, XScale};
use vc_selection::{KNeighborsClassifier, ValidationCurveConfig};
use vc_types::{config_error, ParamRange, VcResult};

const BANNER: &str = "Validation curves show the training and cross-validation \
score of an estimator for a range of values of one hyperparameter. Low scores \
on both sides point to underfitting; a high training score with a low \
cross-validation score points to overfitting.";

const SAMPLES_PER_CLASS: usize = 100;

struct DemoConfig {
    output: String,
    cv: usize,
    n_jobs: usize,
    seed: u64,
}

impl DemoConfig {
    fn from_env() -> VcResult<Self> {
        Ok(Self {
            output: std::env::var("VALCURVE_OUTPUT")
                .unwrap_or_else(|_| "validation_curve.svg".to_string()),
            cv: env_or("VALCURVE_CV", 3)?,
            n_jobs: env_or("VALCURVE_N_JOBS", 1)?,
            seed: env_or("VALCURVE_SEED", 0)?,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> VcResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| config_error!("{}={:?} is invalid: {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

/// Two overlapping Gaussian blobs in the plane, labelled 0 and 1.
fn make_blobs(seed: u64) -> anyhow::Result<(Array2<f64>, Array1<f64>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.5).context("invalid noise distribution")?;
    let centers = [(-1.0, -1.0), (1.5, 1.0)];

    let n = SAMPLES_PER_CLASS * centers.len();
    let mut x = Array2::zeros((n, 2));
    let mut y = Array1::zeros(n);
    for (label, (cx, cy)) in centers.iter().enumerate() {
        for i in 0..SAMPLES_PER_CLASS {
            let row = label * SAMPLES_PER_CLASS + i;
            x[[row, 0]] = cx + noise.sample(&mut rng);
            x[[row, 1]] = cy + noise.sample(&mut rng);
            y[row] = label as f64;
        }
    }
    Ok((x, y))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("{}", BANNER);

    let config = DemoConfig::from_env()?;
    let (x, y) = make_blobs(config.seed)?;
    info!(
        "Generated {} samples with seed {}; cv={} n_jobs={}",
        y.len(),
        config.seed,
        config.cv,
        config.n_jobs
    );

    let param_range = ParamRange::from_numbers([1, 2, 4, 8, 16, 32, 64])?;
    let plotter = ValidationCurvePlotter::new()
        .with_style(PlotStyle::default().with_x_scale(XScale::Log))
        .with_config(
            ValidationCurveConfig::new()
                .with_folds(config.cv)
                .with_n_jobs(config.n_jobs),
        );

    let figure = plotter.plot(
        &KNeighborsClassifier::new(5),
        "n_neighbors",
        &param_range,
        x.view(),
        y.view(),
        "Validation Curve with KNN",
    )?;

    figure
        .save_svg(&config.output)
        .with_context(|| format!("failed to write {}", config.output))?;
    Ok(())
}
