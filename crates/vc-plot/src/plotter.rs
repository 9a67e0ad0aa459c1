//! Validation curve figures: run the sweep, reduce the scores, draw.

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vc_selection::{validation_curve, Estimator, Scoring, ValidationCurveConfig};
use vc_types::{CurveSummary, DataError, ParamRange, ScoreMatrix, VcResult};

use crate::color::Rgb;
use crate::figure::{Figure, LegendLocation, XAxis, XScale};

/// Y axis limits of every validation curve figure.
pub const Y_LIMITS: (f64, f64) = (0.0, 1.1);

/// Visual settings of a validation curve figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    pub train_color: Rgb,
    pub test_color: Rgb,
    pub train_label: String,
    pub test_label: String,
    /// Opacity of the ±1 std bands.
    pub band_alpha: f64,
    pub legend_location: LegendLocation,
    /// Ignored when the parameter values are not numeric.
    pub x_scale: XScale,
    pub size: (u32, u32),
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            train_color: Rgb::DARK_ORANGE,
            test_color: Rgb::NAVY,
            train_label: "Training score".to_string(),
            test_label: "Cross-validation score".to_string(),
            band_alpha: 0.2,
            legend_location: LegendLocation::Best,
            x_scale: XScale::Linear,
            size: (640, 480),
        }
    }
}

impl PlotStyle {
    pub fn with_x_scale(mut self, x_scale: XScale) -> Self {
        self.x_scale = x_scale;
        self
    }

    pub fn with_colors(mut self, train: Rgb, test: Rgb) -> Self {
        self.train_color = train;
        self.test_color = test;
        self
    }

    pub fn with_legend_location(mut self, location: LegendLocation) -> Self {
        self.legend_location = location;
        self
    }
}

/// Builds validation curve figures with a fixed style and sweep configuration.
#[derive(Debug, Clone)]
pub struct ValidationCurvePlotter {
    style: PlotStyle,
    config: ValidationCurveConfig,
}

impl Default for ValidationCurvePlotter {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationCurvePlotter {
    pub fn new() -> Self {
        Self {
            style: PlotStyle::default(),
            config: ValidationCurveConfig::new(),
        }
    }

    pub fn with_style(mut self, style: PlotStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_config(mut self, config: ValidationCurveConfig) -> Self {
        self.config = config;
        self
    }

    pub fn style(&self) -> &PlotStyle {
        &self.style
    }

    pub fn config(&self) -> &ValidationCurveConfig {
        &self.config
    }

    /// Sweep `param_name` over `param_range` and draw the resulting curves.
    pub fn plot<E: Estimator>(
        &self,
        estimator: &E,
        param_name: &str,
        param_range: &ParamRange,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        title: &str,
    ) -> VcResult<Figure> {
        let (train, test) = validation_curve(estimator, x, y, param_name, param_range, &self.config)?;
        self.plot_scores(param_name, param_range, &train, &test, title)
    }

    /// Draw curves from score matrices that were computed elsewhere.
    ///
    /// Both matrices must have one row per value in `param_range` and the
    /// same number of folds.
    pub fn plot_scores(
        &self,
        param_name: &str,
        param_range: &ParamRange,
        train: &ScoreMatrix,
        test: &ScoreMatrix,
        title: &str,
    ) -> VcResult<Figure> {
        if train.shape() != test.shape() {
            return Err(DataError::InvalidScores {
                message: format!(
                    "training scores are {:?} but validation scores are {:?}",
                    train.shape(),
                    test.shape()
                ),
            }
            .into());
        }
        if train.n_candidates() != param_range.len() {
            return Err(DataError::InvalidScores {
                message: format!(
                    "{} score rows for {} parameter values",
                    train.n_candidates(),
                    param_range.len()
                ),
            }
            .into());
        }

        let train_summary = train.summarize();
        let test_summary = test.summarize();

        let (x_axis, xs) = match param_range.to_f64_vec() {
            Some(values) => (
                XAxis::Numeric {
                    scale: self.style.x_scale,
                },
                values,
            ),
            None => (
                XAxis::Categorical {
                    labels: param_range.labels(),
                },
                (0..param_range.len()).map(|i| i as f64).collect(),
            ),
        };

        let mut figure = Figure::new(title)
            .with_labels(param_name, "Score")
            .with_y_limits(Y_LIMITS.0, Y_LIMITS.1)
            .with_x_axis(x_axis)
            .with_size(self.style.size.0, self.style.size.1)
            .with_legend(self.style.legend_location);

        self.draw_curve(
            &mut figure,
            &self.style.train_label,
            self.style.train_color,
            &xs,
            &train_summary,
        )?;
        self.draw_curve(
            &mut figure,
            &self.style.test_label,
            self.style.test_color,
            &xs,
            &test_summary,
        )?;
        figure.validate()?;

        if let Some(best) = test_summary.best_index() {
            info!(
                "Best {}={} with cross-validation score {:.4} ± {:.4}",
                param_name,
                param_range.values()[best],
                test_summary.mean[best],
                test_summary.std[best]
            );
        }
        Ok(figure)
    }

    fn draw_curve(
        &self,
        figure: &mut Figure,
        label: &str,
        color: Rgb,
        xs: &[f64],
        summary: &CurveSummary,
    ) -> VcResult<()> {
        debug!("{} means: {:?}", label, summary.mean);
        figure.add_band(color, self.style.band_alpha, xs, &summary.lower(), &summary.upper())?;
        figure.add_line(Some(label), color, xs, &summary.mean)?;
        Ok(())
    }
}

/// Plot training and cross-validation scores of `estimator` as `param_name`
/// sweeps `param_range`.
///
/// Each curve is the mean score across `cv` folds, shaded by ±1 standard
/// deviation. The figure is returned unrendered.
#[allow(clippy::too_many_arguments)]
pub fn plot_validation_curve<E: Estimator>(
    estimator: &E,
    param_name: &str,
    param_range: &ParamRange,
    x: ArrayView2<'_, f64>,
    y: ArrayView1<'_, f64>,
    title: &str,
    cv: usize,
    scoring: Option<Scoring>,
) -> VcResult<Figure> {
    let config = ValidationCurveConfig::new()
        .with_folds(cv)
        .with_scoring(scoring)
        .with_n_jobs(1);
    ValidationCurvePlotter::new()
        .with_config(config)
        .plot(estimator, param_name, param_range, x, y, title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc_types::VcError;

    fn matrix(rows: &[[f64; 3]]) -> ScoreMatrix {
        ScoreMatrix::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn default_style_matches_classic_look() {
        let style = PlotStyle::default();
        assert_eq!(style.train_color, Rgb::DARK_ORANGE);
        assert_eq!(style.test_color, Rgb::NAVY);
        assert_eq!(style.band_alpha, 0.2);
        assert_eq!(style.legend_location, LegendLocation::Best);
    }

    #[test]
    fn style_deserializes_partial_json() {
        let style: PlotStyle = serde_json::from_str(r#"{"x_scale": "log", "test_color": "crimson"}"#).unwrap();
        assert_eq!(style.x_scale, XScale::Log);
        assert_eq!(style.test_color, Rgb::new(220, 20, 60));
        assert_eq!(style.train_label, "Training score");
    }

    #[test]
    fn plot_scores_builds_bands_and_lines() {
        let range = ParamRange::from_numbers([1, 2]).unwrap();
        let train = matrix(&[[0.9, 1.0, 0.8], [1.0, 1.0, 1.0]]);
        let test = matrix(&[[0.6, 0.7, 0.8], [0.5, 0.5, 0.5]]);

        let figure = ValidationCurvePlotter::new()
            .plot_scores("n_neighbors", &range, &train, &test, "KNN")
            .unwrap();

        assert_eq!(figure.x_label, "n_neighbors");
        assert_eq!(figure.y_label, "Score");
        assert_eq!(figure.y_limits, (0.0, 1.1));
        assert_eq!(figure.legend_labels(), vec!["Training score", "Cross-validation score"]);

        let test_line = &figure.lines[1];
        assert_eq!(test_line.points.len(), 2);
        assert!((test_line.points[0].1 - 0.7).abs() < 1e-12);
        assert_eq!(test_line.points[1], (2.0, 0.5));

        let train_band = &figure.bands[0];
        assert_eq!(train_band.alpha, 0.2);
        assert_eq!(train_band.color, Rgb::DARK_ORANGE);
        assert_eq!(train_band.lower[1], train_band.upper[1]);
    }

    #[test]
    fn text_values_use_categorical_axis() {
        let range = ParamRange::from_values(["uniform", "distance"]).unwrap();
        let scores = matrix(&[[0.5, 0.5, 0.5], [0.6, 0.6, 0.6]]);
        let figure = ValidationCurvePlotter::new()
            .plot_scores("weights", &range, &scores, &scores, "weights")
            .unwrap();

        assert_eq!(
            figure.x_axis,
            XAxis::Categorical {
                labels: vec!["uniform".into(), "distance".into()]
            }
        );
        assert_eq!(figure.lines[0].points[1].0, 1.0);
    }

    #[test]
    fn mismatched_matrices_are_rejected() {
        let range = ParamRange::from_numbers([1, 2]).unwrap();
        let train = matrix(&[[0.9, 1.0, 0.8], [1.0, 1.0, 1.0]]);
        let short = matrix(&[[0.6, 0.7, 0.8]]);

        let err = ValidationCurvePlotter::new()
            .plot_scores("k", &range, &train, &short, "t")
            .unwrap_err();
        assert!(matches!(err, VcError::Data(DataError::InvalidScores { .. })));

        let single = ParamRange::from_numbers([1]).unwrap();
        let err = ValidationCurvePlotter::new()
            .plot_scores("k", &single, &train, &train, "t")
            .unwrap_err();
        assert!(matches!(err, VcError::Data(DataError::InvalidScores { .. })));
    }

    #[test]
    fn log_scale_rejects_non_positive_values() {
        let range = ParamRange::from_numbers([0.0, 1.0]).unwrap();
        let scores = matrix(&[[0.5, 0.5, 0.5], [0.6, 0.6, 0.6]]);
        let plotter =
            ValidationCurvePlotter::new().with_style(PlotStyle::default().with_x_scale(XScale::Log));
        assert!(plotter.plot_scores("alpha", &range, &scores, &scores, "t").is_err());
    }
}
