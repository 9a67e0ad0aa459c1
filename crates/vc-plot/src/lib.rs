//! # vc-plot
//!
//! Validation curve figures for valcurve.
//!
//! [`plot_validation_curve`] runs a cross-validated sweep of one
//! hyperparameter and returns a [`Figure`] with the mean training and
//! cross-validation scores, each shaded by ±1 standard deviation. Figures are
//! plain data until [`Figure::render_svg`] or [`Figure::save_svg`] draws them.

pub mod color;
pub mod figure;
pub mod plotter;
mod render;

pub use color::Rgb;
pub use figure::{Band, Figure, Legend, LegendLocation, Line, XAxis, XScale};
pub use plotter::{plot_validation_curve, PlotStyle, ValidationCurvePlotter, Y_LIMITS};
