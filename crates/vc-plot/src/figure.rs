//! In-memory figure model.
//!
//! A [`Figure`] records everything needed to draw a validation curve: axes,
//! lines, shaded bands and the legend. Building one has no side effects;
//! rendering lives in [`crate::render`].

use serde::{Deserialize, Serialize};
use vc_types::{PlotError, VcResult};

use crate::color::Rgb;

/// Fraction of the data span left empty on each side of a numeric x axis.
const X_MARGIN: f64 = 0.05;

/// Scale of a numeric x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XScale {
    Linear,
    /// Base-10 logarithmic; every x value must be positive.
    Log,
}

impl Default for XScale {
    fn default() -> Self {
        Self::Linear
    }
}

/// Horizontal axis layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XAxis {
    Numeric { scale: XScale },
    /// Values plotted at positions `0..labels.len()` and labelled by name.
    Categorical { labels: Vec<String> },
}

impl Default for XAxis {
    fn default() -> Self {
        Self::Numeric {
            scale: XScale::Linear,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub label: Option<String>,
    pub color: Rgb,
    pub points: Vec<(f64, f64)>,
}

/// Filled region between `lower` and `upper` over `x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub color: Rgb,
    pub alpha: f64,
    pub x: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Where the legend box sits inside the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendLocation {
    /// Pick the location that overlaps the least data.
    Best,
    UpperRight,
    UpperLeft,
    LowerLeft,
    LowerRight,
    Right,
    CenterLeft,
    CenterRight,
    LowerCenter,
    UpperCenter,
    Center,
}

impl Default for LegendLocation {
    fn default() -> Self {
        Self::Best
    }
}

impl LegendLocation {
    /// Candidates tried by [`LegendLocation::Best`], in preference order.
    pub const CANDIDATES: [LegendLocation; 10] = [
        Self::UpperRight,
        Self::UpperLeft,
        Self::LowerLeft,
        Self::LowerRight,
        Self::Right,
        Self::CenterLeft,
        Self::CenterRight,
        Self::LowerCenter,
        Self::UpperCenter,
        Self::Center,
    ];

    /// Legend box as `(x0, y0, x1, y1)` in axes fractions (origin bottom-left).
    fn bbox(self) -> (f64, f64, f64, f64) {
        const W: f64 = 0.42;
        const H: f64 = 0.16;
        const PAD: f64 = 0.02;

        let left = PAD;
        let right = 1.0 - PAD - W;
        let h_center = 0.5 - W / 2.0;
        let bottom = PAD;
        let top = 1.0 - PAD - H;
        let v_center = 0.5 - H / 2.0;

        let (x0, y0) = match self {
            Self::UpperRight | Self::Best => (right, top),
            Self::UpperLeft => (left, top),
            Self::LowerLeft => (left, bottom),
            Self::LowerRight => (right, bottom),
            Self::Right | Self::CenterRight => (right, v_center),
            Self::CenterLeft => (left, v_center),
            Self::LowerCenter => (h_center, bottom),
            Self::UpperCenter => (h_center, top),
            Self::Center => (h_center, v_center),
        };
        (x0, y0, x0 + W, y0 + H)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub location: LegendLocation,
}

/// A complete plot description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub y_limits: (f64, f64),
    pub x_axis: XAxis,
    pub lines: Vec<Line>,
    pub bands: Vec<Band>,
    pub legend: Option<Legend>,
    /// Pixel size `(width, height)` used when rendering.
    pub size: (u32, u32),
}

impl Figure {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            y_limits: (0.0, 1.0),
            x_axis: XAxis::default(),
            lines: Vec::new(),
            bands: Vec::new(),
            legend: None,
            size: (640, 480),
        }
    }

    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn with_y_limits(mut self, low: f64, high: f64) -> Self {
        self.y_limits = (low, high);
        self
    }

    pub fn with_x_axis(mut self, x_axis: XAxis) -> Self {
        self.x_axis = x_axis;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_legend(mut self, location: LegendLocation) -> Self {
        self.legend = Some(Legend { location });
        self
    }

    pub fn add_line(
        &mut self,
        label: Option<&str>,
        color: Rgb,
        x: &[f64],
        y: &[f64],
    ) -> VcResult<&mut Self> {
        check_len("line", x.len(), y.len())?;
        self.lines.push(Line {
            label: label.map(str::to_string),
            color,
            points: x.iter().copied().zip(y.iter().copied()).collect(),
        });
        Ok(self)
    }

    pub fn add_band(
        &mut self,
        color: Rgb,
        alpha: f64,
        x: &[f64],
        lower: &[f64],
        upper: &[f64],
    ) -> VcResult<&mut Self> {
        check_len("band lower edge", x.len(), lower.len())?;
        check_len("band upper edge", x.len(), upper.len())?;
        if !(0.0..=1.0).contains(&alpha) {
            return Err(vc_types::validation_error!("alpha must lie in [0, 1], got {}", alpha));
        }
        self.bands.push(Band {
            color,
            alpha,
            x: x.to_vec(),
            lower: lower.to_vec(),
            upper: upper.to_vec(),
        });
        Ok(self)
    }

    /// Labels of every line that shows up in the legend, in draw order.
    pub fn legend_labels(&self) -> Vec<&str> {
        self.lines.iter().filter_map(|l| l.label.as_deref()).collect()
    }

    /// Check the axes can represent every plotted point.
    pub fn validate(&self) -> VcResult<()> {
        for band in &self.bands {
            check_len("band lower edge", band.x.len(), band.lower.len())?;
            check_len("band upper edge", band.x.len(), band.upper.len())?;
        }
        let (low, high) = self.y_limits;
        if !(low.is_finite() && high.is_finite() && low < high) {
            return Err(invalid_axis(format!("y limits ({low}, {high}) are not an increasing range")));
        }
        match &self.x_axis {
            XAxis::Numeric { scale: XScale::Log } => {
                if let Some(x) = self.x_values().find(|x| *x <= 0.0) {
                    return Err(invalid_axis(format!(
                        "log scale requires positive x values, found {x}"
                    )));
                }
            }
            XAxis::Categorical { labels } => {
                let n = labels.len() as f64;
                if let Some(x) = self.x_values().find(|x| *x < 0.0 || *x >= n) {
                    return Err(invalid_axis(format!(
                        "categorical position {x} outside 0..{n}"
                    )));
                }
            }
            XAxis::Numeric { .. } => {}
        }
        Ok(())
    }

    fn x_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.lines
            .iter()
            .flat_map(|l| l.points.iter().map(|p| p.0))
            .chain(self.bands.iter().flat_map(|b| b.x.iter().copied()))
    }

    /// Map an x data value onto the drawing coordinate (log10 on log axes).
    pub(crate) fn x_coord(&self, x: f64) -> f64 {
        match self.x_axis {
            XAxis::Numeric { scale: XScale::Log } => x.log10(),
            _ => x,
        }
    }

    /// Drawing-coordinate extent of the x axis.
    pub(crate) fn x_extent(&self) -> (f64, f64) {
        if let XAxis::Categorical { labels } = &self.x_axis {
            return (-0.5, labels.len().max(1) as f64 - 0.5);
        }
        let (min, max) = self
            .x_values()
            .map(|x| self.x_coord(x))
            .filter(|x| x.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                (lo.min(x), hi.max(x))
            });
        if !min.is_finite() {
            return (0.0, 1.0);
        }
        if min == max {
            // single point: centre it
            return (min - 0.5, max + 0.5);
        }
        let margin = (max - min) * X_MARGIN;
        (min - margin, max + margin)
    }

    /// Every plotted point in axes fractions (`[0, 1]` inside the plot area).
    fn normalized_points(&self) -> Vec<(f64, f64)> {
        let (x_lo, x_hi) = self.x_extent();
        let (y_lo, y_hi) = self.y_limits;
        let norm = |x: f64, y: f64| {
            (
                (self.x_coord(x) - x_lo) / (x_hi - x_lo),
                (y - y_lo) / (y_hi - y_lo),
            )
        };

        let mut points: Vec<(f64, f64)> = self
            .lines
            .iter()
            .flat_map(|l| l.points.iter().map(|&(x, y)| norm(x, y)))
            .collect();
        for band in &self.bands {
            for ((&x, &low), &high) in band.x.iter().zip(&band.lower).zip(&band.upper) {
                points.push(norm(x, low));
                points.push(norm(x, high));
            }
        }
        points
    }

    /// Concrete legend location, resolving [`LegendLocation::Best`] to the
    /// first candidate whose box covers the fewest data points.
    pub fn resolved_legend_location(&self) -> Option<LegendLocation> {
        let legend = self.legend.as_ref()?;
        if legend.location != LegendLocation::Best {
            return Some(legend.location);
        }

        let points = self.normalized_points();
        let overlap = |location: LegendLocation| {
            let (x0, y0, x1, y1) = location.bbox();
            points
                .iter()
                .filter(|(x, y)| *x >= x0 && *x <= x1 && *y >= y0 && *y <= y1)
                .count()
        };

        let mut best = LegendLocation::CANDIDATES[0];
        let mut best_overlap = usize::MAX;
        for location in LegendLocation::CANDIDATES {
            let count = overlap(location);
            if count < best_overlap {
                best = location;
                best_overlap = count;
            }
            if count == 0 {
                break;
            }
        }
        Some(best)
    }

    /// Serialize the figure description.
    pub fn to_json(&self) -> VcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn check_len(series: &str, expected: usize, actual: usize) -> VcResult<()> {
    if expected != actual {
        return Err(PlotError::SeriesLength {
            series: series.to_string(),
            expected,
            actual,
        }
        .into());
    }
    Ok(())
}

fn invalid_axis(message: String) -> vc_types::VcError {
    PlotError::InvalidAxis { message }.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc_types::VcError;

    fn figure_with_line(y: &[f64]) -> Figure {
        let x: Vec<f64> = (0..y.len()).map(|i| i as f64).collect();
        let mut figure = Figure::new("t")
            .with_y_limits(0.0, 1.1)
            .with_legend(LegendLocation::Best);
        figure.add_line(Some("a"), Rgb::NAVY, &x, y).unwrap();
        figure
    }

    #[test]
    fn best_prefers_upper_right_when_empty() {
        let figure = figure_with_line(&[0.1, 0.1, 0.1, 0.1]);
        assert_eq!(
            figure.resolved_legend_location(),
            Some(LegendLocation::UpperRight)
        );
    }

    #[test]
    fn best_avoids_crowded_corner() {
        // high scores everywhere: every upper location is covered
        let figure = figure_with_line(&[1.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(
            figure.resolved_legend_location(),
            Some(LegendLocation::LowerLeft)
        );

        // rising curve: top right is busy, top left is clear
        let rising = figure_with_line(&[0.1, 0.3, 0.6, 0.95, 1.05]);
        assert_eq!(
            rising.resolved_legend_location(),
            Some(LegendLocation::UpperLeft)
        );
    }

    #[test]
    fn explicit_location_is_kept() {
        let figure = figure_with_line(&[1.0, 1.0]).with_legend(LegendLocation::Center);
        assert_eq!(figure.resolved_legend_location(), Some(LegendLocation::Center));
        assert_eq!(Figure::new("none").resolved_legend_location(), None);
    }

    #[test]
    fn mismatched_series_are_rejected() {
        let mut figure = Figure::new("t");
        let result = figure.add_line(None, Rgb::NAVY, &[1.0, 2.0], &[1.0]);
        assert!(matches!(
            result,
            Err(VcError::Plot(PlotError::SeriesLength {
                expected: 2,
                actual: 1,
                ..
            }))
        ));
        assert!(figure
            .add_band(Rgb::NAVY, 1.5, &[1.0], &[0.0], &[1.0])
            .is_err());
    }

    #[test]
    fn short_band_edge_from_json_is_rejected() {
        let mut figure = figure_with_line(&[0.2, 0.4]);
        figure
            .add_band(Rgb::NAVY, 0.2, &[0.0, 1.0], &[0.1, 0.3], &[0.3, 0.5])
            .unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&figure.to_json().unwrap()).unwrap();
        value["bands"][0]["lower"] = serde_json::json!([]);
        let loaded: Figure = serde_json::from_value(value).unwrap();

        assert!(matches!(
            loaded.validate(),
            Err(VcError::Plot(PlotError::SeriesLength {
                expected: 2,
                actual: 0,
                ..
            }))
        ));
        assert!(loaded.render_svg().is_err());
        assert_eq!(
            loaded.resolved_legend_location(),
            Some(LegendLocation::UpperRight)
        );
    }

    #[test]
    fn log_axis_requires_positive_x() {
        let mut figure = Figure::new("t").with_x_axis(XAxis::Numeric {
            scale: XScale::Log,
        });
        figure
            .add_line(None, Rgb::NAVY, &[0.0, 1.0], &[0.5, 0.5])
            .unwrap();
        assert!(matches!(
            figure.validate(),
            Err(VcError::Plot(PlotError::InvalidAxis { .. }))
        ));
    }

    #[test]
    fn single_point_extent_is_padded() {
        let figure = figure_with_line(&[0.4]);
        assert_eq!(figure.x_extent(), (-0.5, 0.5));
    }

    #[test]
    fn log_extent_uses_decades() {
        let mut figure = Figure::new("t").with_x_axis(XAxis::Numeric {
            scale: XScale::Log,
        });
        figure
            .add_line(None, Rgb::NAVY, &[0.001, 10.0], &[0.5, 0.5])
            .unwrap();
        let (lo, hi) = figure.x_extent();
        // four decades plus a 5% margin on each side
        assert!((lo + 3.2).abs() < 1e-9);
        assert!((hi - 1.2).abs() < 1e-9);
    }

    #[test]
    fn json_export_contains_series() {
        let figure = figure_with_line(&[0.2, 0.4]);
        let json = figure.to_json().unwrap();
        assert!(json.contains("\"title\": \"t\""));
        assert!(json.contains("\"best\""));
        let parsed: Figure = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, figure);
    }
}
