//! SVG rendering of a [`Figure`] with `plotters`.

use std::path::Path;

use plotters::prelude::*;
use tracing::{debug, info};
use vc_types::{PlotError, VcError, VcResult};

use crate::figure::{Figure, LegendLocation, XAxis, XScale};

fn backend_error<E: std::fmt::Display>(e: E) -> VcError {
    PlotError::Backend {
        message: e.to_string(),
    }
    .into()
}

fn label_position(location: LegendLocation) -> SeriesLabelPosition {
    match location {
        LegendLocation::UpperRight | LegendLocation::Best => SeriesLabelPosition::UpperRight,
        LegendLocation::UpperLeft => SeriesLabelPosition::UpperLeft,
        LegendLocation::LowerLeft => SeriesLabelPosition::LowerLeft,
        LegendLocation::LowerRight => SeriesLabelPosition::LowerRight,
        LegendLocation::Right | LegendLocation::CenterRight => SeriesLabelPosition::MiddleRight,
        LegendLocation::CenterLeft => SeriesLabelPosition::MiddleLeft,
        LegendLocation::LowerCenter => SeriesLabelPosition::LowerMiddle,
        LegendLocation::UpperCenter => SeriesLabelPosition::UpperMiddle,
        LegendLocation::Center => SeriesLabelPosition::MiddleMiddle,
    }
}

/// Short tick text: three decimals with trailing zeros dropped, scientific
/// notation for tiny magnitudes.
fn format_number(value: f64) -> String {
    if value != 0.0 && value.abs() < 1e-3 {
        return format!("{value:.0e}");
    }
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

impl Figure {
    /// Tick text for a drawing-space x coordinate.
    fn format_x_tick(&self, coord: f64) -> String {
        match &self.x_axis {
            XAxis::Numeric { scale: XScale::Log } => format_number(10f64.powf(coord)),
            XAxis::Numeric { .. } => format_number(coord),
            XAxis::Categorical { labels } => {
                let nearest = coord.round();
                if (coord - nearest).abs() < 1e-6 && nearest >= 0.0 {
                    labels.get(nearest as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            }
        }
    }

    /// Draw the figure into an SVG document.
    pub fn render_svg(&self) -> VcResult<String> {
        self.validate()?;

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, self.size).into_drawing_area();
            root.fill(&WHITE).map_err(backend_error)?;

            let (x_lo, x_hi) = self.x_extent();
            let (y_lo, y_hi) = self.y_limits;
            let mut chart = ChartBuilder::on(&root)
                .caption(&self.title, ("sans-serif", 22))
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(50)
                .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
                .map_err(backend_error)?;

            let x_formatter = |v: &f64| self.format_x_tick(*v);
            let mut mesh = chart.configure_mesh();
            mesh.x_desc(self.x_label.as_str())
                .y_desc(self.y_label.as_str())
                .x_label_formatter(&x_formatter);
            if let XAxis::Categorical { labels } = &self.x_axis {
                mesh.x_labels(labels.len() * 2 + 1);
            }
            mesh.draw().map_err(backend_error)?;

            // bands first so the mean curves stay visible on top
            for band in &self.bands {
                let upper = band
                    .x
                    .iter()
                    .zip(&band.upper)
                    .map(|(x, y)| (self.x_coord(*x), *y));
                let lower = band
                    .x
                    .iter()
                    .zip(&band.lower)
                    .rev()
                    .map(|(x, y)| (self.x_coord(*x), *y));
                let outline: Vec<(f64, f64)> = upper.chain(lower).collect();
                let style = band.color.to_plotters().mix(band.alpha).filled();
                chart
                    .draw_series(std::iter::once(Polygon::new(outline, style)))
                    .map_err(backend_error)?;
            }

            for line in &self.lines {
                let color = line.color.to_plotters();
                let points: Vec<(f64, f64)> = line
                    .points
                    .iter()
                    .map(|(x, y)| (self.x_coord(*x), *y))
                    .collect();
                let series = chart
                    .draw_series(LineSeries::new(points, color.stroke_width(2)))
                    .map_err(backend_error)?;
                if let Some(label) = &line.label {
                    series
                        .label(label.as_str())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                }
            }

            if let Some(location) = self.resolved_legend_location() {
                debug!("Legend placed at {:?}", location);
                chart
                    .configure_series_labels()
                    .position(label_position(location))
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .draw()
                    .map_err(backend_error)?;
            }

            root.present().map_err(backend_error)?;
        }

        Ok(svg)
    }

    /// Render and write the SVG to `path`.
    pub fn save_svg(&self, path: impl AsRef<Path>) -> VcResult<()> {
        let path = path.as_ref();
        let svg = self.render_svg()?;
        std::fs::write(path, svg)?;
        info!("Saved figure '{}' to {}", self.title, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn categorical_ticks_use_labels() {
        let figure = Figure::new("t").with_x_axis(XAxis::Categorical {
            labels: vec!["uniform".into(), "distance".into()],
        });
        assert_eq!(figure.format_x_tick(1.0), "distance");
        assert_eq!(figure.format_x_tick(0.5), "");
        assert_eq!(figure.format_x_tick(7.0), "");
    }

    #[test]
    fn log_ticks_show_data_values() {
        let figure = Figure::new("t").with_x_axis(XAxis::Numeric {
            scale: XScale::Log,
        });
        assert_eq!(figure.format_x_tick(2.0), "100");
        assert_eq!(figure.format_x_tick(-2.0), "0.01");
    }

    #[test]
    fn numbers_are_trimmed() {
        assert_eq!(format_number(0.30000000000000004), "0.3");
        assert_eq!(format_number(12.0), "12");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.0001), "1e-4");
    }

    #[test]
    fn renders_svg_with_title_and_legend() {
        let mut figure = Figure::new("Validation Curve")
            .with_labels("gamma", "Score")
            .with_y_limits(0.0, 1.1)
            .with_legend(LegendLocation::Best);
        let x = [1.0, 2.0, 3.0];
        figure
            .add_band(Rgb::NAVY, 0.2, &x, &[0.4, 0.5, 0.6], &[0.6, 0.7, 0.8])
            .unwrap();
        figure
            .add_line(Some("Cross-validation score"), Rgb::NAVY, &x, &[0.5, 0.6, 0.7])
            .unwrap();

        let svg = figure.render_svg().unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Validation Curve"));
        assert!(svg.contains("Cross-validation score"));
        assert!(svg.contains("<polygon"));
    }

    #[test]
    fn invalid_axis_prevents_rendering() {
        let mut figure = Figure::new("t").with_x_axis(XAxis::Numeric {
            scale: XScale::Log,
        });
        figure
            .add_line(None, Rgb::NAVY, &[-1.0, 1.0], &[0.5, 0.5])
            .unwrap();
        assert!(matches!(
            figure.render_svg(),
            Err(VcError::Plot(PlotError::InvalidAxis { .. }))
        ));
    }
}
