use std::io::Cursor;

use image::ImageFormat;

use crate::color::PlotTheme;
use crate::data::model::{Dataset, ModelCoefficients};
use crate::error::{DataError, Result};
use crate::predictor::{LinearPredictor, mean_squared_error};

pub mod canvas;
pub mod font;

use canvas::Canvas;

pub const WIDTH: u32 = 1000;
pub const HEIGHT: u32 = 600;

const MARGIN_LEFT: i64 = 90;
const MARGIN_RIGHT: i64 = 30;
const MARGIN_TOP: i64 = 60;
const MARGIN_BOTTOM: i64 = 70;
const TICKS: usize = 5;

// ---------------------------------------------------------------------------
// PlotArtifact
// ---------------------------------------------------------------------------

/// A rendered regression plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotArtifact {
    /// Title drawn at the top of the image, including the error metric.
    pub title: String,
    /// PNG-encoded image.
    pub png: Vec<u8>,
}

/// Title for a plot whose predictions have mean squared error `mse`.
pub fn plot_title(mse: f64) -> String {
    format!("Linear Regression for Stars Data (MSE: {mse:.1})")
}

// ---------------------------------------------------------------------------
// Axis mapping
// ---------------------------------------------------------------------------

/// Linear map from a data interval onto a pixel interval.
#[derive(Debug, Clone, Copy)]
struct Axis {
    lo: f64,
    hi: f64,
    px_lo: i64,
    px_hi: i64,
}

impl Axis {
    /// Build an axis over `(min, max)`, padded by 5% so markers do not sit
    /// on the frame. A zero-width range is widened to ±1.
    fn padded((min, max): (f64, f64), px_lo: i64, px_hi: i64) -> Self {
        let span = max - min;
        let (lo, hi) = if !span.is_finite() || span.abs() < f64::EPSILON {
            let mid = if min.is_finite() { min } else { 0.0 };
            (mid - 1.0, mid + 1.0)
        } else {
            (min - span * 0.05, max + span * 0.05)
        };
        Self { lo, hi, px_lo, px_hi }
    }

    /// Pixel coordinate of `v`, clamped to a band around the canvas so
    /// extreme values stay drawable.
    fn to_px(&self, v: f64) -> i64 {
        let t = (v - self.lo) / (self.hi - self.lo);
        let px = self.px_lo as f64 + t * (self.px_hi - self.px_lo) as f64;
        if px.is_nan() {
            return self.px_lo;
        }
        let limit = (WIDTH.max(HEIGHT) * 2) as f64;
        px.clamp(-limit, limit) as i64
    }

    fn ticks(&self) -> impl Iterator<Item = f64> + '_ {
        (0..TICKS).map(move |i| self.lo + (self.hi - self.lo) * i as f64 / (TICKS - 1) as f64)
    }

    fn label(&self, v: f64) -> String {
        if (self.hi - self.lo).abs() >= 10.0 {
            format!("{v:.0}")
        } else {
            format!("{v:.1}")
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render the regression plot with the default theme.
pub fn render(dataset: &Dataset, coefficients: ModelCoefficients) -> Result<PlotArtifact> {
    render_with_theme(dataset, coefficients, &PlotTheme::default())
}

/// Draw true sizes as "x" markers, the model as a line across the observed
/// brightness range, and the mean squared error in the title.
///
/// Predictions already present on `dataset` are ignored; the model is
/// re-applied so the plot always matches `coefficients`.
pub fn render_with_theme(
    dataset: &Dataset,
    coefficients: ModelCoefficients,
    theme: &PlotTheme,
) -> Result<PlotArtifact> {
    let predictor = LinearPredictor::new(coefficients);
    let mut annotated = dataset.clone();
    predictor.annotate(&mut annotated);

    let (x_range, y_range, mse) = match (
        annotated.brightness_range(),
        annotated.size_range(),
        mean_squared_error(&annotated),
    ) {
        (Some(x), Some(y), Some(mse)) => (x, y, mse),
        _ => return Err(DataError::schema("dataset has no rows to plot")),
    };
    let title = plot_title(mse);

    let left = MARGIN_LEFT;
    let right = WIDTH as i64 - MARGIN_RIGHT;
    let top = MARGIN_TOP;
    let bottom = HEIGHT as i64 - MARGIN_BOTTOM;
    let x_axis = Axis::padded(x_range, left, right);
    let y_axis = Axis::padded(y_range, bottom, top);

    let mut canvas = Canvas::new(WIDTH, HEIGHT, theme.background);

    // ---- Grid and tick labels ----
    for v in x_axis.ticks() {
        let px = x_axis.to_px(v);
        canvas.line(px, top, px, bottom, theme.grid);
        canvas.line(px, bottom, px, bottom + 5, theme.frame);
        canvas.text_centered(px, bottom + 10, &x_axis.label(v), 1, theme.frame);
    }
    for v in y_axis.ticks() {
        let py = y_axis.to_px(v);
        canvas.line(left, py, right, py, theme.grid);
        canvas.line(left - 5, py, left, py, theme.frame);
        let label = y_axis.label(v);
        let w = font::text_width(&label, 1) as i64;
        canvas.text(left - 10 - w, py - 3, &label, 1, theme.frame);
    }
    canvas.stroke_rect(left, top, (right - left + 1) as u32, (bottom - top + 1) as u32, theme.frame);

    // ---- Actual targets ----
    for obs in &annotated.observations {
        canvas.cross(
            x_axis.to_px(obs.brightness),
            y_axis.to_px(obs.true_size),
            4,
            theme.markers,
        );
    }

    // ---- Predictions line ----
    let (x_min, x_max) = x_range;
    canvas.thick_line(
        x_axis.to_px(x_min),
        y_axis.to_px(predictor.predict(x_min)),
        x_axis.to_px(x_max),
        y_axis.to_px(predictor.predict(x_max)),
        2,
        theme.line,
    );

    // ---- Title, axis labels, legend ----
    canvas.text_centered(WIDTH as i64 / 2, 20, &title, 3, theme.title);
    canvas.text_centered((left + right) / 2, HEIGHT as i64 - 35, "Brightness", 2, theme.labels);
    canvas.text_vertical(20, (top + bottom) / 2, "Size", 2, theme.labels);
    draw_legend(&mut canvas, left + 15, top + 15, theme);

    let mut png = Vec::new();
    canvas
        .into_image()
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    Ok(PlotArtifact { title, png })
}

fn draw_legend(canvas: &mut Canvas, x: i64, y: i64, theme: &PlotTheme) {
    const LABEL_TARGETS: &str = "Actual Targets";
    const LABEL_PREDICTIONS: &str = "Predictions";

    let text_w = font::text_width(LABEL_TARGETS, 2) as i64;
    let w = (text_w + 60) as u32;
    let h = 60;
    canvas.fill_rect(x, y, w, h, theme.background);
    canvas.stroke_rect(x, y, w, h, theme.grid);

    canvas.cross(x + 20, y + 17, 4, theme.markers);
    canvas.text(x + 40, y + 10, LABEL_TARGETS, 2, theme.frame);

    canvas.thick_line(x + 8, y + 43, x + 32, y + 43, 2, theme.line);
    canvas.text(x + 40, y + 36, LABEL_PREDICTIONS, 2, theme.frame);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Observation;

    fn sample() -> Dataset {
        Dataset::from_observations(vec![
            Observation::new(10.0, 30.0),
            Observation::new(20.0, 50.0),
            Observation::new(55.0, 110.0),
        ])
    }

    #[test]
    fn title_rounds_to_one_decimal() {
        assert_eq!(plot_title(2.04), "Linear Regression for Stars Data (MSE: 2.0)");
        assert_eq!(plot_title(102.46), "Linear Regression for Stars Data (MSE: 102.5)");
    }

    #[test]
    fn renders_png_with_metric() {
        let coefficients = ModelCoefficients::new(2.0, 10.0);
        let artifact = render(&sample(), coefficients).unwrap();

        // residuals: 0, 0, 10 -> mse 33.3
        assert_eq!(artifact.title, plot_title(100.0 / 3.0));
        assert!(artifact.title.contains("MSE: 33.3"));
        assert_eq!(&artifact.png[..8], b"\x89PNG\r\n\x1a\n");

        let img = image::load_from_memory_with_format(&artifact.png, ImageFormat::Png)
            .unwrap()
            .to_rgb8();
        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));

        let theme = PlotTheme::default();
        assert!(img.pixels().any(|p| *p == theme.markers));
        assert!(img.pixels().any(|p| *p == theme.title));
    }

    #[test]
    fn single_point_renders() {
        let ds = Dataset::from_observations(vec![Observation::new(5.0, 5.0)]);
        let artifact = render(&ds, ModelCoefficients::default()).unwrap();
        assert!(!artifact.png.is_empty());
    }

    #[test]
    fn empty_dataset_is_schema_error() {
        let err = render(&Dataset::default(), ModelCoefficients::default()).unwrap_err();
        assert!(matches!(err, DataError::Schema(_)));
    }

    #[test]
    fn axis_maps_ends_inside_padding() {
        let axis = Axis::padded((0.0, 100.0), 0, 1100);
        assert_eq!(axis.to_px(-5.0), 0);
        assert_eq!(axis.to_px(105.0), 1100);
        assert!(axis.to_px(0.0) > 0);
    }

    #[test]
    fn axis_clamps_extremes() {
        let axis = Axis::padded((0.0, 1.0), 0, 100);
        let limit = (WIDTH.max(HEIGHT) * 2) as i64;
        assert_eq!(axis.to_px(f64::INFINITY), limit);
        assert_eq!(axis.to_px(f64::NAN), 0);
    }
}
