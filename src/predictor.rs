use crate::data::model::{Dataset, ModelCoefficients};

// ---------------------------------------------------------------------------
// LinearPredictor
// ---------------------------------------------------------------------------

/// Applies the fixed linear model to brightness values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearPredictor {
    coefficients: ModelCoefficients,
}

impl LinearPredictor {
    pub fn new(coefficients: ModelCoefficients) -> Self {
        Self { coefficients }
    }

    /// `slope * brightness + intercept`.
    pub fn predict(&self, brightness: f64) -> f64 {
        self.coefficients.slope * brightness + self.coefficients.intercept
    }

    /// Attach a prediction to every row, keeping row order. The dataset
    /// gains a `predictions` column even when it has no rows.
    pub fn annotate(&self, dataset: &mut Dataset) {
        for obs in &mut dataset.observations {
            obs.prediction = Some(self.predict(obs.brightness));
        }
        dataset.prediction_column = true;
    }
}

/// Mean squared error between predictions and true sizes.
///
/// Rows without a prediction are skipped; returns `None` when no row has one.
pub fn mean_squared_error(dataset: &Dataset) -> Option<f64> {
    let (sum, n) = dataset
        .observations
        .iter()
        .filter_map(|o| o.prediction.map(|p| (p - o.true_size).powi(2)))
        .fold((0.0, 0usize), |(sum, n), sq| (sum + sq, n + 1));
    (n > 0).then(|| sum / n as f64)
}
