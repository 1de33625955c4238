use std::fmt;

use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const BRIGHTNESS_COLUMN: &str = "Brightness";
pub const TRUE_SIZE_COLUMN: &str = "True Size";
pub const PREDICTIONS_COLUMN: &str = "predictions";

// ---------------------------------------------------------------------------
// ModelCoefficients – the fixed linear model
// ---------------------------------------------------------------------------

/// Slope and intercept of `size = slope * brightness + intercept`.
///
/// Built once at startup and handed to every service by value; nothing
/// mutates it afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelCoefficients {
    pub slope: f64,
    pub intercept: f64,
}

impl ModelCoefficients {
    pub const DEFAULT_SLOPE: f64 = 1.982015;
    pub const DEFAULT_INTERCEPT: f64 = 9.500380;

    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// Like [`new`](Self::new), but rejects NaN and infinite coefficients.
    pub fn try_new(slope: f64, intercept: f64) -> Result<Self> {
        if !slope.is_finite() || !intercept.is_finite() {
            return Err(DataError::invalid_argument(format!(
                "model coefficients must be finite (slope = {slope}, intercept = {intercept})"
            )));
        }
        Ok(Self::new(slope, intercept))
    }
}

impl Default for ModelCoefficients {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SLOPE, Self::DEFAULT_INTERCEPT)
    }
}

impl fmt::Display for ModelCoefficients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "size = {} * brightness + {}", self.slope, self.intercept)
    }
}

// ---------------------------------------------------------------------------
// Observation – one row of the table
// ---------------------------------------------------------------------------

/// A single star measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub brightness: f64,
    /// Ground-truth size from the input table.
    pub true_size: f64,
    /// Model output; `None` until a predictor has been applied.
    pub prediction: Option<f64>,
}

impl Observation {
    pub fn new(brightness: f64, true_size: f64) -> Self {
        Self {
            brightness,
            true_size,
            prediction: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – ordered rows in input order
// ---------------------------------------------------------------------------

/// The parsed table. Row order is the input order and is never changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub observations: Vec<Observation>,
    /// Whether the table has a `predictions` column, independent of how
    /// many rows it has.
    pub prediction_column: bool,
}

impl Dataset {
    /// The `predictions` column is present when any row carries a prediction.
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let prediction_column = observations.iter().any(|o| o.prediction.is_some());
        Self {
            observations,
            prediction_column,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Whether the encoded table gets a `predictions` column.
    pub fn has_predictions(&self) -> bool {
        self.prediction_column || self.observations.iter().any(|o| o.prediction.is_some())
    }

    /// `(min, max)` brightness, or `None` for an empty dataset.
    pub fn brightness_range(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let min = self
            .observations
            .iter()
            .map(|o| o.brightness)
            .fold(f64::INFINITY, f64::min);
        let max = self
            .observations
            .iter()
            .map(|o| o.brightness)
            .fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }

    /// `(min, max)` over true sizes and predictions together.
    pub fn size_range(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let values = self
            .observations
            .iter()
            .flat_map(|o| std::iter::once(o.true_size).chain(o.prediction));
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        Some((min, max))
    }
}
