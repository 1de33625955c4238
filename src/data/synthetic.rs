use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

use super::model::{Dataset, ModelCoefficients, Observation};
use crate::error::{DataError, Result};
use crate::predictor::LinearPredictor;

/// Smallest row count the generator accepts.
pub const MIN_ROWS: i64 = 1;
/// Largest row count the generator accepts.
pub const MAX_ROWS: i64 = 1_000_000;

const BRIGHTNESS_LOW: f64 = 0.0;
const BRIGHTNESS_HIGH: f64 = 100.0;
const NOISE_STD_DEV: f64 = 10.0;

// ---------------------------------------------------------------------------
// SyntheticDatasetGenerator
// ---------------------------------------------------------------------------

/// Draws `(brightness, true size)` pairs around the linear model:
/// `brightness ~ U(0, 100)`, `true size = model(brightness) + N(0, 10)`.
///
/// The random source is passed to [`generate`](Self::generate) so callers
/// choose between entropy and a seeded generator.
#[derive(Debug, Clone)]
pub struct SyntheticDatasetGenerator {
    predictor: LinearPredictor,
    brightness: Uniform<f64>,
    noise: Normal<f64>,
}

impl SyntheticDatasetGenerator {
    pub fn new(coefficients: ModelCoefficients) -> Result<Self> {
        let brightness = Uniform::new(BRIGHTNESS_LOW, BRIGHTNESS_HIGH)
            .map_err(|e| DataError::invalid_argument(format!("brightness range: {e}")))?;
        let noise = Normal::new(0.0, NOISE_STD_DEV)
            .map_err(|e| DataError::invalid_argument(format!("noise distribution: {e}")))?;
        Ok(Self {
            predictor: LinearPredictor::new(coefficients),
            brightness,
            noise,
        })
    }

    /// Generate `row_count` independent rows in draw order.
    ///
    /// # Returns
    /// [`DataError::InvalidArgument`] if `row_count` is outside
    /// [`MIN_ROWS`]..=[`MAX_ROWS`].
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, row_count: i64) -> Result<Dataset> {
        if !(MIN_ROWS..=MAX_ROWS).contains(&row_count) {
            return Err(DataError::invalid_argument(format!(
                "row count must be between {MIN_ROWS} and {MAX_ROWS}, got {row_count}"
            )));
        }

        let observations = (0..row_count)
            .map(|_| {
                let brightness = self.brightness.sample(rng);
                let true_size = self.predictor.predict(brightness) + self.noise.sample(rng);
                Observation::new(brightness, true_size)
            })
            .collect();

        Ok(Dataset::from_observations(observations))
    }
}
