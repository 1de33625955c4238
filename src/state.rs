use crate::data::model::ModelCoefficients;
use crate::data::synthetic::SyntheticDatasetGenerator;
use crate::error::Result;
use crate::service::{PlottingService, PredictionService};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Everything the HTTP handlers need, built once at startup.
///
/// All fields are immutable after construction, so the state is shared
/// across requests behind an `Arc` without any locking.
#[derive(Debug, Clone)]
pub struct AppState {
    pub coefficients: ModelCoefficients,
    pub prediction: PredictionService,
    pub plotting: PlottingService,
    pub generator: SyntheticDatasetGenerator,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

    pub fn new(coefficients: ModelCoefficients) -> Result<Self> {
        Ok(Self {
            coefficients,
            prediction: PredictionService::new(coefficients),
            plotting: PlottingService::new(coefficients),
            generator: SyntheticDatasetGenerator::new(coefficients)?,
            max_upload_bytes: Self::DEFAULT_MAX_UPLOAD_BYTES,
        })
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}
