use crate::color::PlotTheme;
use crate::data::codec::{self, HeaderMode};
use crate::data::model::ModelCoefficients;
use crate::error::Result;
use crate::plot::{self, PlotArtifact};
use crate::predictor::LinearPredictor;

// ---------------------------------------------------------------------------
// PredictionService
// ---------------------------------------------------------------------------

/// CSV in, CSV with a `predictions` column out.
///
/// The upload must have exactly two columns; they are read as
/// `Brightness`, `True Size` in that order whatever their header says.
#[derive(Debug, Clone, Copy)]
pub struct PredictionService {
    predictor: LinearPredictor,
}

impl PredictionService {
    pub fn new(coefficients: ModelCoefficients) -> Self {
        Self {
            predictor: LinearPredictor::new(coefficients),
        }
    }

    pub fn handle(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let mut dataset = codec::decode_with(raw, HeaderMode::Positional)?;
        self.predictor.annotate(&mut dataset);
        log::debug!("predicted {} rows", dataset.len());
        codec::encode(&dataset)
    }
}

// ---------------------------------------------------------------------------
// PlottingService
// ---------------------------------------------------------------------------

/// CSV with `Brightness` and `True Size` columns in, regression plot out.
#[derive(Debug, Clone)]
pub struct PlottingService {
    coefficients: ModelCoefficients,
    theme: PlotTheme,
}

impl PlottingService {
    pub fn new(coefficients: ModelCoefficients) -> Self {
        Self {
            coefficients,
            theme: PlotTheme::default(),
        }
    }

    pub fn handle(&self, raw: &[u8]) -> Result<PlotArtifact> {
        let dataset = codec::decode(raw)?;
        let artifact = plot::render_with_theme(&dataset, self.coefficients, &self.theme)?;
        log::debug!("plotted {} rows: {}", dataset.len(), artifact.title);
        Ok(artifact)
    }
}
