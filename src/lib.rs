//! Star size predictor.
//!
//! Predicts a star's size from its brightness with a fixed linear model
//! (`size = slope * brightness + intercept`) and serves it over HTTP:
//!
//! ```text
//!  CSV upload ─► codec::decode ─► LinearPredictor ─► codec::encode ─► CSV
//!                      │
//!                      └────────► plot::render ─► PNG
//!
//!  rows ─► SyntheticDatasetGenerator ─► codec::encode ─► CSV
//! ```

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod plot;
pub mod predictor;
pub mod server;
pub mod service;
pub mod state;

pub use data::model::{Dataset, ModelCoefficients, Observation};
pub use error::DataError;
pub use predictor::LinearPredictor;
