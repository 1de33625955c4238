use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use crate::data::model::ModelCoefficients;
use crate::state::AppState;

/// Serve star size predictions over HTTP.
#[derive(Debug, Clone, Parser)]
#[command(name = "star-size", version, about)]
pub struct Config {
    /// Address to bind
    #[arg(long, env = "STAR_SIZE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "STAR_SIZE_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Model slope (size per unit of brightness)
    #[arg(long, env = "STAR_SIZE_SLOPE", default_value_t = ModelCoefficients::DEFAULT_SLOPE)]
    pub slope: f64,

    /// Model intercept
    #[arg(long, env = "STAR_SIZE_INTERCEPT", default_value_t = ModelCoefficients::DEFAULT_INTERCEPT)]
    pub intercept: f64,

    /// Largest accepted upload, in MiB
    #[arg(long, env = "STAR_SIZE_MAX_UPLOAD_MB", default_value_t = 10)]
    pub max_upload_mb: usize,
}

impl Config {
    /// The model coefficients; non-finite overrides are rejected.
    pub fn coefficients(&self) -> Result<ModelCoefficients> {
        Ok(ModelCoefficients::try_new(self.slope, self.intercept)?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    /// Build the shared handler state from this configuration.
    pub fn app_state(&self) -> Result<AppState> {
        let state = AppState::new(self.coefficients()?).context("building application state")?;
        Ok(state.with_max_upload_bytes(self.max_upload_mb.saturating_mul(1024 * 1024)))
    }
}
