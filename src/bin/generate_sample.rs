use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;

use star_size::data::codec;
use star_size::data::synthetic::SyntheticDatasetGenerator;
use star_size::ModelCoefficients;

/// Write a synthetic star dataset (Brightness, True Size) to a CSV file.
#[derive(Debug, Parser)]
#[command(name = "generate_sample", version, about)]
struct Args {
    /// Number of stars to generate
    #[arg(short, long, default_value_t = 100)]
    rows: i64,

    /// Seed for a reproducible dataset; drawn from the OS when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output CSV path
    #[arg(short, long, default_value = "synthetic_data.csv")]
    output: PathBuf,

    /// Model slope
    #[arg(long, default_value_t = ModelCoefficients::DEFAULT_SLOPE)]
    slope: f64,

    /// Model intercept
    #[arg(long, default_value_t = ModelCoefficients::DEFAULT_INTERCEPT)]
    intercept: f64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let coefficients = ModelCoefficients::try_new(args.slope, args.intercept)?;
    let generator = SyntheticDatasetGenerator::new(coefficients)?;
    let dataset = generator.generate(&mut rng, args.rows)?;
    let csv = codec::encode(&dataset)?;

    std::fs::write(&args.output, csv)
        .with_context(|| format!("writing {}", args.output.display()))?;

    log::info!("wrote {} stars to {}", dataset.len(), args.output.display());
    Ok(())
}
