//! Stacked linear layers vs. a single collapsed affine map
//!
//! Draws a random batch and a random layer sequence from a seeded generator,
//! evaluates both paths, prints shapes and sample rows, and fails with a
//! non-zero exit code if the outputs disagree beyond tolerance.

use std::path::PathBuf;

use affine_core::{random_batch, random_sequence, verify_equivalence, Tolerance};
use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tools::config::{load_config_file, RunConfig};
use tools::report::{format_outputs, format_shapes};

#[derive(Parser, Debug)]
#[command(author, version, about = "Show that stacked affine layers collapse to one affine map")]
struct Cli {
    /// Run configuration file (JSON or YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Batch size
    #[arg(long)]
    samples: Option<usize>,

    /// Input dimension
    #[arg(long)]
    d_in: Option<usize>,

    /// Hidden layer widths, comma separated (e.g. 7,6,4)
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    hidden: Option<Vec<usize>>,

    /// Output dimension
    #[arg(long)]
    d_out: Option<usize>,

    /// Standard deviation of random weights and biases
    #[arg(long)]
    scale: Option<f64>,

    /// Absolute tolerance
    #[arg(long)]
    atol: Option<f64>,

    /// Relative tolerance
    #[arg(long)]
    rtol: Option<f64>,

    /// Derive the tolerance from layer depth and magnitude
    #[arg(long)]
    auto_tolerance: bool,

    /// Sample rows to print per output
    #[arg(long)]
    rows: Option<usize>,
}

impl Cli {
    /// CLI > config file > defaults
    fn resolve(&self) -> Result<RunConfig> {
        let mut cfg = match &self.config {
            Some(path) => load_config_file(path)?,
            None => RunConfig::default(),
        };
        if let Some(v) = self.seed {
            cfg.seed = v;
        }
        if let Some(v) = self.samples {
            cfg.n_samples = v;
        }
        if let Some(v) = self.d_in {
            cfg.d_in = v;
        }
        if let Some(v) = &self.hidden {
            cfg.hidden = v.clone();
        }
        if let Some(v) = self.d_out {
            cfg.d_out = v;
        }
        if let Some(v) = self.scale {
            cfg.init.scale = v;
        }
        if let Some(v) = self.atol {
            cfg.tolerance.atol = v;
        }
        if let Some(v) = self.rtol {
            cfg.tolerance.rtol = v;
        }
        if let Some(v) = self.rows {
            cfg.rows = v;
        }
        cfg.auto_tolerance |= self.auto_tolerance;
        cfg.validate()?;
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let cfg = cli.resolve()?;
    log::info!("dims = {:?}, n_samples = {}, seed = {}", cfg.dims(), cfg.n_samples, cfg.seed);

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(cfg.seed);
    let x = random_batch(&mut rng, cfg.n_samples, cfg.d_in);
    let seq = random_sequence(&mut rng, &cfg.dims(), &cfg.init).context("failed to build layers")?;

    let tol = if cfg.auto_tolerance {
        let tol = Tolerance::scaled_for(&seq, &x);
        log::info!("auto tolerance: atol = {:.3e}", tol.atol);
        tol
    } else {
        cfg.tolerance
    };

    let report = verify_equivalence(&x, &seq, &tol)
        .context("Mismatch! The equivalence failed.")?;

    println!("{}", format_shapes(&x, &seq, &report));
    print!("{}", format_outputs(&report, cfg.rows));
    println!(
        "\nConclusion: Multiple linear layers without activations are exactly one affine map."
    );

    Ok(())
}
