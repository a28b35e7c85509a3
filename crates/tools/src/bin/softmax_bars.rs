//! Logits and their softmax probabilities as text bar charts

use affine_core::softmax;
use anyhow::{Context, Result};
use clap::Parser;
use tools::report::bar_chart;

#[derive(Parser, Debug)]
#[command(author, version, about = "Print logits and softmax probabilities as bar charts")]
struct Cli {
    /// Logits, comma separated
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_values_t = vec![2.0, 1.0, 0.1])]
    logits: Vec<f64>,

    /// Bar width in characters
    #[arg(long, default_value_t = 40)]
    width: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let probs = softmax(&cli.logits).context("softmax failed")?;
    let probs = probs.to_vec();
    log::debug!("sum of probabilities = {}", probs.iter().sum::<f64>());

    print!("{}", bar_chart("Logits (Input)", &cli.logits, cli.width));
    println!();
    print!("{}", bar_chart("Softmax Probabilities (Output)", &probs, cli.width));
    Ok(())
}
