//! Simulate a population of agents and write every trial to CSV.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use prospect_recovery::cli::ConfigArgs;
use prospect_recovery::env_config::{init_logging, init_rayon_threads};
use prospect_recovery::simulation::{save_trials_csv, simulate_population};

#[derive(Parser)]
#[command(name = "prospect-simulate")]
#[command(version)]
#[command(about = "Simulate risky-choice datasets for a population of agents")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Output CSV path
    #[arg(short, long, default_value = "data/simulation/trials.csv")]
    output: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    init_rayon_threads();

    let config = cli.config.resolve().context("Invalid configuration")?;
    println!(
        "Choice simulation ({} agents x {} trials, {} population, seed {})",
        config.num_agents,
        config.trials_per_agent,
        config.population.name(),
        config.seed
    );

    let start = Instant::now();
    let runs = simulate_population(&config).context("Simulation failed")?;
    let elapsed = start.elapsed().as_secs_f64();

    let total: usize = runs.iter().map(|r| r.dataset.len()).sum();
    let risky: usize = runs
        .iter()
        .flat_map(|r| r.dataset.iter())
        .map(|o| o.choice.as_indicator() as usize)
        .sum();
    println!("  Trials:      {}", total);
    println!(
        "  Risky rate:  {:.4}",
        if total == 0 { f64::NAN } else { risky as f64 / total as f64 }
    );
    println!("  Elapsed:     {:.2}s", elapsed);

    save_trials_csv(&runs, &cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    println!("  Wrote {}", cli.output.display());
    Ok(())
}
