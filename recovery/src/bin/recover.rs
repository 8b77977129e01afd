//! Parameter recovery: simulate a population, re-fit every agent at each
//! trial-count threshold and report MSE / SEM / correlation per threshold.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use prospect_recovery::cli::ConfigArgs;
use prospect_recovery::env_config::{init_logging, init_rayon_threads};
use prospect_recovery::simulation::{
    run_recovery, save_records_csv, save_summary_csv, save_summary_json, trend_violations,
    TREND_TOLERANCE_SEMS,
};
use prospect_recovery::RecoveryConfig;

#[derive(Parser)]
#[command(name = "prospect-recover")]
#[command(version)]
#[command(about = "Recover prospect-theory parameters from simulated choices")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Output directory for records.csv, summary.csv and summary.json
    #[arg(short, long, default_value = "data/recovery")]
    output: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    example_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.example_config {
        let text =
            RecoveryConfig::example_toml().context("Failed to render default configuration")?;
        print!("{text}");
        return Ok(());
    }

    init_logging(cli.verbose);
    let threads = init_rayon_threads();
    let config = cli.config.resolve().context("Invalid configuration")?;
    let thresholds = config.effective_thresholds();

    println!(
        "Parameter recovery ({} agents, {} trials, {} thresholds)",
        config.num_agents,
        config.trials_per_agent,
        thresholds.len()
    );
    println!("  Population: {}", config.population.name());
    println!("  Seed:       {}", config.seed);
    println!("  Threads:    {}", threads);
    println!();

    let start = Instant::now();
    let report = run_recovery(&config).context("Recovery run failed")?;
    let elapsed = start.elapsed().as_secs_f64();

    println!(
        "{:>7}  {:>6}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}  {:>6}  {:>6}  {:>6}",
        "trials", "failed", "mse_alpha", "mse_beta", "mse_mu", "mse_comb", "sem_comb", "r_a",
        "r_b", "r_mu"
    );
    for s in &report.summary.thresholds {
        println!(
            "{:>7}  {:>6}  {:>10.5}  {:>10.5}  {:>10.4}  {:>10.4}  {:>10.4}  {:>6.3}  {:>6.3}  {:>6.3}",
            s.num_trials,
            s.num_failed,
            s.alpha.mse,
            s.beta.mse,
            s.mu.mse,
            s.combined.mse,
            s.combined.sem,
            s.correlation[0],
            s.correlation[1],
            s.correlation[2]
        );
    }
    println!();

    let violations = trend_violations(&report.summary.thresholds, TREND_TOLERANCE_SEMS);
    if violations.is_empty() {
        println!("  Combined MSE trend: no rise beyond {TREND_TOLERANCE_SEMS} SEMs");
    } else {
        for (prev, next) in &violations {
            println!("  Combined MSE trend: rise from {prev} to {next} trials");
        }
    }
    println!("  Elapsed:    {:.2}s", elapsed);

    let records_path = cli.output.join("records.csv");
    let summary_csv_path = cli.output.join("summary.csv");
    let summary_json_path = cli.output.join("summary.json");
    save_records_csv(&report.records, &records_path)
        .with_context(|| format!("Failed to write {}", records_path.display()))?;
    save_summary_csv(&report.summary.thresholds, &summary_csv_path)
        .with_context(|| format!("Failed to write {}", summary_csv_path.display()))?;
    save_summary_json(&report.summary, &summary_json_path)
        .with_context(|| format!("Failed to write {}", summary_json_path.display()))?;

    println!("  Records:    {}", records_path.display());
    println!("  Summary:    {}", summary_csv_path.display());
    println!("  JSON:       {}", summary_json_path.display());
    Ok(())
}
