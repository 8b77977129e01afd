//! Population simulation, parameter recovery and its statistics.
//!
//! - [`agent`]: Per-agent parameter draws and choice datasets (parallel over agents)
//! - [`harness`]: Re-fit every agent at every trial-count threshold
//! - [`statistics`]: MSE / SEM / correlation per threshold, trend diagnostic
//! - [`export`]: CSV output for trials, fit records and summaries
//! - [`seeds`]: Per-agent seed derivation

pub mod agent;
pub mod export;
pub mod harness;
pub mod seeds;
pub mod statistics;

// Re-export commonly used items
pub use agent::{agent_rng, simulate_agent, simulate_population, AgentRun};
pub use export::{save_records_csv, save_summary_csv, save_trials_csv};
pub use harness::{fit_population, run_recovery, RecoveryReport, TREND_TOLERANCE_SEMS};
pub use seeds::derive_seed;
pub use statistics::{
    aggregate_recovery, mean_and_sem, pearson, save_summary_json, trend_violations, ErrorStats,
    RecoverySummary, ThresholdSummary,
};
