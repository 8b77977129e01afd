//! Command-line overrides shared by the binaries.
//!
//! Precedence: defaults < `--config` TOML file < individual flags.

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::config::{parse_thresholds, threshold_grid, RecoveryConfig};
use crate::error::ConfigError;
use crate::sampler::PopulationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PopulationKind {
    TruncatedGaussian,
    Uniform,
}

impl PopulationKind {
    pub fn config(self) -> PopulationConfig {
        match self {
            Self::TruncatedGaussian => PopulationConfig::truncated_gaussian(),
            Self::Uniform => PopulationConfig::uniform(),
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of simulated agents
    #[arg(short, long)]
    pub agents: Option<usize>,

    /// Trials simulated per agent
    #[arg(short, long)]
    pub trials: Option<usize>,

    /// Base random seed
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Comma-separated trial-count thresholds, e.g. "100,200,400"
    #[arg(long, conflicts_with = "threshold_step")]
    pub thresholds: Option<String>,

    /// Fit at every multiple of this step up to the trial count
    #[arg(long)]
    pub threshold_step: Option<usize>,

    /// Population the agent parameters are drawn from
    #[arg(long, value_enum)]
    pub population: Option<PopulationKind>,

    /// Optimizer iteration budget per fit
    #[arg(long)]
    pub max_iters: Option<u64>,
}

impl ConfigArgs {
    /// Load the file (or defaults), apply flags, validate.
    pub fn resolve(&self) -> Result<RecoveryConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => RecoveryConfig::load(path)?,
            None => RecoveryConfig::default(),
        };
        self.apply(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut RecoveryConfig) -> Result<(), ConfigError> {
        if let Some(n) = self.agents {
            config.num_agents = n;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(kind) = self.population {
            config.population = kind.config();
        }
        if let Some(iters) = self.max_iters {
            config.fitter.max_iters = iters;
        }
        if let Some(n) = self.trials {
            config.trials_per_agent = n;
        }
        if let Some(csv) = &self.thresholds {
            config.thresholds = Some(parse_thresholds(csv)?);
        }
        if let Some(step) = self.threshold_step {
            if step == 0 {
                return Err(ConfigError::invalid("threshold step must be > 0"));
            }
            config.thresholds = Some(threshold_grid(step, config.trials_per_agent));
        }
        Ok(())
    }
}
