//! Run configuration: TOML file plus CLI overrides, validated before any work.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;
use crate::fitter::FitterConfig;
use crate::sampler::PopulationConfig;
use crate::trials::TrialConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryConfig {
    #[serde(default = "RecoveryConfig::default_seed")]
    pub seed: u64,
    #[serde(default = "RecoveryConfig::default_num_agents")]
    pub num_agents: usize,
    /// Trials simulated per agent; every threshold fits a prefix of these.
    #[serde(default = "RecoveryConfig::default_trials_per_agent")]
    pub trials_per_agent: usize,
    /// Trial-count thresholds to fit at. Unset means every multiple of
    /// [`DEFAULT_THRESHOLD_STEP`] up to `trials_per_agent`; empty means fit
    /// all trials once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Vec<usize>>,
    #[serde(default)]
    pub population: PopulationConfig,
    #[serde(default)]
    pub trials: TrialConfig,
    #[serde(default)]
    pub fitter: FitterConfig,
}

impl RecoveryConfig {
    fn default_seed() -> u64 {
        DEFAULT_SEED
    }
    fn default_num_agents() -> usize {
        DEFAULT_NUM_AGENTS
    }
    fn default_trials_per_agent() -> usize {
        DEFAULT_MAX_TRIALS
    }

    /// Read and parse a TOML file. Does not validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults rendered as TOML.
    pub fn example_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&Self::default())
    }

    /// Thresholds the harness will fit at, ascending and deduplicated.
    pub fn effective_thresholds(&self) -> Vec<usize> {
        let mut t = match &self.thresholds {
            Some(t) => t.clone(),
            None => threshold_grid(DEFAULT_THRESHOLD_STEP, self.trials_per_agent),
        };
        if t.is_empty() {
            return vec![self.trials_per_agent];
        }
        t.sort_unstable();
        t.dedup();
        t
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_agents == 0 {
            return Err(ConfigError::invalid("num_agents must be > 0"));
        }
        if self.trials_per_agent == 0 {
            return Err(ConfigError::invalid("trials_per_agent must be > 0"));
        }
        let thresholds = self.thresholds.as_deref().unwrap_or_default();
        if let Some(&t) = thresholds.iter().find(|&&t| t == 0) {
            return Err(ConfigError::invalid(format!(
                "thresholds must be positive, got {t}"
            )));
        }
        if let Some(&t) = thresholds.iter().find(|&&t| t > self.trials_per_agent) {
            return Err(ConfigError::invalid(format!(
                "threshold {t} exceeds trials_per_agent {}",
                self.trials_per_agent
            )));
        }
        self.population.validate()?;
        self.trials.validate()?;
        self.fitter.validate()?;
        Ok(())
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            seed: Self::default_seed(),
            num_agents: Self::default_num_agents(),
            trials_per_agent: Self::default_trials_per_agent(),
            thresholds: None,
            population: PopulationConfig::default(),
            trials: TrialConfig::default(),
            fitter: FitterConfig::default(),
        }
    }
}

/// step, 2·step, … up to and including `max` (when `max` is a multiple of step).
pub fn threshold_grid(step: usize, max: usize) -> Vec<usize> {
    if step == 0 {
        return Vec::new();
    }
    (1..=max / step).map(|i| i * step).collect()
}

/// Parse "100,200,400" into thresholds.
pub fn parse_thresholds(csv: &str) -> Result<Vec<usize>, ConfigError> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|e| ConfigError::invalid(format!("threshold '{s}': {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Bounds;

    fn unique_path(name: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "prospect_recovery_config_test_{}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos(),
            name
        ));
        p
    }

    #[test]
    fn test_default_is_valid() {
        let cfg = RecoveryConfig::default();
        cfg.validate().unwrap();
        let t = cfg.effective_thresholds();
        assert_eq!(t.first(), Some(&100));
        assert_eq!(t.last(), Some(&1400));
        assert_eq!(t.len(), 14);
    }

    #[test]
    fn test_example_toml_round_trips() {
        let text = RecoveryConfig::example_toml().unwrap();
        let parsed: RecoveryConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, RecoveryConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = unique_path("partial.toml");
        fs::write(
            &path,
            r#"
seed = 7
num_agents = 12
thresholds = [50, 100]
trials_per_agent = 100

[population]
kind = "uniform"
alpha = { lower = 0.3, upper = 1.5 }
beta = { lower = 0.2, upper = 1.0 }
mu = { lower = 1.0, upper = 15.0 }

[trials.probability]
kind = "continuous"
lower = 0.1
upper = 1.0
"#,
        )
        .unwrap();
        let cfg = RecoveryConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.num_agents, 12);
        assert_eq!(cfg.population, PopulationConfig::uniform());
        assert_eq!(cfg.trials.reward_risky, Bounds::new(1.0, 5.0));
        assert_eq!(cfg.fitter, FitterConfig::default());
        cfg.validate().unwrap();
    }

    #[test]
    fn test_file_with_only_trial_count_derives_thresholds() {
        let path = unique_path("trials_only.toml");
        fs::write(&path, "trials_per_agent = 500\n").unwrap();
        let cfg = RecoveryConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);

        cfg.validate().unwrap();
        assert_eq!(cfg.thresholds, None);
        assert_eq!(cfg.effective_thresholds(), vec![100, 200, 300, 400, 500]);
    }

    #[test]
    fn test_unset_thresholds_below_step_fit_all_trials() {
        let cfg = RecoveryConfig {
            trials_per_agent: 60,
            ..RecoveryConfig::default()
        };
        cfg.validate().unwrap();
        assert_eq!(cfg.effective_thresholds(), vec![60]);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = RecoveryConfig::load(unique_path("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let path = unique_path("bad.toml");
        fs::write(&path, "num_agents = \"many\"").unwrap();
        let err = RecoveryConfig::load(&path).unwrap_err();
        let _ = fs::remove_file(&path);
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_validate_rejects_threshold_beyond_trials() {
        let cfg = RecoveryConfig {
            trials_per_agent: 500,
            thresholds: Some(vec![100, 600]),
            ..RecoveryConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_agents_and_zero_threshold() {
        let no_agents = RecoveryConfig {
            num_agents: 0,
            ..RecoveryConfig::default()
        };
        assert!(no_agents.validate().is_err());

        let zero_threshold = RecoveryConfig {
            thresholds: Some(vec![0, 100]),
            ..RecoveryConfig::default()
        };
        assert!(zero_threshold.validate().is_err());
    }

    #[test]
    fn test_effective_thresholds_sorted_unique() {
        let cfg = RecoveryConfig {
            thresholds: Some(vec![400, 100, 400, 200]),
            ..RecoveryConfig::default()
        };
        assert_eq!(cfg.effective_thresholds(), vec![100, 200, 400]);

        let none = RecoveryConfig {
            thresholds: Some(vec![]),
            trials_per_agent: 250,
            ..RecoveryConfig::default()
        };
        assert_eq!(none.effective_thresholds(), vec![250]);
    }

    #[test]
    fn test_threshold_grid_and_parse() {
        assert_eq!(threshold_grid(100, 450), vec![100, 200, 300, 400]);
        assert!(threshold_grid(0, 450).is_empty());
        assert_eq!(parse_thresholds("100, 200,400").unwrap(), vec![100, 200, 400]);
        assert!(parse_thresholds("100,abc").is_err());
    }
}
