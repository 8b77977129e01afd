//! Memoryless stimulus generator.
//!
//! Each trial independently draws a risky probability (from a discrete set or
//! a continuous range), a risky reward from an inclusive range, and a certain
//! reward (fixed or drawn). No trial depends on an earlier one, so trials are
//! exchangeable and a seeded generator is fully reproducible.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CERTAIN_REWARD, DEFAULT_RISKY_PROBABILITIES, DEFAULT_RISKY_REWARD};
use crate::error::{ConfigError, ModelError};
use crate::types::{Bounds, Trial};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProbabilitySpec {
    /// Uniform choice among a finite set of probabilities.
    Discrete { values: Vec<f64> },
    /// Uniform over `[lower, upper]`.
    Continuous { lower: f64, upper: f64 },
}

impl Default for ProbabilitySpec {
    fn default() -> Self {
        Self::Discrete {
            values: DEFAULT_RISKY_PROBABILITIES.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CertainReward {
    Fixed { value: f64 },
    Sampled { lower: f64, upper: f64 },
}

impl Default for CertainReward {
    fn default() -> Self {
        Self::Fixed {
            value: DEFAULT_CERTAIN_REWARD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialConfig {
    #[serde(default)]
    pub probability: ProbabilitySpec,
    #[serde(default = "TrialConfig::default_reward_risky")]
    pub reward_risky: Bounds,
    #[serde(default)]
    pub reward_certain: CertainReward,
}

impl TrialConfig {
    fn default_reward_risky() -> Bounds {
        DEFAULT_RISKY_REWARD.into()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.probability {
            ProbabilitySpec::Discrete { values } => {
                if values.is_empty() {
                    return Err(ConfigError::invalid(
                        "trials.probability: discrete set is empty",
                    ));
                }
                if let Some(p) = values.iter().find(|&&p| !(p > 0.0 && p <= 1.0)) {
                    return Err(ConfigError::invalid(format!(
                        "trials.probability: {p} is outside (0, 1]"
                    )));
                }
            }
            ProbabilitySpec::Continuous { lower, upper } => {
                if !(*lower > 0.0 && lower <= upper && *upper <= 1.0) {
                    return Err(ConfigError::invalid(format!(
                        "trials.probability: range [{lower}, {upper}] must lie in (0, 1]"
                    )));
                }
            }
        }
        check_positive_range(
            "trials.reward_risky",
            self.reward_risky.lower,
            self.reward_risky.upper,
        )?;
        match self.reward_certain {
            CertainReward::Fixed { value } => {
                check_positive_range("trials.reward_certain", value, value)?
            }
            CertainReward::Sampled { lower, upper } => {
                check_positive_range("trials.reward_certain", lower, upper)?
            }
        }
        Ok(())
    }
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            probability: ProbabilitySpec::default(),
            reward_risky: Self::default_reward_risky(),
            reward_certain: CertainReward::default(),
        }
    }
}

fn check_positive_range(name: &str, lower: f64, upper: f64) -> Result<(), ConfigError> {
    if !(lower > 0.0 && lower <= upper && upper.is_finite()) {
        return Err(ConfigError::invalid(format!(
            "{name}: range [{lower}, {upper}] must be finite, positive and ordered"
        )));
    }
    Ok(())
}

/// Draws trials from a validated [`TrialConfig`].
#[derive(Debug, Clone)]
pub struct TrialGenerator {
    config: TrialConfig,
}

impl TrialGenerator {
    pub fn new(config: TrialConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Draw one trial: probability, then risky reward, then certain reward.
    pub fn next_trial<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Trial, ModelError> {
        let p = match &self.config.probability {
            ProbabilitySpec::Discrete { values } => values[rng.random_range(0..values.len())],
            ProbabilitySpec::Continuous { lower, upper } => rng.random_range(*lower..=*upper),
        };
        let v = rng.random_range(self.config.reward_risky.lower..=self.config.reward_risky.upper);
        let c = match self.config.reward_certain {
            CertainReward::Fixed { value } => value,
            CertainReward::Sampled { lower, upper } => rng.random_range(lower..=upper),
        };
        Trial::new(p, v, c)
    }

    /// Eagerly draw `n` trials.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        n: usize,
        rng: &mut R,
    ) -> Result<Vec<Trial>, ModelError> {
        self.iter(rng).take(n).collect()
    }

    /// Lazy, unbounded stream of trials; bound it with `take`.
    pub fn iter<'a, R: Rng + ?Sized>(
        &'a self,
        rng: &'a mut R,
    ) -> impl Iterator<Item = Result<Trial, ModelError>> + 'a {
        std::iter::repeat_with(move || self.next_trial(&mut *rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_uses_discrete_probabilities() {
        let gen = TrialGenerator::new(TrialConfig::default()).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let trials = gen.generate(5000, &mut rng).unwrap();
        assert_eq!(trials.len(), 5000);
        let mut seen = [false; 2];
        for t in &trials {
            let p = t.probability_risky();
            assert!(p == 0.5 || p == 0.9, "p={p}");
            seen[(p == 0.9) as usize] = true;
            assert!((1.0..=5.0).contains(&t.reward_risky()));
            assert_eq!(t.reward_certain(), 1.0);
        }
        assert!(seen[0] && seen[1]);
    }

    #[test]
    fn test_continuous_and_sampled_certain() {
        let config = TrialConfig {
            probability: ProbabilitySpec::Continuous {
                lower: 0.1,
                upper: 1.0,
            },
            reward_risky: Bounds::new(0.5, 10.0),
            reward_certain: CertainReward::Sampled {
                lower: 0.5,
                upper: 5.0,
            },
        };
        let gen = TrialGenerator::new(config).unwrap();
        let mut rng = SmallRng::seed_from_u64(9);
        for t in gen.generate(5000, &mut rng).unwrap() {
            assert!((0.1..=1.0).contains(&t.probability_risky()));
            assert!((0.5..=10.0).contains(&t.reward_risky()));
            assert!((0.5..=5.0).contains(&t.reward_certain()));
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let gen = TrialGenerator::new(TrialConfig::default()).unwrap();
        let mut rng1 = SmallRng::seed_from_u64(5);
        let mut rng2 = SmallRng::seed_from_u64(5);
        assert_eq!(
            gen.generate(300, &mut rng1).unwrap(),
            gen.generate(300, &mut rng2).unwrap()
        );
    }

    #[test]
    fn test_lazy_iter_matches_eager() {
        let gen = TrialGenerator::new(TrialConfig::default()).unwrap();
        let mut rng1 = SmallRng::seed_from_u64(8);
        let mut rng2 = SmallRng::seed_from_u64(8);
        let eager = gen.generate(50, &mut rng1).unwrap();
        let lazy: Vec<Trial> = gen.iter(&mut rng2).take(50).map(Result::unwrap).collect();
        assert_eq!(eager, lazy);
    }

    #[test]
    fn test_validate_rejects_bad_stimuli() {
        let zero_p = TrialConfig {
            probability: ProbabilitySpec::Discrete {
                values: vec![0.0, 0.5],
            },
            ..TrialConfig::default()
        };
        assert!(TrialGenerator::new(zero_p).is_err());

        let empty = TrialConfig {
            probability: ProbabilitySpec::Discrete { values: vec![] },
            ..TrialConfig::default()
        };
        assert!(empty.validate().is_err());

        let inverted = TrialConfig {
            reward_risky: Bounds::new(5.0, 1.0),
            ..TrialConfig::default()
        };
        assert!(inverted.validate().is_err());

        let negative_certain = TrialConfig {
            reward_certain: CertainReward::Fixed { value: -1.0 },
            ..TrialConfig::default()
        };
        assert!(negative_certain.validate().is_err());
    }
}
