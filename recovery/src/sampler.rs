//! Population sampler for latent agent parameters (α, β, μ).
//!
//! Two populations:
//! - truncated Gaussian per parameter (default), sampled by rejection
//! - independent uniform intervals, the broader population used for
//!   recovery sweeps

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{ConfigError, ModelError};
use crate::types::{AgentParameters, Bounds};

/// Gaussian(mean, std) restricted to [lower, upper]; `upper = None` is +∞.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruncatedNormal {
    pub mean: f64,
    pub std: f64,
    pub lower: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

impl TruncatedNormal {
    pub const fn new(mean: f64, std: f64, lower: f64, upper: Option<f64>) -> Self {
        Self {
            mean,
            std,
            lower,
            upper,
        }
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.lower && self.upper.map_or(true, |u| x <= u)
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if !self.mean.is_finite() || !self.lower.is_finite() {
            return Err(ConfigError::invalid(format!(
                "population.{name}: mean and lower must be finite"
            )));
        }
        if !(self.std > 0.0) || !self.std.is_finite() {
            return Err(ConfigError::invalid(format!(
                "population.{name}: std must be positive, got {}",
                self.std
            )));
        }
        if let Some(upper) = self.upper {
            if !(upper > self.lower) {
                return Err(ConfigError::invalid(format!(
                    "population.{name}: lower {} must be below upper {upper}",
                    self.lower
                )));
            }
        }
        Ok(())
    }
}

/// Which population agents are drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PopulationConfig {
    TruncatedGaussian {
        alpha: TruncatedNormal,
        beta: TruncatedNormal,
        mu: TruncatedNormal,
    },
    Uniform {
        alpha: Bounds,
        beta: Bounds,
        mu: Bounds,
    },
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self::truncated_gaussian()
    }
}

impl PopulationConfig {
    pub fn truncated_gaussian() -> Self {
        Self::TruncatedGaussian {
            alpha: TruncatedNormal::new(ALPHA_PRIOR_MEAN, ALPHA_PRIOR_STD, ALPHA_PRIOR_LOWER, None),
            beta: TruncatedNormal::new(
                BETA_PRIOR_MEAN,
                BETA_PRIOR_STD,
                BETA_PRIOR_LOWER,
                Some(BETA_PRIOR_UPPER),
            ),
            mu: TruncatedNormal::new(MU_PRIOR_MEAN, MU_PRIOR_STD, MU_PRIOR_LOWER, None),
        }
    }

    pub fn uniform() -> Self {
        Self::Uniform {
            alpha: ALPHA_UNIFORM.into(),
            beta: BETA_UNIFORM.into(),
            mu: MU_UNIFORM.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TruncatedGaussian { .. } => "truncated-gaussian",
            Self::Uniform { .. } => "uniform",
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::TruncatedGaussian { alpha, beta, mu } => {
                alpha.validate("alpha")?;
                beta.validate("beta")?;
                mu.validate("mu")?;
                if !(alpha.lower > 0.0) || !(mu.lower > 0.0) {
                    return Err(ConfigError::invalid(
                        "population: alpha and mu lower bounds must be positive",
                    ));
                }
                if beta.lower < 0.0 || beta.upper.map_or(true, |u| u > 1.0) {
                    return Err(ConfigError::invalid(
                        "population.beta must be truncated to a subset of [0, 1]",
                    ));
                }
            }
            Self::Uniform { alpha, beta, mu } => {
                for (name, b) in [("alpha", alpha), ("beta", beta), ("mu", mu)] {
                    if !b.is_valid() || !(b.lower < b.upper) {
                        return Err(ConfigError::invalid(format!(
                            "population.{name}: lower {} must be below upper {}",
                            b.lower, b.upper
                        )));
                    }
                }
                if !(alpha.lower > 0.0) || !(mu.lower > 0.0) {
                    return Err(ConfigError::invalid(
                        "population: alpha and mu ranges must be strictly positive",
                    ));
                }
                if beta.lower < 0.0 || beta.upper > 1.0 {
                    return Err(ConfigError::invalid(
                        "population.beta range must lie within [0, 1]",
                    ));
                }
            }
        }
        Ok(())
    }
}

enum ParameterDistribution {
    Truncated {
        normal: Normal<f64>,
        spec: TruncatedNormal,
    },
    Uniform(Bounds),
}

impl ParameterDistribution {
    fn sample<R: Rng + ?Sized>(&self, name: &'static str, rng: &mut R) -> Result<f64, ModelError> {
        match self {
            Self::Truncated { normal, spec } => {
                for _ in 0..MAX_REJECTION_DRAWS {
                    let x = normal.sample(rng);
                    if spec.contains(x) {
                        return Ok(x);
                    }
                }
                Err(ModelError::SamplerExhausted {
                    parameter: name,
                    attempts: MAX_REJECTION_DRAWS,
                })
            }
            Self::Uniform(b) => Ok(rng.random_range(b.lower..=b.upper)),
        }
    }
}

/// Draws independent (α, β, μ) triples from a validated population.
pub struct ParameterSampler {
    alpha: ParameterDistribution,
    beta: ParameterDistribution,
    mu: ParameterDistribution,
}

impl ParameterSampler {
    pub fn new(config: &PopulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let sampler = match config {
            PopulationConfig::TruncatedGaussian { alpha, beta, mu } => Self {
                alpha: truncated(alpha)?,
                beta: truncated(beta)?,
                mu: truncated(mu)?,
            },
            PopulationConfig::Uniform { alpha, beta, mu } => Self {
                alpha: ParameterDistribution::Uniform(*alpha),
                beta: ParameterDistribution::Uniform(*beta),
                mu: ParameterDistribution::Uniform(*mu),
            },
        };
        Ok(sampler)
    }

    /// Draw α, then β, then μ from `rng`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<AgentParameters, ModelError> {
        Ok(AgentParameters {
            alpha: self.alpha.sample("alpha", rng)?,
            beta: self.beta.sample("beta", rng)?,
            mu: self.mu.sample("mu", rng)?,
        })
    }
}

fn truncated(spec: &TruncatedNormal) -> Result<ParameterDistribution, ConfigError> {
    let normal = Normal::new(spec.mean, spec.std)
        .map_err(|e| ConfigError::invalid(format!("normal({}, {}): {e}", spec.mean, spec.std)))?;
    Ok(ParameterDistribution::Truncated {
        normal,
        spec: *spec,
    })
}
