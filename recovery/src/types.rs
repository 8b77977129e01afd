//! Core data types: agent parameters, trials, outcomes, datasets and fit results.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Latent decision parameters of one simulated agent.
///
/// - `alpha`: value sensitivity (reward exponent), α > 0
/// - `beta`: probability weighting, β ∈ [0, 1]; the probability exponent is 1 - β
/// - `mu`: inverse temperature of the logistic choice rule, μ > 0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentParameters {
    pub alpha: f64,
    pub beta: f64,
    pub mu: f64,
}

impl AgentParameters {
    pub const fn new(alpha: f64, beta: f64, mu: f64) -> Self {
        Self { alpha, beta, mu }
    }

    pub fn from_array(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.alpha, self.beta, self.mu]
    }
}

/// Closed interval `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.lower && x <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn is_valid(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite() && self.lower <= self.upper
    }
}

impl From<(f64, f64)> for Bounds {
    fn from((lower, upper): (f64, f64)) -> Self {
        Self::new(lower, upper)
    }
}

/// One stimulus pair: a risky lottery against a certain amount.
///
/// Only constructible through [`Trial::new`], so every trial in a dataset
/// satisfies p ∈ (0, 1] and strictly positive rewards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trial {
    probability_risky: f64,
    reward_risky: f64,
    reward_certain: f64,
}

impl Trial {
    pub fn new(
        probability_risky: f64,
        reward_risky: f64,
        reward_certain: f64,
    ) -> Result<Self, ModelError> {
        check_probability(probability_risky)?;
        check_reward(reward_risky)?;
        check_reward(reward_certain)?;
        Ok(Self {
            probability_risky,
            reward_risky,
            reward_certain,
        })
    }

    #[inline]
    pub fn probability_risky(&self) -> f64 {
        self.probability_risky
    }

    #[inline]
    pub fn reward_risky(&self) -> f64 {
        self.reward_risky
    }

    #[inline]
    pub fn reward_certain(&self) -> f64 {
        self.reward_certain
    }
}

/// p must lie in (0, 1]. p = 0 under a fractional exponent is undefined.
pub(crate) fn check_probability(p: f64) -> Result<(), ModelError> {
    if !p.is_finite() {
        return Err(ModelError::NonFinite("probability"));
    }
    if p <= 0.0 || p > 1.0 {
        return Err(ModelError::ProbabilityOutOfRange(p));
    }
    Ok(())
}

pub(crate) fn check_reward(v: f64) -> Result<(), ModelError> {
    if !v.is_finite() {
        return Err(ModelError::NonFinite("reward"));
    }
    if v <= 0.0 {
        return Err(ModelError::NonPositiveReward(v));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Risky,
    Certain,
}

impl Choice {
    /// 1 for risky, 0 for certain (export encoding).
    pub fn as_indicator(self) -> u8 {
        match self {
            Choice::Risky => 1,
            Choice::Certain => 0,
        }
    }
}

/// A trial together with the choice made on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Outcome {
    pub trial: Trial,
    pub choice: Choice,
}

/// Ordered outcomes of one agent. Index order is trial order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    outcomes: Vec<Outcome>,
}

impl Dataset {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// The first `n` outcomes (all of them if `n` exceeds the length).
    pub fn prefix(&self, n: usize) -> &[Outcome] {
        &self.outcomes[..n.min(self.outcomes.len())]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Outcome> {
        self.outcomes.iter()
    }

    /// Fraction of risky choices (NaN when empty).
    pub fn risky_rate(&self) -> f64 {
        let risky = self
            .outcomes
            .iter()
            .filter(|o| o.choice == Choice::Risky)
            .count();
        risky as f64 / self.outcomes.len() as f64
    }
}

impl From<Vec<Outcome>> for Dataset {
    fn from(outcomes: Vec<Outcome>) -> Self {
        Self { outcomes }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Outcome;
    type IntoIter = std::slice::Iter<'a, Outcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

/// Result of fitting one dataset.
///
/// `estimate` is `None` when the optimizer did not converge within its
/// budget; exports write the missing estimate as NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitResult {
    pub estimate: Option<AgentParameters>,
    pub converged: bool,
    /// Best cost reached, also reported for failed fits.
    pub neg_log_likelihood: f64,
    pub iterations: u64,
}

impl FitResult {
    pub fn failed(neg_log_likelihood: f64, iterations: u64) -> Self {
        Self {
            estimate: None,
            converged: false,
            neg_log_likelihood,
            iterations,
        }
    }

    /// Estimate as an array, NaN-filled when missing.
    pub fn estimate_or_nan(&self) -> [f64; 3] {
        self.estimate
            .map(AgentParameters::to_array)
            .unwrap_or([f64::NAN; 3])
    }
}

/// Truth, fit and trial count for one (agent, threshold) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecoveryRecord {
    pub agent: usize,
    pub num_trials: usize,
    pub truth: AgentParameters,
    pub fit: FitResult,
}

impl RecoveryRecord {
    /// Per-parameter squared errors, `None` for a failed fit.
    pub fn squared_errors(&self) -> Option<[f64; 3]> {
        let est = self.fit.estimate?;
        Some([
            (est.alpha - self.truth.alpha).powi(2),
            (est.beta - self.truth.beta).powi(2),
            (est.mu - self.truth.mu).powi(2),
        ])
    }
}
