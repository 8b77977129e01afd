//! Prospect-theory choice model.
//!
//! Subjective value of an option paying `v` with probability `p`:
//!
//! ```text
//! SV(p, v) = p^(1-β) · v^α
//! ```
//!
//! The certain option is the special case p = 1. The decision variable is
//! ΔSV = SV(risky) - SV(certain), mapped to P(risky) by a logistic link with
//! inverse temperature μ. A choice is realized by one uniform draw from an
//! injected random source.

use rand::Rng;

use crate::constants::LOGISTIC_ARG_LIMIT;
use crate::error::ModelError;
use crate::types::{check_probability, check_reward, AgentParameters, Choice, Outcome, Trial};

/// Weighted value p^(1-β) · v^α, rejecting p ∉ (0, 1] and v ≤ 0.
///
/// p = 1 is valid for every β, including β = 1 where the weight is p^0 = 1.
pub fn subjective_value(p: f64, v: f64, alpha: f64, beta: f64) -> Result<f64, ModelError> {
    check_probability(p)?;
    check_reward(v)?;
    if !alpha.is_finite() {
        return Err(ModelError::NonFinite("alpha"));
    }
    if !beta.is_finite() {
        return Err(ModelError::NonFinite("beta"));
    }
    Ok(weighted_value(p, v, alpha, beta))
}

/// Unchecked form for already-validated trials.
#[inline(always)]
pub(crate) fn weighted_value(p: f64, v: f64, alpha: f64, beta: f64) -> f64 {
    p.powf(1.0 - beta) * v.powf(alpha)
}

/// Logistic link 1 / (1 + exp(-μ·ΔSV)) with the argument clamped to ±700.
#[inline(always)]
pub fn choice_probability(delta_sv: f64, mu: f64) -> f64 {
    let x = (mu * delta_sv).clamp(-LOGISTIC_ARG_LIMIT, LOGISTIC_ARG_LIMIT);
    1.0 / (1.0 + (-x).exp())
}

/// ΔSV = SV(risky) - SV(certain) for a validated trial.
#[inline(always)]
pub fn delta_subjective_value(params: &AgentParameters, trial: &Trial) -> f64 {
    let risky = weighted_value(
        trial.probability_risky(),
        trial.reward_risky(),
        params.alpha,
        params.beta,
    );
    // Certain option: p = 1, so the weight is 1 for any β.
    let certain = trial.reward_certain().powf(params.alpha);
    risky - certain
}

#[inline(always)]
pub fn risky_choice_probability(params: &AgentParameters, trial: &Trial) -> f64 {
    choice_probability(delta_subjective_value(params, trial), params.mu)
}

/// Draw u ~ U[0, 1); risky iff u < P(risky).
#[inline]
pub fn realize_choice<R: Rng + ?Sized>(p_risky: f64, rng: &mut R) -> Choice {
    let u: f64 = rng.random();
    if u < p_risky {
        Choice::Risky
    } else {
        Choice::Certain
    }
}

/// Simulate the agent's choice on one trial.
pub fn simulate_outcome<R: Rng + ?Sized>(
    params: &AgentParameters,
    trial: Trial,
    rng: &mut R,
) -> Outcome {
    let p = risky_choice_probability(params, &trial);
    Outcome {
        trial,
        choice: realize_choice(p, rng),
    }
}
