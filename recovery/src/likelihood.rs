//! Negative log-likelihood of observed choices under candidate parameters.
//!
//! For each outcome: ΔSV → P(risky) via the clamped logistic → clamp P into
//! [ε, 1-ε] → add -ln P for a risky choice or -ln(1-P) for a certain one.
//!
//! The reduction is chunked: each chunk of [`LIKELIHOOD_CHUNK`] outcomes is
//! summed on its own, then chunk sums are added in chunk order. The parallel
//! variant computes the same chunk sums on the rayon pool and adds them in
//! the same order, so both variants return bit-identical results. Both are
//! pure and can be called repeatedly by the optimizer.

use rayon::prelude::*;

use crate::choice_model::risky_choice_probability;
use crate::constants::{LIKELIHOOD_CHUNK, PARALLEL_LIKELIHOOD_MIN_OUTCOMES, PROBABILITY_EPSILON};
use crate::types::{AgentParameters, Choice, Outcome};

#[inline(always)]
fn outcome_cost(params: &AgentParameters, outcome: &Outcome) -> f64 {
    let p = risky_choice_probability(params, &outcome.trial)
        .clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
    match outcome.choice {
        Choice::Risky => -p.ln(),
        Choice::Certain => -(1.0 - p).ln(),
    }
}

#[inline]
fn chunk_cost(params: &AgentParameters, chunk: &[Outcome]) -> f64 {
    chunk.iter().map(|o| outcome_cost(params, o)).sum()
}

/// Summed -ln L over `outcomes` (0.0 for an empty slice).
pub fn neg_log_likelihood(params: &AgentParameters, outcomes: &[Outcome]) -> f64 {
    outcomes
        .chunks(LIKELIHOOD_CHUNK)
        .map(|chunk| chunk_cost(params, chunk))
        .sum()
}

/// Same value as [`neg_log_likelihood`], chunks evaluated in parallel.
pub fn neg_log_likelihood_par(params: &AgentParameters, outcomes: &[Outcome]) -> f64 {
    let chunk_sums: Vec<f64> = outcomes
        .par_chunks(LIKELIHOOD_CHUNK)
        .map(|chunk| chunk_cost(params, chunk))
        .collect();
    chunk_sums.iter().sum()
}

/// Picks the parallel reduction for long datasets.
pub fn neg_log_likelihood_auto(params: &AgentParameters, outcomes: &[Outcome]) -> f64 {
    if outcomes.len() >= PARALLEL_LIKELIHOOD_MIN_OUTCOMES {
        neg_log_likelihood_par(params, outcomes)
    } else {
        neg_log_likelihood(params, outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice_model::simulate_outcome;
    use crate::trials::{TrialConfig, TrialGenerator};
    use crate::types::Trial;
    use approx::assert_abs_diff_eq;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const TRUTH: AgentParameters = AgentParameters::new(0.65, 0.30, 6.77);

    fn simulate(params: &AgentParameters, n: usize, seed: u64) -> Vec<Outcome> {
        let gen = TrialGenerator::new(TrialConfig::default()).unwrap();
        let mut rng = SmallRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                let trial = gen.next_trial(&mut rng).unwrap();
                simulate_outcome(params, trial, &mut rng)
            })
            .collect()
    }

    #[test]
    fn test_empty_dataset_is_zero() {
        assert_eq!(neg_log_likelihood(&TRUTH, &[]), 0.0);
        assert_eq!(neg_log_likelihood_par(&TRUTH, &[]), 0.0);
    }

    #[test]
    fn test_single_outcome_matches_closed_form() {
        let trial = Trial::new(0.9, 2.0, 1.0).unwrap();
        let p = risky_choice_probability(&TRUTH, &trial);
        let risky = [Outcome {
            trial,
            choice: Choice::Risky,
        }];
        let certain = [Outcome {
            trial,
            choice: Choice::Certain,
        }];
        assert_abs_diff_eq!(neg_log_likelihood(&TRUTH, &risky), -p.ln(), epsilon = 1e-12);
        assert_abs_diff_eq!(
            neg_log_likelihood(&TRUTH, &certain),
            -(1.0 - p).ln(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_clamped_probability_keeps_cost_finite() {
        // μ·ΔSV far past the clamp: P saturates to 1, cost of "certain" is -ln(ε).
        let trial = Trial::new(1.0, 100.0, 1.0).unwrap();
        let params = AgentParameters::new(1.0, 0.0, 20.0);
        let outcome = [Outcome {
            trial,
            choice: Choice::Certain,
        }];
        let nll = neg_log_likelihood(&params, &outcome);
        assert!(nll.is_finite());
        assert_abs_diff_eq!(nll, -(PROBABILITY_EPSILON).ln(), epsilon = 1e-6);
    }

    #[test]
    fn test_pure_and_repeatable() {
        let data = simulate(&TRUTH, 3000, 1);
        let a = neg_log_likelihood(&TRUTH, &data);
        let b = neg_log_likelihood(&TRUTH, &data);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_parallel_bit_identical() {
        let data = simulate(&TRUTH, 3 * LIKELIHOOD_CHUNK + 17, 2);
        let candidate = AgentParameters::new(0.8, 0.1, 3.0);
        let seq = neg_log_likelihood(&candidate, &data);
        let par = neg_log_likelihood_par(&candidate, &data);
        assert_eq!(seq.to_bits(), par.to_bits());
        assert_eq!(
            neg_log_likelihood_auto(&candidate, &data).to_bits(),
            seq.to_bits()
        );
    }

    #[test]
    fn test_truth_beats_perturbations() {
        let data = simulate(&TRUTH, 10_000, 3);
        let at_truth = neg_log_likelihood(&TRUTH, &data);
        let perturbed = [
            AgentParameters::new(TRUTH.alpha + 0.2, TRUTH.beta, TRUTH.mu),
            AgentParameters::new(TRUTH.alpha - 0.2, TRUTH.beta, TRUTH.mu),
            AgentParameters::new(TRUTH.alpha, TRUTH.beta + 0.2, TRUTH.mu),
            AgentParameters::new(TRUTH.alpha, TRUTH.beta - 0.2, TRUTH.mu),
            AgentParameters::new(TRUTH.alpha, TRUTH.beta, TRUTH.mu + 3.0),
            AgentParameters::new(TRUTH.alpha, TRUTH.beta, TRUTH.mu - 3.0),
        ];
        for p in &perturbed {
            let nll = neg_log_likelihood(p, &data);
            assert!(nll > at_truth, "{p:?}: {nll} <= {at_truth}");
        }
    }
}
