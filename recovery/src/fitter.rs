//! Maximum-likelihood fitter: bounded Nelder–Mead over (α, β, μ).
//!
//! The optimizer runs in an unconstrained space z ∈ ℝ³. Each coordinate maps
//! into its box by a scaled logistic, x = lo + (hi - lo) · σ(z), so every
//! point the simplex visits is a feasible parameter set and the likelihood
//! never sees out-of-range values. The initial simplex is the transformed
//! initial guess plus one step along each axis.
//!
//! Convergence is the solver's own criterion (standard deviation of simplex
//! costs below `sd_tolerance`). Anything else, including an exhausted
//! iteration budget, yields a [`FitResult`] with no estimate. No randomness
//! is involved: identical input gives identical output.

use argmin::core::{
    CostFunction, Error as ArgminError, Executor, State, TerminationReason, TerminationStatus,
};
use argmin::solver::neldermead::NelderMead;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::*;
use crate::error::ConfigError;
use crate::likelihood::neg_log_likelihood_auto;
use crate::types::{AgentParameters, Bounds, FitResult, Outcome};

/// Box constraints for the search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterBounds {
    pub alpha: Bounds,
    pub beta: Bounds,
    pub mu: Bounds,
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self {
            alpha: FIT_ALPHA_BOUNDS.into(),
            beta: FIT_BETA_BOUNDS.into(),
            mu: FIT_MU_BOUNDS.into(),
        }
    }
}

impl ParameterBounds {
    fn as_array(&self) -> [Bounds; 3] {
        [self.alpha, self.beta, self.mu]
    }

    pub fn contains(&self, p: &AgentParameters) -> bool {
        self.alpha.contains(p.alpha) && self.beta.contains(p.beta) && self.mu.contains(p.mu)
    }

    /// Map an unconstrained point into the box.
    pub fn from_unconstrained(&self, z: &[f64]) -> AgentParameters {
        let b = self.as_array();
        AgentParameters::new(
            squash(z[0], &b[0]),
            squash(z[1], &b[1]),
            squash(z[2], &b[2]),
        )
    }

    /// Inverse of [`from_unconstrained`](Self::from_unconstrained); values on or
    /// outside the box are pulled just inside it.
    pub fn to_unconstrained(&self, p: &AgentParameters) -> Vec<f64> {
        self.as_array()
            .iter()
            .zip(p.to_array())
            .map(|(b, x)| unsquash(x, b))
            .collect()
    }
}

#[inline]
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[inline]
fn squash(z: f64, b: &Bounds) -> f64 {
    (b.lower + b.width() * sigmoid(z)).clamp(b.lower, b.upper)
}

fn unsquash(x: f64, b: &Bounds) -> f64 {
    let t = ((x - b.lower) / b.width()).clamp(1e-9, 1.0 - 1e-9);
    (t / (1.0 - t)).ln()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitterConfig {
    /// (α, β, μ)
    #[serde(default = "FitterConfig::default_initial_guess")]
    pub initial_guess: [f64; 3],
    #[serde(default = "FitterConfig::default_max_iters")]
    pub max_iters: u64,
    #[serde(default = "FitterConfig::default_sd_tolerance")]
    pub sd_tolerance: f64,
    #[serde(default = "FitterConfig::default_initial_step")]
    pub initial_step: f64,
    // Tables after plain values so the struct serializes to TOML.
    #[serde(default)]
    pub bounds: ParameterBounds,
}

impl FitterConfig {
    fn default_initial_guess() -> [f64; 3] {
        FIT_INITIAL_GUESS
    }
    fn default_max_iters() -> u64 {
        FIT_MAX_ITERS
    }
    fn default_sd_tolerance() -> f64 {
        FIT_SD_TOLERANCE
    }
    fn default_initial_step() -> f64 {
        FIT_INITIAL_STEP
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, b) in [
            ("alpha", self.bounds.alpha),
            ("beta", self.bounds.beta),
            ("mu", self.bounds.mu),
        ] {
            if !b.is_valid() || !(b.lower < b.upper) {
                return Err(ConfigError::invalid(format!(
                    "fitter.bounds.{name}: lower {} must be below upper {}",
                    b.lower, b.upper
                )));
            }
        }
        if !(self.bounds.alpha.lower > 0.0) || !(self.bounds.mu.lower > 0.0) {
            return Err(ConfigError::invalid(
                "fitter.bounds: alpha and mu lower bounds must be positive",
            ));
        }
        if self.bounds.beta.lower < 0.0 || self.bounds.beta.upper > 1.0 {
            return Err(ConfigError::invalid(
                "fitter.bounds.beta must lie within [0, 1]",
            ));
        }
        let guess = AgentParameters::from_array(self.initial_guess);
        if !self.bounds.contains(&guess) {
            return Err(ConfigError::invalid(format!(
                "fitter.initial_guess {:?} lies outside the bounds",
                self.initial_guess
            )));
        }
        if self.max_iters == 0 {
            return Err(ConfigError::invalid("fitter.max_iters must be > 0"));
        }
        if !(self.sd_tolerance > 0.0) || !(self.initial_step > 0.0) {
            return Err(ConfigError::invalid(
                "fitter.sd_tolerance and fitter.initial_step must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for FitterConfig {
    fn default() -> Self {
        Self {
            initial_guess: Self::default_initial_guess(),
            max_iters: Self::default_max_iters(),
            sd_tolerance: Self::default_sd_tolerance(),
            initial_step: Self::default_initial_step(),
            bounds: ParameterBounds::default(),
        }
    }
}

/// Likelihood seen from the unconstrained space.
struct TransformedNll<'a> {
    outcomes: &'a [Outcome],
    bounds: ParameterBounds,
}

impl CostFunction for TransformedNll<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, z: &Self::Param) -> Result<Self::Output, ArgminError> {
        let params = self.bounds.from_unconstrained(z);
        Ok(neg_log_likelihood_auto(&params, self.outcomes))
    }
}

fn initial_simplex(config: &FitterConfig) -> Vec<Vec<f64>> {
    let origin = config
        .bounds
        .to_unconstrained(&AgentParameters::from_array(config.initial_guess));
    let mut simplex = Vec::with_capacity(origin.len() + 1);
    simplex.push(origin.clone());
    for axis in 0..origin.len() {
        let mut vertex = origin.clone();
        vertex[axis] += config.initial_step;
        simplex.push(vertex);
    }
    simplex
}

/// Fit (α, β, μ) to `outcomes` by maximum likelihood.
///
/// Expects a validated `config`. An empty dataset has a flat likelihood and
/// is reported as a failed fit.
pub fn fit(outcomes: &[Outcome], config: &FitterConfig) -> FitResult {
    if outcomes.is_empty() {
        return FitResult::failed(f64::NAN, 0);
    }

    let problem = TransformedNll {
        outcomes,
        bounds: config.bounds,
    };
    let solver = NelderMead::new(initial_simplex(config)).with_sd_tolerance(config.sd_tolerance);
    let solver = match solver {
        Ok(s) => s,
        Err(e) => {
            warn!("Nelder-Mead setup failed: {e}");
            return FitResult::failed(f64::NAN, 0);
        }
    };

    let result = match Executor::new(problem, solver)
        .configure(|state| state.max_iters(config.max_iters))
        .run()
    {
        Ok(r) => r,
        Err(e) => {
            warn!("optimizer error on {} outcomes: {e}", outcomes.len());
            return FitResult::failed(f64::NAN, 0);
        }
    };

    let state = result.state();
    let iterations = state.get_iter();
    let best_cost = state.get_best_cost();
    let converged = matches!(
        state.get_termination_status(),
        TerminationStatus::Terminated(TerminationReason::SolverConverged)
    );

    match (converged, state.get_best_param()) {
        (true, Some(z)) => {
            let estimate = config.bounds.from_unconstrained(z);
            debug!(
                n = outcomes.len(),
                iterations,
                nll = best_cost,
                "fit converged: alpha={:.4} beta={:.4} mu={:.4}",
                estimate.alpha,
                estimate.beta,
                estimate.mu
            );
            FitResult {
                estimate: Some(estimate),
                converged: true,
                neg_log_likelihood: best_cost,
                iterations,
            }
        }
        _ => {
            debug!(
                n = outcomes.len(),
                iterations,
                status = ?state.get_termination_status(),
                "fit did not converge"
            );
            FitResult::failed(best_cost, iterations)
        }
    }
}
