//! Model constants and population defaults.
//!
//! Groups the numeric settings shared by the choice model, the likelihood and
//! the fitter:
//! - logistic clamp: [`LOGISTIC_ARG_LIMIT`] = 700 (exp(±700) is finite in f64)
//! - likelihood floor: [`PROBABILITY_EPSILON`] = 1e-6
//! - population priors for α, β, μ (truncated Gaussian and uniform)
//! - optimizer box, initial guess and budget

/// |μ·ΔSV| is clamped to this before exponentiation.
pub const LOGISTIC_ARG_LIMIT: f64 = 700.0;

/// P(risky) is clamped into [ε, 1-ε] before taking logs.
pub const PROBABILITY_EPSILON: f64 = 1e-6;

/// Outcomes per reduction chunk in the likelihood.
///
/// Chunk sums are added in chunk order by both the sequential and the
/// parallel reduction, which keeps the two bit-identical.
pub const LIKELIHOOD_CHUNK: usize = 1024;

/// Datasets at least this long are reduced on the rayon pool.
pub const PARALLEL_LIKELIHOOD_MIN_OUTCOMES: usize = 16 * LIKELIHOOD_CHUNK;

/// Attempt budget for rejection sampling from a truncated Gaussian.
pub const MAX_REJECTION_DRAWS: usize = 10_000;

// ── Truncated-Gaussian population (mean, std, lower, upper) ─────────────

pub const ALPHA_PRIOR_MEAN: f64 = 0.65;
pub const ALPHA_PRIOR_STD: f64 = 0.33;
pub const ALPHA_PRIOR_LOWER: f64 = 0.05;

pub const BETA_PRIOR_MEAN: f64 = 0.30;
pub const BETA_PRIOR_STD: f64 = 0.24;
pub const BETA_PRIOR_LOWER: f64 = 0.0;
pub const BETA_PRIOR_UPPER: f64 = 1.0;

pub const MU_PRIOR_MEAN: f64 = 6.77;
pub const MU_PRIOR_STD: f64 = 3.01;
pub const MU_PRIOR_LOWER: f64 = 0.05;

// ── Uniform population (recovery sweep) ─────────────────────────────────

pub const ALPHA_UNIFORM: (f64, f64) = (0.3, 1.5);
pub const BETA_UNIFORM: (f64, f64) = (0.2, 1.0);
pub const MU_UNIFORM: (f64, f64) = (1.0, 15.0);

// ── Stimulus defaults ───────────────────────────────────────────────────

pub const DEFAULT_RISKY_PROBABILITIES: [f64; 2] = [0.5, 0.9];
pub const DEFAULT_RISKY_REWARD: (f64, f64) = (1.0, 5.0);
pub const DEFAULT_CERTAIN_REWARD: f64 = 1.0;

// ── Fitter ──────────────────────────────────────────────────────────────

pub const FIT_ALPHA_BOUNDS: (f64, f64) = (0.01, 2.0);
pub const FIT_BETA_BOUNDS: (f64, f64) = (0.0, 1.0);
pub const FIT_MU_BOUNDS: (f64, f64) = (0.01, 20.0);

/// Initial guess (α, β, μ).
pub const FIT_INITIAL_GUESS: [f64; 3] = [0.5, 0.3, 5.0];

pub const FIT_MAX_ITERS: u64 = 1000;

/// Convergence when the standard deviation of the simplex costs drops below this.
pub const FIT_SD_TOLERANCE: f64 = 1e-8;

/// Initial simplex edge length in the unconstrained (logit) space.
pub const FIT_INITIAL_STEP: f64 = 0.5;

// ── Harness ─────────────────────────────────────────────────────────────

pub const DEFAULT_NUM_AGENTS: usize = 100;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_THRESHOLD_STEP: usize = 100;
pub const DEFAULT_MAX_TRIALS: usize = 1400;
