//! # Prospect Recovery: simulate risky choices and recover prospect-theory parameters
//!
//! Simulated agents choose between a risky option (probability p of reward V)
//! and a certain reward c. Each agent has three parameters: value curvature α,
//! probability-weighting exponent β and inverse temperature μ. The crate
//! draws a population, simulates its choices, re-fits (α, β, μ) by maximum
//! likelihood on growing trial prefixes and reports how recovery error shrinks
//! with the number of trials.
//!
//! ## Pipeline
//!
//! | Stage | Rust module | Description |
//! |-------|-------------|-------------|
//! | Parameters | [`sampler`] | Truncated-Gaussian or uniform population draws |
//! | Stimuli | [`trials`] | Discrete or continuous p, risky and certain rewards |
//! | Choices | [`choice_model`] | SV = p^(1-β) · V^α, logistic choice rule |
//! | Likelihood | [`likelihood`] | Clamped, chunked negative log-likelihood |
//! | Fit | [`fitter`] | Bounded Nelder–Mead (argmin) |
//! | Recovery | [`simulation`] | Parallel population runs, per-threshold MSE / SEM / r |
//!
//! ## Model
//!
//! - Risky value `SV_r = p^(1-β) · V^α`, certain value `SV_c = c^α`.
//! - `P(risky) = 1 / (1 + exp(-μ · (SV_r - SV_c)))`, argument clamped to ±700.
//! - Likelihood floors P into [1e-6, 1 - 1e-6].
//!
//! ## Reproducibility
//!
//! Every agent draws from its own `SmallRng` seeded by SplitMix64 mixing of
//! the base seed and the agent index. Given a config, records are identical
//! across runs and thread counts.

#![allow(clippy::needless_range_loop)]

pub mod choice_model;
pub mod cli;
pub mod config;
pub mod constants;
pub mod env_config;
pub mod error;
pub mod fitter;
pub mod likelihood;
pub mod sampler;
pub mod simulation;
pub mod trials;
pub mod types;

pub use config::RecoveryConfig;
pub use error::{ConfigError, ModelError, RecoveryError, Result};
pub use types::{AgentParameters, Choice, Dataset, FitResult, Outcome, RecoveryRecord, Trial};
