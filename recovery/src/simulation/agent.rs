//! Agent simulation: draws each agent's parameters and choice dataset.
//!
//! Every agent gets its own `SmallRng` seeded with `derive_seed(seed, agent)`.
//! Within an agent the draw order is fixed: parameters first, then for each
//! trial the stimulus followed by the choice. Agents run in parallel on the
//! rayon pool and the output is in agent order regardless of scheduling.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;
use tracing::info;

use crate::choice_model::simulate_outcome;
use crate::config::RecoveryConfig;
use crate::error::{ModelError, RecoveryError, Result};
use crate::sampler::ParameterSampler;
use crate::trials::TrialGenerator;
use crate::types::{AgentParameters, Dataset};

use super::seeds::derive_seed;

/// One simulated agent: ground truth and its full dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRun {
    pub agent: usize,
    pub truth: AgentParameters,
    pub dataset: Dataset,
}

/// Simulate `num_trials` choices of an agent with known parameters.
pub fn simulate_agent<R: Rng + ?Sized>(
    truth: &AgentParameters,
    generator: &TrialGenerator,
    num_trials: usize,
    rng: &mut R,
) -> std::result::Result<Dataset, ModelError> {
    let mut dataset = Dataset::with_capacity(num_trials);
    for _ in 0..num_trials {
        let trial = generator.next_trial(rng)?;
        dataset.push(simulate_outcome(truth, trial, rng));
    }
    Ok(dataset)
}

/// The generator for agent `agent` under base seed `seed`.
pub fn agent_rng(seed: u64, agent: usize) -> SmallRng {
    SmallRng::seed_from_u64(derive_seed(seed, agent as u64))
}

/// Draw a population of `config.num_agents` agents with
/// `config.trials_per_agent` trials each.
///
/// The config must already be validated.
pub fn simulate_population(config: &RecoveryConfig) -> Result<Vec<AgentRun>> {
    let sampler = ParameterSampler::new(&config.population)?;
    let generator = TrialGenerator::new(config.trials.clone())?;
    let start = Instant::now();

    let runs = (0..config.num_agents)
        .into_par_iter()
        .map(|agent| {
            let mut rng = agent_rng(config.seed, agent);
            let truth = sampler
                .sample(&mut rng)
                .map_err(|e| RecoveryError::model(agent, e))?;
            let dataset = simulate_agent(&truth, &generator, config.trials_per_agent, &mut rng)
                .map_err(|e| RecoveryError::model(agent, e))?;
            Ok(AgentRun {
                agent,
                truth,
                dataset,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        agents = config.num_agents,
        trials = config.trials_per_agent,
        population = config.population.name(),
        "simulated population in {:.2}s",
        start.elapsed().as_secs_f64()
    );
    Ok(runs)
}
