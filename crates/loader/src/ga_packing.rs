//! Genetic algorithm over placement sequences.
//!
//! Individuals are [`PackingSequence`]s: order crossover on the permutation,
//! uniform crossover on orientation genes, swap or rotation mutation. The
//! initial population holds the heuristic sequence plus random individuals,
//! so the best individual never scores below the extreme-point heuristic.

use crate::placement_pass::Decoder;
use rand::Rng;
use std::time::Duration;
use truckpack_core::ga::{GaConfig, GaProblem, GaResult, GaRunner, Individual};
use truckpack_core::{
    PackOptions, PackingResult, PackingSequence, PackingStrategy, Problem, Result, StopReason,
    StrategyParams,
};

/// GA problem over [`PackingSequence`]s.
pub struct SequenceEvolution<'a> {
    decoder: Decoder<'a>,
    seed: PackingSequence,
}

impl<'a> SequenceEvolution<'a> {
    /// Creates the problem with `seed` injected into the first generation.
    pub fn new(decoder: Decoder<'a>, seed: PackingSequence) -> Self {
        Self { decoder, seed }
    }
}

impl GaProblem for SequenceEvolution<'_> {
    type Individual = PackingSequence;

    fn evaluate(&self, individual: &mut PackingSequence) {
        let score = self.decoder.evaluate(individual);
        individual.set_fitness(score);
    }

    fn initialize_population<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<PackingSequence> {
        let mut population = Vec::with_capacity(size);
        population.push(self.seed.clone());
        while population.len() < size {
            population.push(PackingSequence::random(self.seed.len(), rng));
        }
        population
    }

    fn on_generation(&self, generation: u32, best: &PackingSequence, _population: &[PackingSequence]) {
        log::debug!(
            "GA Gen {}: fitness={:.4}, instances={}",
            generation,
            best.fitness(),
            best.len()
        );
    }
}

/// Builds a GA configuration from the strategy tunables.
pub fn ga_config(params: &StrategyParams, generations: u32, time_limit: Option<Duration>) -> GaConfig {
    GaConfig::default()
        .with_population_size(params.population_size)
        .with_max_generations(generations)
        .with_crossover_rate(params.crossover_rate)
        .with_mutation_rate(params.mutation_rate)
        .with_elite_count(params.elite_count)
        .with_stagnation_limit(u32::try_from(params.stagnation_limit).unwrap_or(u32::MAX))
        .with_time_limit(time_limit)
}

/// Evolves a population seeded with `seed`.
///
/// Returns the seed itself, unevolved, if the runner produced nothing.
pub fn evolve<R: Rng>(
    decoder: Decoder<'_>,
    seed: PackingSequence,
    config: GaConfig,
    rng: &mut R,
) -> GaResult<PackingSequence> {
    let fallback = seed.clone();
    GaRunner::new(config, SequenceEvolution::new(decoder, seed))
        .run_with_rng(rng)
        .unwrap_or_else(|| GaResult {
            best: fallback,
            generations: 0,
            elapsed: Duration::ZERO,
            stop_reason: StopReason::Completed,
            history: Vec::new(),
        })
}

/// Genetic algorithm strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaPacker;

impl GaPacker {
    /// Creates a new packer.
    pub fn new() -> Self {
        Self
    }
}

impl PackingStrategy for GaPacker {
    fn pack(&self, problem: &Problem, options: &PackOptions) -> Result<PackingResult> {
        let budget = options.start_budget();
        let params = &options.params;
        log::info!(
            "genetic: packing {} instances, population {}",
            problem.instance_count(),
            params.population_size
        );

        let decoder = Decoder::new(problem, params.decoder, options.weights);
        let outcome = evolve(
            decoder,
            Decoder::heuristic_seed(problem),
            ga_config(params, params.generations, budget.remaining()),
            &mut options.rng(),
        );

        let result = decoder
            .result("genetic", decoder.decode(&outcome.best))
            .with_stop_reason(outcome.stop_reason)
            .with_iterations(u64::from(outcome.generations))
            .with_history(outcome.history)
            .with_elapsed_ms(budget.elapsed_ms());

        log::info!(
            "genetic: placed {}/{} after {} generations ({:?})",
            result.placed_count(),
            problem.instance_count(),
            result.iterations,
            result.stop_reason
        );
        Ok(result)
    }
}
