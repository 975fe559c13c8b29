//! Strategy contract, run options and the cooperative time budget.

use crate::error::{Error, Result};
use crate::problem::Problem;
use crate::result::{PackingResult, ScoreWeights};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Placement procedure used to decode an encoded solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DecoderKind {
    /// Extreme-point anchors.
    #[default]
    ExtremePoints,
    /// Skyline height-map anchors.
    Skyline,
}

/// Strategy-specific tunables.
///
/// Every field has a documented default; strategies read only the fields
/// they use.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct StrategyParams {
    /// Population size for the genetic algorithm (default 40).
    pub population_size: usize,
    /// Generations for population strategies (default 120).
    pub generations: u32,
    /// Crossover probability (default 0.85).
    pub crossover_rate: f64,
    /// Mutation probability (default 0.1).
    pub mutation_rate: f64,
    /// Individuals copied unchanged into the next generation (default 2).
    pub elite_count: usize,

    /// Starting annealing temperature (default 1.0).
    pub initial_temperature: f64,
    /// Temperature at which annealing stops (default 1e-3).
    pub final_temperature: f64,
    /// Geometric cooling factor per level (default 0.95).
    pub cooling_rate: f64,
    /// Moves tried per temperature level (default 20).
    pub iterations_per_temperature: usize,
    /// Iteration cap for local search (default 2000).
    pub max_iterations: u64,
    /// Iterations, or GA generations, without improvement before stopping
    /// (default 300).
    pub stagnation_limit: u64,

    /// Iterations a move stays tabu (default 12).
    pub tabu_tenure: u64,
    /// Order positions in the sliding tabu window (default 8).
    pub neighborhood_size: usize,

    /// Node-expansion limit for branch-and-bound (default 200 000).
    pub node_limit: u64,

    /// Particles in the swarm (default 24).
    pub swarm_size: usize,
    /// Velocity inertia (default 0.7).
    pub inertia: f64,
    /// Pull towards the personal best (default 1.5).
    pub cognitive: f64,
    /// Pull towards the global best (default 1.5).
    pub social: f64,

    /// Ants per iteration (default 20).
    pub ant_count: usize,
    /// Pheromone evaporation rate (default 0.2).
    pub evaporation: f64,
    /// Pheromone exponent (default 1.0).
    pub pheromone_alpha: f64,
    /// Heuristic exponent (default 2.0).
    pub heuristic_beta: f64,

    /// Share of the hybrid run spent on annealing polish (default 0.3).
    pub polish_fraction: f64,

    /// Placement procedure for encoded solutions (default extreme points).
    pub decoder: DecoderKind,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            population_size: 40,
            generations: 120,
            crossover_rate: 0.85,
            mutation_rate: 0.1,
            elite_count: 2,
            initial_temperature: 1.0,
            final_temperature: 1e-3,
            cooling_rate: 0.95,
            iterations_per_temperature: 20,
            max_iterations: 2000,
            stagnation_limit: 300,
            tabu_tenure: 12,
            neighborhood_size: 8,
            node_limit: 200_000,
            swarm_size: 24,
            inertia: 0.7,
            cognitive: 1.5,
            social: 1.5,
            ant_count: 20,
            evaporation: 0.2,
            pheromone_alpha: 1.0,
            heuristic_beta: 2.0,
            polish_fraction: 0.3,
            decoder: DecoderKind::ExtremePoints,
        }
    }
}

impl StrategyParams {
    /// Validates ranges that would otherwise make a strategy misbehave.
    pub fn validate(&self) -> Result<()> {
        let rates = [
            ("crossoverRate", self.crossover_rate),
            ("mutationRate", self.mutation_rate),
            ("evaporation", self.evaporation),
            ("polishFraction", self.polish_fraction),
        ];
        for (name, value) in rates {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidInput(format!(
                    "{} must lie in [0, 1] ({})",
                    name, value
                )));
            }
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(Error::InvalidInput(format!(
                "coolingRate must lie in (0, 1) ({})",
                self.cooling_rate
            )));
        }
        if !(self.initial_temperature > 0.0 && self.final_temperature > 0.0) {
            return Err(Error::InvalidInput(
                "temperatures must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Options shared by every strategy run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackOptions {
    /// RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Wall-clock budget; `None` runs until the strategy's own caps.
    pub time_budget: Option<Duration>,
    /// Strategy tunables.
    pub params: StrategyParams,
    /// Efficiency score weights.
    pub weights: ScoreWeights,
}

impl PackOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the time budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Sets the strategy tunables.
    pub fn with_params(mut self, params: StrategyParams) -> Self {
        self.params = params;
        self
    }

    /// Sets the score weights.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Returns a fresh RNG for one run.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Starts the wall clock for one run.
    pub fn start_budget(&self) -> TimeBudget {
        TimeBudget::start(self.time_budget)
    }

    /// Validates tunables and weights.
    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        self.weights.validate()
    }
}

/// Cooperative wall-clock cutoff checked at iteration boundaries.
#[derive(Debug, Clone, Copy)]
pub struct TimeBudget {
    start: Instant,
    limit: Option<Duration>,
}

impl TimeBudget {
    /// Starts the clock now.
    pub fn start(limit: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            limit,
        }
    }

    /// Returns a budget with no limit.
    pub fn unlimited() -> Self {
        Self::start(None)
    }

    /// Returns true once the limit has passed.
    pub fn exhausted(&self) -> bool {
        self.limit.is_some_and(|limit| self.start.elapsed() >= limit)
    }

    /// Returns the time since the clock started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Returns the elapsed time in whole milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Returns the time left, or `None` without a limit.
    pub fn remaining(&self) -> Option<Duration> {
        self.limit
            .map(|limit| limit.saturating_sub(self.start.elapsed()))
    }

    /// Returns the configured limit.
    pub fn limit(&self) -> Option<Duration> {
        self.limit
    }
}

/// A packing strategy.
///
/// Implementations must be pure functions of the problem, options and seed:
/// no shared mutable state, so any number of runs may execute concurrently.
/// A strategy never fails because cartons do not fit; misfits are reported
/// through the result's unplaced list.
pub trait PackingStrategy: Send + Sync {
    /// Packs the problem's instances into its truck.
    fn pack(&self, problem: &Problem, options: &PackOptions) -> Result<PackingResult>;
}
