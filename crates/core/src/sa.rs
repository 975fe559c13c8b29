//! Simulated annealing framework.
//!
//! Temperature decays geometrically and never increases. A run ends at the
//! final temperature, the iteration cap, the stagnation limit or the time
//! limit, whichever comes first; the best solution seen is always returned.

use crate::result::StopReason;
use crate::solver::StrategyParams;
use rand::prelude::*;
use std::time::{Duration, Instant};

/// Annealing schedule and stop rules.
#[derive(Debug, Clone, PartialEq)]
pub struct SaConfig {
    pub initial_temperature: f64,
    pub final_temperature: f64,
    /// Factor applied to the temperature after each level, in `(0, 1)`.
    pub cooling_rate: f64,
    pub iterations_per_level: usize,
    pub max_iterations: u64,
    /// Iterations without a new best before the run ends.
    pub stagnation_limit: u64,
    pub time_limit: Option<Duration>,
}

impl SaConfig {
    /// Builds a schedule from strategy tunables, clamping degenerate values.
    pub fn from_params(params: &StrategyParams, time_limit: Option<Duration>) -> Self {
        Self {
            initial_temperature: params.initial_temperature.max(1e-9),
            final_temperature: params.final_temperature.max(1e-12),
            cooling_rate: params.cooling_rate.clamp(0.001, 0.9999),
            iterations_per_level: params.iterations_per_temperature.max(1),
            max_iterations: params.max_iterations,
            stagnation_limit: params.stagnation_limit,
            time_limit,
        }
    }
}

impl Default for SaConfig {
    fn default() -> Self {
        Self::from_params(&StrategyParams::default(), None)
    }
}

/// Neighbourhood moves an annealing problem may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborhoodOperator {
    /// Exchange two positions.
    Swap,
    /// Move one element elsewhere.
    Relocate,
    /// Reverse a segment.
    Inversion,
    /// Change one orientation gene.
    Rotation,
}

/// A search space the annealer can walk. Scores are maximised.
pub trait SaProblem: Send + Sync {
    type Solution: Clone + Send;

    /// Solution the walk starts from.
    fn start(&self) -> Self::Solution;

    /// Operators to draw from; an empty list ends the run immediately.
    fn operators(&self) -> Vec<NeighborhoodOperator>;

    fn perturb<R: Rng>(
        &self,
        solution: &Self::Solution,
        operator: NeighborhoodOperator,
        rng: &mut R,
    ) -> Self::Solution;

    fn score(&self, solution: &Self::Solution) -> f64;
}

/// Outcome of an annealing run.
#[derive(Debug, Clone)]
pub struct SaResult<S> {
    pub best: S,
    pub best_score: f64,
    /// Temperature when the run ended.
    pub temperature: f64,
    pub iterations: u64,
    pub elapsed: Duration,
    pub stop_reason: StopReason,
    /// Best score after each temperature level.
    pub history: Vec<f64>,
}

/// Anneals `problem` from its start solution.
///
/// Worse neighbours are accepted with probability `exp(Δ / T)`. Reaching the
/// final temperature or stagnating is a normal completion; the iteration cap
/// and time limit are reported as early stops.
pub fn run<P: SaProblem, R: Rng>(problem: &P, config: &SaConfig, rng: &mut R) -> SaResult<P::Solution> {
    let start = Instant::now();
    let operators = problem.operators();

    let mut current = problem.start();
    let mut current_score = problem.score(&current);
    let mut best = current.clone();
    let mut best_score = current_score;

    let mut temperature = config.initial_temperature;
    let mut iterations = 0u64;
    let mut since_best = 0u64;
    let mut stop_reason = StopReason::Completed;
    let mut history = Vec::new();

    'levels: while temperature > config.final_temperature && !operators.is_empty() {
        if config.time_limit.is_some_and(|limit| start.elapsed() >= limit) {
            stop_reason = StopReason::TimeBudget;
            break;
        }

        for _ in 0..config.iterations_per_level {
            if iterations >= config.max_iterations {
                stop_reason = StopReason::IterationCap;
                break 'levels;
            }
            iterations += 1;

            let operator = operators[rng.gen_range(0..operators.len())];
            let candidate = problem.perturb(&current, operator, rng);
            let candidate_score = problem.score(&candidate);

            let delta = candidate_score - current_score;
            if delta >= 0.0 || rng.gen::<f64>() < (delta / temperature).exp() {
                current = candidate;
                current_score = candidate_score;
            }

            if current_score > best_score {
                best = current.clone();
                best_score = current_score;
                since_best = 0;
            } else {
                since_best += 1;
                if since_best >= config.stagnation_limit {
                    break 'levels;
                }
            }
        }

        history.push(best_score);
        log::debug!(
            "SA level T={:.5}: iteration {}, best={:.4}",
            temperature,
            iterations,
            best_score
        );
        temperature *= config.cooling_rate;
    }

    history.push(best_score);

    SaResult {
        best,
        best_score,
        temperature,
        iterations,
        elapsed: start.elapsed(),
        stop_reason,
        history,
    }
}
