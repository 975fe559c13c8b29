//! Tabu search framework.
//!
//! Each iteration enumerates the problem's neighborhood in a fixed order,
//! evaluates the resulting solutions in parallel and takes the best
//! admissible one: a move is admissible if it is not tabu, or if it beats the
//! best solution so far (aspiration). The applied move stays tabu for
//! `tenure` iterations. The RNG only picks among equally scored moves.

use crate::result::StopReason;
use rand::prelude::*;
use rayon::prelude::*;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for tabu search.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TabuConfig {
    /// Iterations an applied move stays forbidden.
    pub tenure: u64,
    /// Maximum iterations.
    pub max_iterations: u64,
    /// Iterations without a new best before stopping.
    pub stagnation_limit: Option<u64>,
    /// Maximum time limit (None = unlimited).
    pub time_limit: Option<Duration>,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            tenure: 12,
            max_iterations: 2000,
            stagnation_limit: Some(300),
            time_limit: None,
        }
    }
}

impl TabuConfig {
    /// Sets the tabu tenure.
    pub fn with_tenure(mut self, tenure: u64) -> Self {
        self.tenure = tenure;
        self
    }

    /// Sets the maximum iterations.
    pub fn with_max_iterations(mut self, iterations: u64) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Sets the stagnation limit.
    pub fn with_stagnation_limit(mut self, iterations: u64) -> Self {
        self.stagnation_limit = Some(iterations);
        self
    }

    /// Sets the time limit.
    pub fn with_time_limit(mut self, duration: Option<Duration>) -> Self {
        self.time_limit = duration;
        self
    }
}

/// Problem-specific tabu operations.
pub trait TabuProblem: Send + Sync {
    /// The solution type.
    type Solution: Clone + Send + Sync;
    /// A move; also serves as its own tabu signature.
    type Move: Copy + Eq + Hash + Send + Sync;

    /// Creates the starting solution.
    fn initial_solution(&self) -> Self::Solution;

    /// Lists the moves examined at `iteration`, always in the same order for
    /// the same solution and iteration.
    fn neighborhood(&self, solution: &Self::Solution, iteration: u64) -> Vec<Self::Move>;

    /// Applies a move, returning the new solution.
    fn apply(&self, solution: &Self::Solution, mv: Self::Move) -> Self::Solution;

    /// Evaluates a solution (higher is better).
    fn evaluate(&self, solution: &Self::Solution) -> f64;

    /// Called after each iteration (for progress reporting).
    fn on_iteration(&self, _iteration: u64, _best_score: f64) {}
}

/// Result of a tabu run.
#[derive(Debug, Clone)]
pub struct TabuResult<S> {
    /// The best solution found.
    pub best: S,
    /// Its score.
    pub best_score: f64,
    /// Iterations performed.
    pub iterations: u64,
    /// Total elapsed time.
    pub elapsed: Duration,
    /// Why the run stopped.
    pub stop_reason: StopReason,
    /// Best score after each iteration.
    pub history: Vec<f64>,
}

/// Tabu search runner.
pub struct TabuRunner<P: TabuProblem> {
    config: TabuConfig,
    problem: P,
}

impl<P: TabuProblem> TabuRunner<P> {
    /// Creates a new tabu runner.
    pub fn new(config: TabuConfig, problem: P) -> Self {
        Self { config, problem }
    }

    /// Runs tabu search with the given RNG.
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> TabuResult<P::Solution> {
        let start = Instant::now();
        let mut history = Vec::new();

        let mut current = self.problem.initial_solution();
        let mut best = current.clone();
        let mut best_score = self.problem.evaluate(&current);

        // Move signature -> first iteration at which it is allowed again.
        let mut tabu_until: HashMap<P::Move, u64> = HashMap::new();
        let mut iteration = 0u64;
        let mut stagnation_count = 0u64;
        let mut stop_reason = StopReason::IterationCap;

        loop {
            if iteration >= self.config.max_iterations {
                break;
            }
            if self.config.time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                stop_reason = StopReason::TimeBudget;
                break;
            }
            if self
                .config
                .stagnation_limit
                .is_some_and(|limit| stagnation_count >= limit)
            {
                stop_reason = StopReason::Completed;
                break;
            }

            let moves = self.problem.neighborhood(&current, iteration);
            if moves.is_empty() {
                stop_reason = StopReason::Completed;
                break;
            }

            let candidates: Vec<(P::Move, P::Solution, f64)> = moves
                .into_par_iter()
                .map(|mv| {
                    let next = self.problem.apply(&current, mv);
                    let score = self.problem.evaluate(&next);
                    (mv, next, score)
                })
                .collect();

            let admissible: Vec<(P::Move, P::Solution, f64)> = candidates
                .into_iter()
                .filter(|(mv, _, score)| {
                    let is_tabu = tabu_until.get(mv).is_some_and(|&until| until > iteration);
                    !is_tabu || *score > best_score
                })
                .collect();
            let top = admissible
                .iter()
                .map(|(_, _, score)| *score)
                .fold(f64::NEG_INFINITY, f64::max);
            let mut ties: Vec<(P::Move, P::Solution, f64)> = admissible
                .into_iter()
                .filter(|(_, _, score)| *score >= top)
                .collect();
            let chosen = match ties.len() {
                0 | 1 => ties.pop(),
                n => Some(ties.swap_remove(rng.gen_range(0..n))),
            };

            iteration += 1;

            match chosen {
                Some((mv, next, score)) => {
                    tabu_until.insert(mv, iteration + self.config.tenure);
                    current = next;
                    if score > best_score {
                        best = current.clone();
                        best_score = score;
                        stagnation_count = 0;
                    } else {
                        stagnation_count += 1;
                    }
                }
                None => stagnation_count += 1,
            }

            tabu_until.retain(|_, until| *until > iteration);
            history.push(best_score);
            self.problem.on_iteration(iteration, best_score);
        }

        TabuResult {
            best,
            best_score,
            iterations: iteration,
            elapsed: start.elapsed(),
            stop_reason,
            history,
        }
    }
}
