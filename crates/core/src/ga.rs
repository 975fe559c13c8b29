//! Genetic algorithm framework.
//!
//! Fitness-proportionate (roulette) selection, generational replacement with
//! elitism, and parallel evaluation of each generation's children.

use crate::result::StopReason;
use rand::prelude::*;
use rayon::prelude::*;
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the genetic algorithm.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaConfig {
    /// Population size.
    pub population_size: usize,
    /// Maximum number of generations.
    pub max_generations: u32,
    /// Crossover rate (0.0 - 1.0).
    pub crossover_rate: f64,
    /// Mutation rate (0.0 - 1.0).
    pub mutation_rate: f64,
    /// Number of elite individuals to preserve each generation.
    pub elite_count: usize,
    /// Maximum time limit (None = unlimited).
    pub time_limit: Option<Duration>,
    /// Generations without improvement before early stop.
    pub stagnation_limit: Option<u32>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 40,
            max_generations: 120,
            crossover_rate: 0.85,
            mutation_rate: 0.1,
            elite_count: 2,
            time_limit: None,
            stagnation_limit: None,
        }
    }
}

impl GaConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size.max(2);
        self
    }

    /// Sets the maximum generations.
    pub fn with_max_generations(mut self, gen: u32) -> Self {
        self.max_generations = gen;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the elite count.
    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    /// Sets the time limit.
    pub fn with_time_limit(mut self, duration: Option<Duration>) -> Self {
        self.time_limit = duration;
        self
    }

    /// Sets the stagnation limit.
    pub fn with_stagnation_limit(mut self, generations: u32) -> Self {
        self.stagnation_limit = Some(generations);
        self
    }
}

/// An individual of the population.
///
/// Crossover and mutation live on the individual; evaluation lives on the
/// problem.
pub trait Individual: Clone + Send + Sync {
    /// Returns the fitness (higher is better, non-negative for roulette).
    fn fitness(&self) -> f64;

    /// Performs crossover with another individual.
    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> Self;

    /// Mutates this individual in place.
    fn mutate<R: Rng>(&mut self, rng: &mut R);
}

/// Problem-specific GA operations.
pub trait GaProblem: Send + Sync {
    /// The individual type for this problem.
    type Individual: Individual;

    /// Evaluates the fitness of an individual.
    fn evaluate(&self, individual: &mut Self::Individual);

    /// Evaluates multiple individuals in parallel.
    fn evaluate_parallel(&self, individuals: &mut [Self::Individual]) {
        individuals.par_iter_mut().for_each(|ind| {
            self.evaluate(ind);
        });
    }

    /// Creates the initial population.
    fn initialize_population<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<Self::Individual>;

    /// Called after each generation (for progress reporting).
    fn on_generation(
        &self,
        _generation: u32,
        _best: &Self::Individual,
        _population: &[Self::Individual],
    ) {
    }
}

/// Result of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult<I: Individual> {
    /// The best individual found.
    pub best: I,
    /// Generations completed.
    pub generations: u32,
    /// Total elapsed time.
    pub elapsed: Duration,
    /// Why the run stopped.
    pub stop_reason: StopReason,
    /// Best fitness per generation.
    pub history: Vec<f64>,
}

/// Genetic algorithm runner.
pub struct GaRunner<P: GaProblem> {
    config: GaConfig,
    problem: P,
}

impl<P: GaProblem> GaRunner<P> {
    /// Creates a new GA runner.
    pub fn new(config: GaConfig, problem: P) -> Self {
        Self { config, problem }
    }

    /// Runs the genetic algorithm with the given RNG.
    ///
    /// Returns `None` if the problem produced an empty initial population.
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> Option<GaResult<P::Individual>> {
        let start = Instant::now();
        let mut history = Vec::new();

        let mut population = self
            .problem
            .initialize_population(self.config.population_size.max(1), rng);
        if population.is_empty() {
            return None;
        }
        self.problem.evaluate_parallel(&mut population);
        sort_by_fitness(&mut population);

        let mut best = population[0].clone();
        let mut best_fitness = best.fitness();
        let mut stagnation_count = 0u32;
        let mut generation = 0u32;
        let mut stop_reason = StopReason::Completed;

        while generation < self.config.max_generations {
            if self.config.time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                stop_reason = StopReason::TimeBudget;
                break;
            }

            history.push(best_fitness);

            let elite = self.config.elite_count.min(population.len());
            let mut next: Vec<P::Individual> = population.iter().take(elite).cloned().collect();

            let wanted = population.len().saturating_sub(next.len());
            let mut children = Vec::with_capacity(wanted);
            while children.len() < wanted {
                let parent1 = roulette_select(&population, rng);
                let parent2 = roulette_select(&population, rng);

                let mut child = if rng.gen::<f64>() < self.config.crossover_rate {
                    parent1.crossover(parent2, rng)
                } else {
                    parent1.clone()
                };

                if rng.gen::<f64>() < self.config.mutation_rate {
                    child.mutate(rng);
                }

                children.push(child);
            }

            self.problem.evaluate_parallel(&mut children);
            next.extend(children);
            sort_by_fitness(&mut next);

            if next[0].fitness() > best_fitness {
                best = next[0].clone();
                best_fitness = best.fitness();
                stagnation_count = 0;
            } else {
                stagnation_count += 1;
            }

            self.problem.on_generation(generation, &best, &next);

            population = next;
            generation += 1;

            if self
                .config
                .stagnation_limit
                .is_some_and(|limit| stagnation_count >= limit)
            {
                break;
            }
        }

        history.push(best_fitness);

        Some(GaResult {
            best,
            generations: generation,
            elapsed: start.elapsed(),
            stop_reason,
            history,
        })
    }
}

fn sort_by_fitness<I: Individual>(population: &mut [I]) {
    population.sort_by(|a, b| {
        b.fitness()
            .partial_cmp(&a.fitness())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Fitness-proportionate selection.
///
/// Negative fitness counts as zero; if the total is zero, selection is uniform.
pub fn roulette_select<'a, I: Individual, R: Rng>(population: &'a [I], rng: &mut R) -> &'a I {
    let total: f64 = population.iter().map(|ind| ind.fitness().max(0.0)).sum();
    if !(total > 0.0) || !total.is_finite() {
        return &population[rng.gen_range(0..population.len())];
    }

    let mut pick = rng.gen::<f64>() * total;
    for ind in population {
        pick -= ind.fitness().max(0.0);
        if pick <= 0.0 {
            return ind;
        }
    }
    &population[population.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    #[derive(Clone)]
    struct SimpleIndividual {
        value: f64,
    }

    impl Individual for SimpleIndividual {
        fn fitness(&self) -> f64 {
            // Maximize at x = 0, always positive.
            1.0 / (1.0 + self.value * self.value)
        }

        fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> Self {
            Self {
                value: if rng.gen() { self.value } else { other.value },
            }
        }

        fn mutate<R: Rng>(&mut self, rng: &mut R) {
            self.value += rng.gen_range(-1.0..1.0);
        }
    }

    struct SimpleProblem;

    impl GaProblem for SimpleProblem {
        type Individual = SimpleIndividual;

        fn evaluate(&self, _individual: &mut Self::Individual) {}

        fn initialize_population<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<SimpleIndividual> {
            (0..size)
                .map(|_| SimpleIndividual {
                    value: rng.gen_range(-50.0..50.0),
                })
                .collect()
        }
    }

    #[test]
    fn test_ga_improves() {
        let config = GaConfig::default()
            .with_population_size(30)
            .with_max_generations(60)
            .with_mutation_rate(0.5);

        let runner = GaRunner::new(config, SimpleProblem);
        let mut rng = StdRng::seed_from_u64(11);
        let result = runner.run_with_rng(&mut rng).unwrap();

        assert_eq!(result.stop_reason, StopReason::Completed);
        assert_eq!(result.generations, 60);
        // Elitism keeps the best-so-far history non-decreasing.
        assert!(result.history.windows(2).all(|w| w[1] >= w[0]));
        assert!(result.best.fitness() >= result.history[0]);
    }

    #[test]
    fn test_ga_seeded_runs_match() {
        let config = GaConfig::default().with_max_generations(20);
        let runner = GaRunner::new(config, SimpleProblem);
        let a = runner.run_with_rng(&mut StdRng::seed_from_u64(5)).unwrap();
        let b = runner.run_with_rng(&mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a.best.value, b.best.value);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_ga_zero_time_limit() {
        let config = GaConfig::default().with_time_limit(Some(Duration::ZERO));
        let runner = GaRunner::new(config, SimpleProblem);
        let result = runner.run_with_rng(&mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(result.stop_reason, StopReason::TimeBudget);
        assert_eq!(result.generations, 0);
    }

    #[test]
    fn test_roulette_prefers_fitter() {
        let population = vec![
            SimpleIndividual { value: 0.0 },
            SimpleIndividual { value: 1000.0 },
        ];
        let mut rng = StdRng::seed_from_u64(9);
        let picks = (0..200)
            .filter(|_| roulette_select(&population, &mut rng).value == 0.0)
            .count();
        assert!(picks > 190);
    }
}
