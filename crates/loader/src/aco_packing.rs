//! MAX-MIN ant system over placement sequences.
//!
//! Each ant builds an order item by item, choosing the next instance with
//! probability proportional to `τ(prev, next)^α · η(next)^β` where `η` is the
//! instance's share of the largest instance volume, then picks an orientation
//! gene per instance from `τ(item, gene)^α`. After every iteration trails
//! evaporate, the best ant so far deposits its score along its path, and all
//! trails are clamped to `[τ_min, τ_max]`.

use crate::placement_pass::Decoder;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rayon::prelude::*;
use truckpack_core::{
    PackOptions, PackingResult, PackingSequence, PackingStrategy, Problem, Result, StopReason,
    StrategyParams, ORIENTATION_GENES,
};

/// Pheromone trails for one problem.
#[derive(Debug, Clone)]
pub struct Trails {
    n: usize,
    /// `(n + 1) × n`; row `n` is the virtual start node.
    transitions: Vec<f64>,
    /// `n × ORIENTATION_GENES`.
    orientations: Vec<f64>,
    min: f64,
    max: f64,
}

impl Trails {
    /// Creates trails for `n` instances, every trail at `initial`.
    pub fn new(n: usize, initial: f64) -> Self {
        Self {
            n,
            transitions: vec![initial; (n + 1) * n],
            orientations: vec![initial; n * ORIENTATION_GENES],
            min: 0.0,
            max: initial,
        }
    }

    /// Trail from `prev` (`None` for the start node) to `next`.
    pub fn transition(&self, prev: Option<usize>, next: usize) -> f64 {
        self.transitions[prev.unwrap_or(self.n) * self.n + next]
    }

    /// Trail on orientation `gene` of `item`.
    pub fn orientation(&self, item: usize, gene: usize) -> f64 {
        self.orientations[item * ORIENTATION_GENES + gene]
    }

    /// Returns the `[min, max]` clamp range.
    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Evaporates every trail by `rate`.
    pub fn evaporate(&mut self, rate: f64) {
        let keep = 1.0 - rate;
        for tau in self.transitions.iter_mut().chain(self.orientations.iter_mut()) {
            *tau *= keep;
        }
    }

    /// Deposits `amount` along a sequence's path and genes.
    pub fn deposit(&mut self, sequence: &PackingSequence, amount: f64) {
        let mut prev = self.n;
        for &next in &sequence.order {
            self.transitions[prev * self.n + next] += amount;
            prev = next;
        }
        for (item, &gene) in sequence.orientations.iter().enumerate() {
            self.orientations[item * ORIENTATION_GENES + gene % ORIENTATION_GENES] += amount;
        }
    }

    /// Recomputes the MAX-MIN bounds from the best score and clamps.
    pub fn rebound(&mut self, best_score: f64, evaporation: f64) {
        self.max = best_score.max(f64::EPSILON) / evaporation.max(f64::EPSILON);
        self.min = self.max / (2.0 * self.n.max(1) as f64);
        let (min, max) = (self.min, self.max);
        for tau in self.transitions.iter_mut().chain(self.orientations.iter_mut()) {
            *tau = tau.clamp(min, max);
        }
    }
}

/// Picks an index with probability proportional to `weights`, uniformly if
/// the weights are degenerate.
fn pick<R: Rng>(weights: &[f64], rng: &mut R) -> usize {
    match WeightedIndex::new(weights) {
        Ok(dist) => dist.sample(rng),
        Err(_) => rng.gen_range(0..weights.len()),
    }
}

/// Builds one ant's sequence.
fn construct<R: Rng>(
    trails: &Trails,
    desirability: &[f64],
    params: &StrategyParams,
    rng: &mut R,
) -> PackingSequence {
    let n = desirability.len();
    let mut remaining: Vec<usize> = (0..n).collect();
    let mut order = Vec::with_capacity(n);
    let mut prev = None;
    let mut weights = Vec::with_capacity(n);

    while !remaining.is_empty() {
        weights.clear();
        weights.extend(remaining.iter().map(|&next| {
            trails.transition(prev, next).powf(params.pheromone_alpha)
                * desirability[next].powf(params.heuristic_beta)
        }));
        let next = remaining.swap_remove(pick(&weights, rng));
        order.push(next);
        prev = Some(next);
    }

    let orientations = (0..n)
        .map(|item| {
            let weights: Vec<f64> = (0..ORIENTATION_GENES)
                .map(|gene| trails.orientation(item, gene).powf(params.pheromone_alpha))
                .collect();
            pick(&weights, rng)
        })
        .collect();

    PackingSequence::new(order, orientations)
}

/// Ant colony strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcoPacker;

impl AcoPacker {
    /// Creates a new packer.
    pub fn new() -> Self {
        Self
    }
}

impl PackingStrategy for AcoPacker {
    fn pack(&self, problem: &Problem, options: &PackOptions) -> Result<PackingResult> {
        let budget = options.start_budget();
        let params = &options.params;
        let n = problem.instance_count();
        log::info!("ant-colony: packing {} instances, {} ants", n, params.ant_count);

        let decoder = Decoder::new(problem, params.decoder, options.weights);
        let mut rng = options.rng();

        let largest = (0..n)
            .map(|i| problem.instance_volume(i))
            .fold(0.0_f64, f64::max);
        let desirability: Vec<f64> = (0..n)
            .map(|i| problem.instance_volume(i) / largest.max(f64::EPSILON))
            .collect();

        let mut best = Decoder::heuristic_seed(problem);
        best.set_fitness(decoder.evaluate(&best));
        let mut trails = Trails::new(n, 1.0);
        trails.rebound(best.fitness(), params.evaporation);

        let mut history = Vec::new();
        let mut iteration = 0u32;
        let mut stop_reason = StopReason::Completed;

        while iteration < params.generations && n > 0 {
            history.push(best.fitness());
            if budget.exhausted() {
                stop_reason = StopReason::TimeBudget;
                break;
            }

            let mut ants: Vec<PackingSequence> = (0..params.ant_count.max(1))
                .map(|_| construct(&trails, &desirability, params, &mut rng))
                .collect();
            ants.par_iter_mut().for_each(|ant| {
                let score = decoder.evaluate(ant);
                ant.set_fitness(score);
            });

            // First ant wins ties so runs stay reproducible.
            if let Some(top) = ants.iter().reduce(|a, b| if b.fitness() > a.fitness() { b } else { a }) {
                if top.fitness() > best.fitness() {
                    best = top.clone();
                }
            }

            trails.evaporate(params.evaporation);
            trails.deposit(&best, best.fitness());
            trails.rebound(best.fitness(), params.evaporation);

            iteration += 1;
            log::debug!("ACO iteration {}: best={:.4}", iteration, best.fitness());
        }
        history.push(best.fitness());

        let result = decoder
            .result("ant-colony", decoder.decode(&best))
            .with_stop_reason(stop_reason)
            .with_iterations(u64::from(iteration))
            .with_history(history)
            .with_elapsed_ms(budget.elapsed_ms());

        log::info!(
            "ant-colony: placed {}/{} after {} iterations ({:?})",
            result.placed_count(),
            n,
            result.iterations,
            result.stop_reason
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extreme_point::ExtremePointPacker;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use truckpack_core::{Carton, Truck};

    fn problem() -> Problem {
        Problem::new(
            vec![
                Carton::new("A", 50.0, 40.0, 30.0).with_weight(6.0).with_quantity(3),
                Carton::new("B", 20.0, 20.0, 20.0).with_weight(1.0).with_quantity(6),
            ],
            Truck::new(100.0, 80.0, 60.0, 500.0),
        )
        .unwrap()
    }

    #[test]
    fn test_trails_stay_within_bounds() {
        let sequence = PackingSequence::new(vec![1, 0, 2], vec![0, 3, 5]);
        let mut trails = Trails::new(3, 1.0);
        trails.deposit(&sequence, 50.0);
        trails.evaporate(0.2);
        trails.rebound(0.5, 0.2);

        let (min, max) = trails.bounds();
        assert_relative_eq!(max, 2.5, epsilon = 1e-12);
        assert_relative_eq!(min, 2.5 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(trails.transition(None, 1), max, epsilon = 1e-12);
        assert_relative_eq!(trails.transition(Some(1), 0), max, epsilon = 1e-12);
        assert_relative_eq!(trails.orientation(2, 5), max, epsilon = 1e-12);
        // Untouched trails evaporated to 0.8, inside the range.
        assert_relative_eq!(trails.transition(Some(0), 1), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_construct_yields_permutation() {
        let trails = Trails::new(5, 1.0);
        let desirability = vec![1.0, 0.5, 0.2, 0.9, 0.1];
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..20 {
            let ant = construct(&trails, &desirability, &StrategyParams::default(), &mut rng);
            assert!(ant.is_valid());
            assert!(ant.orientations.iter().all(|&g| g < ORIENTATION_GENES));
        }
    }

    #[test]
    fn test_aco_never_worse_than_seed() {
        let problem = problem();
        let seeded = ExtremePointPacker::new()
            .pack(&problem, &PackOptions::default())
            .unwrap();
        let params = StrategyParams {
            ant_count: 5,
            generations: 4,
            ..StrategyParams::default()
        };
        let options = PackOptions::new().with_seed(21).with_params(params);
        let result = AcoPacker::new().pack(&problem, &options).unwrap();

        assert!(result.efficiency() >= seeded.efficiency() - 1e-12);
        assert!(result.verify(&problem).is_ok());
        assert_eq!(result.iterations, 4);
    }
}
