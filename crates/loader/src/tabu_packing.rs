//! Tabu search over placement sequences.
//!
//! The neighborhood is a window of consecutive order positions that slides
//! by half its width each iteration: every swap inside the window plus every
//! alternative orientation of the instances it covers.

use crate::placement_pass::Decoder;
use truckpack_core::tabu::{TabuConfig, TabuProblem, TabuRunner};
use truckpack_core::{
    PackOptions, PackingResult, PackingSequence, PackingStrategy, Problem, Result,
};

/// Neighborhood move. Its value doubles as the tabu attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceMove {
    /// Exchange two positions of the order (`lo < hi`).
    Swap(usize, usize),
    /// Set an instance's preferred orientation gene.
    Rotate(usize, usize),
}

/// Tabu problem over [`PackingSequence`]s.
pub struct SequenceTabu<'a> {
    decoder: Decoder<'a>,
    start: PackingSequence,
    window: usize,
}

impl<'a> SequenceTabu<'a> {
    /// Creates the problem, searching from `start` with a window of
    /// `window` order positions.
    pub fn new(decoder: Decoder<'a>, start: PackingSequence, window: usize) -> Self {
        Self {
            decoder,
            start,
            window: window.max(1),
        }
    }

    /// Order positions covered at `iteration`.
    fn window_positions(&self, n: usize, iteration: u64) -> Vec<usize> {
        let width = self.window.min(n);
        let stride = (width / 2).max(1);
        let start = ((iteration % n as u64) as usize * stride) % n;
        (0..width).map(|k| (start + k) % n).collect()
    }
}

impl TabuProblem for SequenceTabu<'_> {
    type Solution = PackingSequence;
    type Move = SequenceMove;

    fn initial_solution(&self) -> PackingSequence {
        self.start.clone()
    }

    fn neighborhood(&self, solution: &PackingSequence, iteration: u64) -> Vec<SequenceMove> {
        let n = solution.len();
        if n == 0 {
            return Vec::new();
        }
        let positions = self.window_positions(n, iteration);

        let mut moves = Vec::new();
        for (k, &p) in positions.iter().enumerate() {
            for &q in &positions[k + 1..] {
                moves.push(SequenceMove::Swap(p.min(q), p.max(q)));
            }
        }

        let problem = self.decoder.problem();
        for &p in &positions {
            let instance = solution.order[p];
            let count = problem.orientations_of(instance).len();
            if count < 2 {
                continue;
            }
            let current = solution.orientations[instance] % count;
            moves.extend(
                (0..count)
                    .filter(|&gene| gene != current)
                    .map(|gene| SequenceMove::Rotate(instance, gene)),
            );
        }
        moves
    }

    fn apply(&self, solution: &PackingSequence, mv: SequenceMove) -> PackingSequence {
        let mut next = solution.clone();
        match mv {
            SequenceMove::Swap(i, j) => next.order.swap(i, j),
            SequenceMove::Rotate(instance, gene) => next.orientations[instance] = gene,
        }
        next
    }

    fn evaluate(&self, solution: &PackingSequence) -> f64 {
        self.decoder.evaluate(solution)
    }

    fn on_iteration(&self, iteration: u64, best_score: f64) {
        if iteration % 50 == 0 {
            log::debug!("Tabu iteration {}: best={:.4}", iteration, best_score);
        }
    }
}

/// Tabu search strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct TabuPacker;

impl TabuPacker {
    /// Creates a new packer.
    pub fn new() -> Self {
        Self
    }
}

impl PackingStrategy for TabuPacker {
    fn pack(&self, problem: &Problem, options: &PackOptions) -> Result<PackingResult> {
        let budget = options.start_budget();
        let params = &options.params;
        log::info!("tabu-search: packing {} instances", problem.instance_count());

        let decoder = Decoder::new(problem, params.decoder, options.weights);
        let config = TabuConfig::default()
            .with_tenure(params.tabu_tenure)
            .with_max_iterations(params.max_iterations)
            .with_stagnation_limit(params.stagnation_limit)
            .with_time_limit(budget.remaining());

        let runner = TabuRunner::new(
            config,
            SequenceTabu::new(decoder, Decoder::heuristic_seed(problem), params.neighborhood_size),
        );
        let outcome = runner.run_with_rng(&mut options.rng());

        let result = decoder
            .result("tabu-search", decoder.decode(&outcome.best))
            .with_stop_reason(outcome.stop_reason)
            .with_iterations(outcome.iterations)
            .with_history(outcome.history)
            .with_elapsed_ms(budget.elapsed_ms());

        log::info!(
            "tabu-search: placed {}/{} after {} iterations ({:?})",
            result.placed_count(),
            problem.instance_count(),
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
    use truckpack_core::{Carton, StrategyParams, Truck};

    fn problem() -> Problem {
        Problem::new(
            vec![
                Carton::new("A", 60.0, 40.0, 30.0).with_weight(8.0).with_quantity(3),
                Carton::new("B", 30.0, 30.0, 30.0).with_weight(2.0).with_quantity(5),
            ],
            Truck::new(120.0, 80.0, 60.0, 500.0),
        )
        .unwrap()
    }

    fn quick() -> PackOptions {
        let params = StrategyParams {
            max_iterations: 40,
            neighborhood_size: 4,
            ..StrategyParams::default()
        };
        PackOptions::new().with_seed(7).with_params(params)
    }

    #[test]
    fn test_neighborhood_is_fixed_window() {
        let problem = problem();
        let decoder = Decoder::new(
            &problem,
            Default::default(),
            truckpack_core::ScoreWeights::default(),
        );
        let tabu = SequenceTabu::new(decoder, Decoder::heuristic_seed(&problem), 4);
        let seed = tabu.initial_solution();

        let moves = tabu.neighborhood(&seed, 0);
        assert_eq!(moves, tabu.neighborhood(&seed, 0));

        // Six swaps inside positions 0..4, then the alternative orientations.
        let swaps: Vec<_> = moves
            .iter()
            .filter(|m| matches!(m, SequenceMove::Swap(..)))
            .collect();
        assert_eq!(swaps.len(), 6);
        assert_eq!(*swaps[0], SequenceMove::Swap(0, 1));
        for mv in &moves {
            match *mv {
                SequenceMove::Swap(i, j) => assert!(i < j && j < 4),
                SequenceMove::Rotate(instance, gene) => {
                    let count = problem.orientations_of(instance).len();
                    assert!(gene < count);
                    assert_ne!(gene, seed.orientations[instance] % count);
                    assert!(seed.order[..4].contains(&instance));
                }
            }
        }

        // The window slides by half its width.
        assert!(tabu
            .neighborhood(&seed, 1)
            .iter()
            .any(|m| *m == SequenceMove::Swap(4, 5)));
    }

    #[test]
    fn test_tabu_reproducible() {
        let problem = problem();
        let a = TabuPacker::new().pack(&problem, &quick()).unwrap();
        let b = TabuPacker::new().pack(&problem, &quick()).unwrap();
        assert_eq!(a.placements, b.placements);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_tabu_never_worse_than_seed() {
        let problem = problem();
        let seeded = ExtremePointPacker::new()
            .pack(&problem, &PackOptions::default())
            .unwrap();
        let result = TabuPacker::new().pack(&problem, &quick()).unwrap();

        assert!(result.efficiency() >= seeded.efficiency() - 1e-12);
        assert!(result.verify(&problem).is_ok());
        assert!(result.iterations <= 40);
    }

    #[test]
    fn test_tabu_empty_problem() {
        let problem = Problem::new(Vec::new(), Truck::new(100.0, 100.0, 100.0, 10.0)).unwrap();
        let result = TabuPacker::new().pack(&problem, &quick()).unwrap();
        assert!(result.placements.is_empty());
        assert_eq!(result.iterations, 0);
    }
}
