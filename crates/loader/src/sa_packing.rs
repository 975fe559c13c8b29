//! Simulated annealing over placement sequences.
//!
//! Starts from the heuristic sequence and perturbs order and orientation
//! genes, re-running the placement pass for every neighbor.

use crate::placement_pass::Decoder;
use rand::Rng;
use std::time::Duration;
use truckpack_core::sa::{self, NeighborhoodOperator, SaConfig, SaProblem, SaResult};
use truckpack_core::{
    PackOptions, PackingResult, PackingSequence, PackingStrategy, Problem, Result, StrategyParams,
};

/// Annealing problem over [`PackingSequence`]s.
pub struct SequenceAnnealing<'a> {
    decoder: Decoder<'a>,
    start: PackingSequence,
}

impl<'a> SequenceAnnealing<'a> {
    /// Creates the problem, annealing from `start`.
    pub fn new(decoder: Decoder<'a>, start: PackingSequence) -> Self {
        Self { decoder, start }
    }
}

impl SaProblem for SequenceAnnealing<'_> {
    type Solution = PackingSequence;

    fn start(&self) -> PackingSequence {
        self.start.clone()
    }

    fn operators(&self) -> Vec<NeighborhoodOperator> {
        if self.start.is_empty() {
            return Vec::new();
        }
        vec![
            NeighborhoodOperator::Swap,
            NeighborhoodOperator::Relocate,
            NeighborhoodOperator::Inversion,
            NeighborhoodOperator::Rotation,
        ]
    }

    fn perturb<R: Rng>(
        &self,
        solution: &PackingSequence,
        operator: NeighborhoodOperator,
        rng: &mut R,
    ) -> PackingSequence {
        let mut next = solution.clone();
        match operator {
            NeighborhoodOperator::Swap => next.swap_mutate(rng),
            NeighborhoodOperator::Relocate => next.relocate(rng),
            NeighborhoodOperator::Inversion => next.invert(rng),
            NeighborhoodOperator::Rotation => next.orientation_mutate(rng),
        }
        next
    }

    fn score(&self, solution: &PackingSequence) -> f64 {
        self.decoder.evaluate(solution)
    }
}

/// Builds an annealing schedule from the strategy tunables.
pub fn sa_config(params: &StrategyParams, time_limit: Option<Duration>) -> SaConfig {
    SaConfig::from_params(params, time_limit)
}

/// Anneals from `start` through the placement pass.
pub fn anneal<R: Rng>(
    decoder: Decoder<'_>,
    start: PackingSequence,
    config: SaConfig,
    rng: &mut R,
) -> SaResult<PackingSequence> {
    sa::run(&SequenceAnnealing::new(decoder, start), &config, rng)
}

/// Simulated annealing strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaPacker;

impl SaPacker {
    /// Creates a new packer.
    pub fn new() -> Self {
        Self
    }
}

impl PackingStrategy for SaPacker {
    fn pack(&self, problem: &Problem, options: &PackOptions) -> Result<PackingResult> {
        let budget = options.start_budget();
        let params = &options.params;
        log::info!(
            "simulated-annealing: packing {} instances",
            problem.instance_count()
        );

        let decoder = Decoder::new(problem, params.decoder, options.weights);
        let mut rng = options.rng();
        let outcome = anneal(
            decoder,
            Decoder::heuristic_seed(problem),
            sa_config(params, budget.remaining()),
            &mut rng,
        );

        let result = decoder
            .result("simulated-annealing", decoder.decode(&outcome.best))
            .with_stop_reason(outcome.stop_reason)
            .with_iterations(outcome.iterations)
            .with_history(outcome.history)
            .with_elapsed_ms(budget.elapsed_ms());

        log::info!(
            "simulated-annealing: placed {}/{} after {} iterations ({:?})",
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
    use truckpack_core::{Carton, StopReason, Truck};

    fn problem() -> Problem {
        Problem::new(
            vec![
                Carton::new("A", 40.0, 30.0, 20.0).with_weight(5.0).with_quantity(4),
                Carton::new("B", 25.0, 25.0, 25.0).with_weight(3.0).with_quantity(4),
            ],
            Truck::new(100.0, 60.0, 50.0, 1000.0),
        )
        .unwrap()
    }

    fn quick() -> PackOptions {
        let params = StrategyParams {
            max_iterations: 200,
            stagnation_limit: 100,
            ..StrategyParams::default()
        };
        PackOptions::new().with_seed(42).with_params(params)
    }

    #[test]
    fn test_sa_never_worse_than_seed() {
        let problem = problem();
        let seeded = ExtremePointPacker::new()
            .pack(&problem, &PackOptions::default())
            .unwrap();
        let result = SaPacker::new().pack(&problem, &quick()).unwrap();

        assert!(result.efficiency() >= seeded.efficiency() - 1e-12);
        assert!(result.verify(&problem).is_ok());
        assert!(result.iterations <= 200);
    }

    #[test]
    fn test_sa_seed_reproducible() {
        let problem = problem();
        let a = SaPacker::new().pack(&problem, &quick()).unwrap();
        let b = SaPacker::new().pack(&problem, &quick()).unwrap();
        assert_eq!(a.placements, b.placements);
    }

    #[test]
    fn test_sa_zero_budget_returns_seed() {
        let problem = problem();
        let options = quick().with_time_budget(Duration::ZERO);
        let result = SaPacker::new().pack(&problem, &options).unwrap();
        assert_eq!(result.stop_reason, StopReason::TimeBudget);
        assert!(result.verify(&problem).is_ok());
    }
}
