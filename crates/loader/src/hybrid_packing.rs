//! Genetic search followed by an annealing polish of its best individual.

use crate::ga_packing::{evolve, ga_config};
use crate::placement_pass::Decoder;
use crate::sa_packing::{anneal, sa_config};
use truckpack_core::{PackOptions, PackingResult, PackingStrategy, Problem, Result, StopReason};

/// Hybrid GA + SA strategy.
///
/// The GA runs for `1 - polish_fraction` of both the generation count and
/// the time budget; annealing starts from its best sequence and gets what
/// remains of the budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct HybridPacker;

impl HybridPacker {
    /// Creates a new packer.
    pub fn new() -> Self {
        Self
    }
}

impl PackingStrategy for HybridPacker {
    fn pack(&self, problem: &Problem, options: &PackOptions) -> Result<PackingResult> {
        let budget = options.start_budget();
        let params = &options.params;
        let search_share = 1.0 - params.polish_fraction;
        log::info!(
            "hybrid: packing {} instances, polish fraction {:.2}",
            problem.instance_count(),
            params.polish_fraction
        );

        let decoder = Decoder::new(problem, params.decoder, options.weights);
        let mut rng = options.rng();

        let generations = (f64::from(params.generations) * search_share).round() as u32;
        let ga_limit = budget.limit().map(|limit| limit.mul_f64(search_share));
        let evolved = evolve(
            decoder,
            Decoder::heuristic_seed(problem),
            ga_config(params, generations, ga_limit),
            &mut rng,
        );
        log::debug!(
            "hybrid: GA finished after {} generations, best={:.4}",
            evolved.generations,
            evolved.best.fitness()
        );

        let polished = anneal(
            decoder,
            evolved.best,
            sa_config(params, budget.remaining()),
            &mut rng,
        );

        let stop_reason = if evolved.stop_reason == StopReason::TimeBudget {
            StopReason::TimeBudget
        } else {
            polished.stop_reason
        };
        let mut history = evolved.history;
        history.extend(polished.history);

        let result = decoder
            .result("hybrid", decoder.decode(&polished.best))
            .with_stop_reason(stop_reason)
            .with_iterations(u64::from(evolved.generations) + polished.iterations)
            .with_history(history)
            .with_elapsed_ms(budget.elapsed_ms());

        log::info!(
            "hybrid: placed {}/{} ({:?})",
            result.placed_count(),
            problem.instance_count(),
            result.stop_reason
        );
        Ok(result)
    }
}
