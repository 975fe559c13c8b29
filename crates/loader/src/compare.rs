//! Side-by-side strategy comparison.
//!
//! Every requested strategy runs on its own rayon task with the same problem
//! and options. Results are verified, and a run that errors, panics or breaks
//! a packing rule is kept as a failed entry instead of aborting the comparison.

use crate::registry::Registry;
use rayon::prelude::*;
use serde::Serialize;
use std::any::Any;
use std::cmp::Ordering;
use std::panic::{self, AssertUnwindSafe};
use truckpack_core::{PackOptions, PackingResult, Problem, Result};

/// What one strategy run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Outcome {
    /// A verified result.
    Packed(PackingResult),
    /// The run failed; other entries are unaffected.
    Failed {
        /// Error message.
        error: String,
    },
}

/// One ranked comparison entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonEntry {
    /// 1-based rank.
    pub rank: usize,
    /// Strategy name.
    pub algorithm: String,
    /// Result or failure.
    pub outcome: Outcome,
}

impl ComparisonEntry {
    /// Returns the result if the run succeeded.
    pub fn result(&self) -> Option<&PackingResult> {
        match &self.outcome {
            Outcome::Packed(result) => Some(result),
            Outcome::Failed { .. } => None,
        }
    }

    /// Returns true if the run failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }
}

/// Ranked comparison of several strategies on one problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    /// Entries, best first; failed runs last.
    pub entries: Vec<ComparisonEntry>,
    /// Name of the top-ranked successful strategy.
    pub best: Option<String>,
}

impl Comparison {
    /// Returns the top-ranked result.
    pub fn best_result(&self) -> Option<&PackingResult> {
        self.entries.first().and_then(ComparisonEntry::result)
    }
}

/// Orders two results best first: higher efficiency, then fewer unplaced
/// cartons, then weight utilization closer to 100%.
pub fn rank_results(a: &PackingResult, b: &PackingResult) -> Ordering {
    let shortfall = |r: &PackingResult| (1.0 - r.metrics.weight_utilization).powi(2);
    b.efficiency()
        .total_cmp(&a.efficiency())
        .then_with(|| a.unplaced.len().cmp(&b.unplaced.len()))
        .then_with(|| shortfall(a).total_cmp(&shortfall(b)))
}

/// Runs the named strategies (all registered ones if `names` is `None` or
/// empty) and ranks their results.
///
/// Unknown names are rejected before anything runs. [`crate::registry::AUTO`]
/// is resolved to a concrete strategy and duplicates run once.
pub fn compare(
    registry: &Registry,
    problem: &Problem,
    names: Option<&[String]>,
    options: &PackOptions,
) -> Result<Comparison> {
    options.validate()?;

    let requested: Vec<String> = match names {
        Some(names) if !names.is_empty() => names.to_vec(),
        _ => registry.list().iter().map(|info| info.name.clone()).collect(),
    };
    let mut algorithms: Vec<String> = Vec::with_capacity(requested.len());
    for name in &requested {
        let resolved = registry.resolve(name, problem, options)?;
        if !algorithms.iter().any(|a| a == resolved) {
            algorithms.push(resolved.to_string());
        }
    }
    log::info!("comparing {} strategies: {}", algorithms.len(), algorithms.join(", "));

    let outcomes: Vec<(String, Outcome)> = algorithms
        .into_par_iter()
        .map(|name| {
            let run =
                panic::catch_unwind(AssertUnwindSafe(|| registry.run(&name, problem, options)));
            let outcome = match run {
                Ok(Ok(result)) => Outcome::Packed(result),
                Ok(Err(err)) => {
                    log::warn!("strategy '{}' failed: {}", name, err);
                    Outcome::Failed {
                        error: err.to_string(),
                    }
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    log::warn!("strategy '{}' panicked: {}", name, message);
                    Outcome::Failed {
                        error: format!("strategy panicked: {}", message),
                    }
                }
            };
            (name, outcome)
        })
        .collect();

    Ok(rank(outcomes))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn rank(mut outcomes: Vec<(String, Outcome)>) -> Comparison {
    // Stable: equal results and failures keep request order.
    outcomes.sort_by(|(_, a), (_, b)| match (a, b) {
        (Outcome::Packed(a), Outcome::Packed(b)) => rank_results(a, b),
        (Outcome::Packed(_), Outcome::Failed { .. }) => Ordering::Less,
        (Outcome::Failed { .. }, Outcome::Packed(_)) => Ordering::Greater,
        (Outcome::Failed { .. }, Outcome::Failed { .. }) => Ordering::Equal,
    });

    let entries: Vec<ComparisonEntry> = outcomes
        .into_iter()
        .enumerate()
        .map(|(i, (algorithm, outcome))| ComparisonEntry {
            rank: i + 1,
            algorithm,
            outcome,
        })
        .collect();
    let best = entries
        .first()
        .filter(|e| !e.is_failed())
        .map(|e| e.algorithm.clone());

    Comparison { entries, best }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StrategyInfo;
    use crate::skyline::SkylinePacker;
    use nalgebra::Vector3;
    use truckpack_core::{
        Carton, Error, PackingStrategy, Placement, ScoreWeights, StrategyParams, Truck,
    };

    /// Stacks every instance at the origin.
    struct Overlapping;

    impl PackingStrategy for Overlapping {
        fn pack(&self, problem: &Problem, options: &PackOptions) -> Result<PackingResult> {
            let placements = (0..problem.instance_count())
                .map(|i| Placement {
                    instance: i,
                    carton_id: problem.carton_of(i).id().to_string(),
                    ordinal: problem.instances()[i].ordinal,
                    orientation: 0,
                    position: Vector3::zeros(),
                    extents: problem.carton_of(i).dimensions(),
                })
                .collect();
            Ok(PackingResult::from_placements(
                problem,
                "overlapping",
                placements,
                &options.weights,
            ))
        }
    }

    /// Aborts instead of returning.
    struct Panicking;

    impl PackingStrategy for Panicking {
        fn pack(&self, _problem: &Problem, _options: &PackOptions) -> Result<PackingResult> {
            panic!("load state corrupted")
        }
    }

    fn problem() -> Problem {
        Problem::new(
            vec![
                Carton::new("A", 40.0, 30.0, 30.0).with_weight(10.0).with_quantity(4),
                Carton::new("B", 20.0, 20.0, 20.0).with_weight(2.0).with_quantity(6),
            ],
            Truck::new(120.0, 80.0, 80.0, 1000.0),
        )
        .unwrap()
    }

    fn quick() -> PackOptions {
        let params = StrategyParams {
            population_size: 8,
            generations: 5,
            ..StrategyParams::default()
        };
        PackOptions::new().with_seed(1).with_params(params)
    }

    #[test]
    fn test_three_way_comparison_is_ranked() {
        let registry = Registry::standard();
        let names = vec![
            "skyline".to_string(),
            "extreme-points".to_string(),
            "genetic".to_string(),
        ];
        let comparison = compare(&registry, &problem(), Some(&names), &quick()).unwrap();

        assert_eq!(comparison.entries.len(), 3);
        assert!(comparison.entries.iter().all(|e| !e.is_failed()));
        let scores: Vec<f64> = comparison
            .entries
            .iter()
            .filter_map(|e| e.result().map(PackingResult::efficiency))
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(comparison.best.as_deref(), Some(comparison.entries[0].algorithm.as_str()));
        assert_eq!(comparison.entries[2].rank, 3);
    }

    #[test]
    fn test_unknown_name_rejected_before_running() {
        let registry = Registry::standard();
        let names = vec!["skyline".to_string(), "warp-drive".to_string()];
        assert!(matches!(
            compare(&registry, &problem(), Some(&names), &quick()),
            Err(Error::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn test_failed_run_is_isolated() {
        let registry = Registry::builder()
            .register(StrategyInfo::new("broken", "Broken", "", "O(n)", ""), Overlapping)
            .register(StrategyInfo::new("skyline", "Skyline", "", "O(n^2)", ""), SkylinePacker::new())
            .build();
        let comparison = compare(&registry, &problem(), None, &quick()).unwrap();

        assert_eq!(comparison.entries.len(), 2);
        assert_eq!(comparison.entries[0].algorithm, "skyline");
        assert!(comparison.entries[1].is_failed());
        assert_eq!(comparison.best.as_deref(), Some("skyline"));
    }

    #[test]
    fn test_panicking_run_is_isolated() {
        let registry = Registry::builder()
            .register(StrategyInfo::new("panicking", "Panicking", "", "O(1)", ""), Panicking)
            .register(StrategyInfo::new("skyline", "Skyline", "", "O(n^2)", ""), SkylinePacker::new())
            .build();
        let comparison = compare(&registry, &problem(), None, &quick()).unwrap();

        assert_eq!(comparison.entries.len(), 2);
        assert_eq!(comparison.entries[0].algorithm, "skyline");
        assert!(comparison.entries[0].result().is_some());
        match &comparison.entries[1].outcome {
            Outcome::Failed { error } => assert!(error.contains("load state corrupted")),
            Outcome::Packed(_) => panic!("a panicking strategy must be recorded as failed"),
        }
        assert_eq!(comparison.best.as_deref(), Some("skyline"));
    }

    #[test]
    fn test_duplicates_run_once() {
        let registry = Registry::standard();
        let names = vec!["skyline".to_string(), "skyline".to_string()];
        let comparison = compare(&registry, &problem(), Some(&names), &quick()).unwrap();
        assert_eq!(comparison.entries.len(), 1);
    }

    #[test]
    fn test_rank_orders_by_efficiency() {
        let problem = problem();
        let weights = ScoreWeights::default();
        let full = SkylinePacker::new()
            .pack(&problem, &PackOptions::default())
            .unwrap();
        let empty = PackingResult::from_placements(&problem, "empty", Vec::new(), &weights);

        assert_eq!(rank_results(&full, &empty), Ordering::Less);
        assert_eq!(rank_results(&full, &full), Ordering::Equal);
    }
}
