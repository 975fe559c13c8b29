//! Properties every registered strategy must satisfy.

use approx::assert_relative_eq;
use nalgebra::Vector3;
use std::time::Duration;
use truckpack_core::{
    Carton, OrientationSet, PackOptions, PackingResult, Placement, Problem, ScoreWeights,
    StopReason, StrategyParams, Truck,
};
use truckpack_loader::branch_bound::placed_volume;
use truckpack_loader::{compare, Registry};

/// Tunables small enough for every strategy to finish quickly.
fn quick_params() -> StrategyParams {
    StrategyParams {
        population_size: 8,
        generations: 6,
        max_iterations: 80,
        stagnation_limit: 40,
        neighborhood_size: 6,
        swarm_size: 6,
        ant_count: 6,
        node_limit: 300,
        ..StrategyParams::default()
    }
}

fn quick() -> PackOptions {
    PackOptions::new().with_seed(2024).with_params(quick_params())
}

fn mixed_problem() -> Problem {
    Problem::new(
        vec![
            Carton::new("pallet", 120.0, 80.0, 60.0).with_weight(180.0).with_quantity(3),
            Carton::new("fridge", 70.0, 70.0, 150.0)
                .with_weight(90.0)
                .with_keep_upright(true)
                .with_quantity(2),
            Carton::new("glass", 60.0, 40.0, 40.0)
                .with_weight(30.0)
                .with_stackable(false)
                .with_quantity(3),
            Carton::new("box", 40.0, 30.0, 30.0).with_weight(10.0).with_quantity(6),
        ],
        Truck::new(300.0, 200.0, 180.0, 900.0),
    )
    .unwrap()
}

/// A one-dimensional lane the heuristic fills to 8000 of 10000 cm³.
fn lane_problem() -> Problem {
    Problem::new(
        vec![
            Carton::new("L45", 45.0, 10.0, 10.0),
            Carton::new("L35", 35.0, 10.0, 10.0),
            Carton::new("L30", 30.0, 10.0, 10.0),
            Carton::new("L25", 25.0, 10.0, 10.0),
        ],
        Truck::new(100.0, 10.0, 10.0, 1_000.0),
    )
    .unwrap()
}

fn assert_invariants(problem: &Problem, result: &PackingResult) {
    assert!(
        result.verify(problem).is_ok(),
        "{} broke an invariant: {:?}",
        result.strategy,
        result.verify(problem)
    );
    assert_eq!(
        result.placements.len() + result.unplaced.len(),
        problem.instance_count(),
        "{} lost or duplicated instances",
        result.strategy
    );
    let weight: f64 = result
        .placements
        .iter()
        .map(|p| problem.instance_weight(p.instance))
        .sum();
    assert!(weight <= problem.truck().max_weight() + 1e-6);
}

#[test]
fn every_strategy_respects_invariants() {
    let registry = Registry::standard();
    let problem = mixed_problem();
    for info in registry.list() {
        let result = registry
            .get(&info.name)
            .unwrap()
            .pack(&problem, &quick())
            .unwrap();
        assert_eq!(result.strategy, info.name);
        assert_invariants(&problem, &result);
    }
}

#[test]
fn seeded_runs_are_reproducible() {
    let registry = Registry::standard();
    let problem = mixed_problem();
    for info in registry.list() {
        let strategy = registry.get(&info.name).unwrap();
        let a = strategy.pack(&problem, &quick()).unwrap();
        let b = strategy.pack(&problem, &quick()).unwrap();
        assert_eq!(a.placements, b.placements, "{} is not reproducible", info.name);
    }
}

#[test]
fn heuristics_are_idempotent() {
    let registry = Registry::standard();
    let problem = mixed_problem();
    for name in ["skyline", "extreme-points"] {
        let strategy = registry.get(name).unwrap();
        // The seed must not matter to a deterministic heuristic.
        let a = strategy.pack(&problem, &PackOptions::new().with_seed(1)).unwrap();
        let b = strategy.pack(&problem, &PackOptions::new().with_seed(99)).unwrap();
        assert_eq!(a.placements, b.placements);
        assert_eq!(a.unplaced, b.unplaced);
        assert_relative_eq!(a.efficiency(), b.efficiency());
    }
}

#[test]
fn more_orientations_never_reduce_best_utilization() {
    let registry = Registry::standard();
    let exact = registry.get("branch-and-bound").unwrap();
    let truck = Truck::new(100.0, 80.0, 30.0, 1_000.0);

    let mut previous = 0.0;
    let sets = [
        OrientationSet::from_indices(&[1]).unwrap(),
        OrientationSet::UPRIGHT,
        OrientationSet::ALL,
    ];
    for set in sets {
        let problem = Problem::new(
            vec![Carton::new("C", 50.0, 40.0, 30.0)
                .with_quantity(4)
                .with_allowed_orientations(set)],
            truck.clone(),
        )
        .unwrap();
        let result = exact.pack(&problem, &PackOptions::default()).unwrap();
        assert!(result.metrics.volume_utilization >= previous - 1e-12);
        previous = result.metrics.volume_utilization;
    }
    assert_relative_eq!(previous, 1.0, epsilon = 1e-9);
}

#[test]
fn lying_down_unlocks_tall_cartons() {
    let registry = Registry::standard();
    let exact = registry.get("branch-and-bound").unwrap();
    let truck = Truck::new(100.0, 100.0, 40.0, 1_000.0);
    let post = Carton::new("post", 30.0, 30.0, 90.0).with_quantity(3);

    let upright = Problem::new(vec![post.clone().with_keep_upright(true)], truck.clone()).unwrap();
    let free = Problem::new(vec![post], truck).unwrap();

    let upright_result = exact.pack(&upright, &PackOptions::default()).unwrap();
    let free_result = exact.pack(&free, &PackOptions::default()).unwrap();

    assert_eq!(upright_result.unplaced.len(), 3);
    assert!(free_result.all_placed());
    assert!(free_result.metrics.volume_utilization > upright_result.metrics.volume_utilization);
}

#[test]
fn branch_and_bound_packs_exact_fit() {
    // A 100x60x50 truck cut into five boxes.
    let cartons = vec![
        Carton::new("A", 60.0, 60.0, 50.0),
        Carton::new("B", 40.0, 60.0, 20.0),
        Carton::new("C", 40.0, 30.0, 30.0),
        Carton::new("D", 20.0, 30.0, 30.0).with_quantity(2),
    ];
    let problem = Problem::new(cartons, Truck::new(100.0, 60.0, 50.0, 1_000.0)).unwrap();

    // The cut itself proves the instance is fully packable.
    let anchors = [
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(60.0, 0.0, 0.0),
        Vector3::new(60.0, 0.0, 20.0),
        Vector3::new(60.0, 30.0, 20.0),
        Vector3::new(80.0, 30.0, 20.0),
    ];
    let witness: Vec<Placement> = anchors
        .iter()
        .enumerate()
        .map(|(i, &position)| Placement {
            instance: i,
            carton_id: problem.carton_of(i).id().to_string(),
            ordinal: problem.instances()[i].ordinal,
            orientation: 0,
            position,
            extents: problem.carton_of(i).dimensions(),
        })
        .collect();
    let witness =
        PackingResult::from_placements(&problem, "witness", witness, &ScoreWeights::default());
    assert!(witness.verify(&problem).is_ok());
    assert!(witness.all_placed());

    let result = Registry::standard()
        .run("branch-and-bound", &problem, &PackOptions::default())
        .unwrap();
    assert!(result.unplaced.is_empty());
    assert_relative_eq!(placed_volume(&result), 300_000.0, epsilon = 1e-6);
}

#[test]
fn skyline_loads_reference_scenario() {
    let problem = Problem::new(
        vec![Carton::new("A", 50.0, 30.0, 40.0).with_weight(15.0).with_quantity(10)],
        Truck::new(600.0, 240.0, 240.0, 20_000.0).with_max_volume(34.5),
    )
    .unwrap();

    let result = Registry::standard()
        .run("skyline", &problem, &PackOptions::default())
        .unwrap();

    assert_eq!(result.placed_count(), 10);
    assert!(result.unplaced.is_empty());
    assert_relative_eq!(result.metrics.weight_utilization, 0.0075, epsilon = 1e-12);
    assert_relative_eq!(
        result.metrics.volume_utilization,
        600_000.0 / 34_500_000.0,
        epsilon = 1e-12
    );
}

#[test]
fn oversize_carton_is_unplaced_everywhere() {
    let registry = Registry::standard();
    let problem = Problem::new(
        vec![
            Carton::new("giant", 700.0, 250.0, 250.0).with_weight(50.0),
            Carton::new("box", 40.0, 30.0, 30.0).with_weight(5.0).with_quantity(4),
        ],
        Truck::new(600.0, 240.0, 240.0, 20_000.0),
    )
    .unwrap();

    for info in registry.list() {
        let result = registry.run(&info.name, &problem, &quick()).unwrap();
        assert!(
            result.unplaced.iter().any(|u| u.carton_id == "giant"),
            "{} placed an oversize carton",
            info.name
        );
        assert_eq!(result.placed_count(), 4, "{} left boxes behind", info.name);
    }
}

#[test]
fn three_way_comparison_is_ranked_and_valid() {
    let registry = Registry::standard();
    let problem = mixed_problem();
    let names: Vec<String> = ["skyline", "extreme-points", "genetic"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let comparison = compare(&registry, &problem, Some(names.as_slice()), &quick()).unwrap();

    assert_eq!(comparison.entries.len(), 3);
    let results: Vec<&PackingResult> = comparison
        .entries
        .iter()
        .map(|e| e.result().expect("no strategy should fail"))
        .collect();
    for pair in results.windows(2) {
        assert!(pair[0].efficiency() >= pair[1].efficiency());
    }
    for result in results {
        assert_invariants(&problem, result);
    }
    let best = comparison.best_result().expect("a best result");
    assert_eq!(Some(&best.strategy), comparison.best.as_ref());
}

#[test]
fn time_budget_is_honored() {
    let registry = Registry::standard();
    let problem = mixed_problem();
    let options = PackOptions::new()
        .with_seed(3)
        .with_time_budget(Duration::ZERO);

    let names = [
        "simulated-annealing",
        "tabu-search",
        "genetic",
        "hybrid",
        "particle-swarm",
        "ant-colony",
    ];
    for name in names {
        let result = registry.run(name, &problem, &options).unwrap();
        assert_eq!(
            result.stop_reason,
            StopReason::TimeBudget,
            "{} ignored the budget",
            name
        );
        assert!(result.stop_reason.is_early());
        assert_invariants(&problem, &result);
    }
}

#[test]
fn zero_budget_branch_and_bound_keeps_incumbent() {
    let problem = lane_problem();
    let options = PackOptions::new().with_time_budget(Duration::ZERO);

    let result = Registry::standard()
        .run("branch-and-bound", &problem, &options)
        .unwrap();

    assert_eq!(result.stop_reason, StopReason::TimeBudget);
    assert!(result.stop_reason.is_early());
    assert!(result.verify(&problem).is_ok());
    assert!(placed_volume(&result) >= 8_000.0 - 1e-6);
}

#[test]
fn iteration_cap_is_an_early_stop() {
    let registry = Registry::standard();
    let problem = mixed_problem();
    let params = StrategyParams {
        max_iterations: 5,
        ..quick_params()
    };
    let options = PackOptions::new().with_seed(5).with_params(params);

    for name in ["simulated-annealing", "tabu-search"] {
        let result = registry.run(name, &problem, &options).unwrap();
        assert_eq!(result.stop_reason, StopReason::IterationCap, "{}", name);
        assert!(result.stop_reason.is_early());
        assert_eq!(result.iterations, 5);
        assert_invariants(&problem, &result);
    }
}
