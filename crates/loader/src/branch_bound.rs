//! Exhaustive depth-first search for the largest placed volume.
//!
//! Each node branches on the next unit of every carton type that still has
//! units left (identical cartons are branched once), times each resolved
//! orientation, times each normal-pattern anchor of the boxes placed so far.
//! Any node may also stop there, which is the implicit drop branch: the node
//! is always offered as an incumbent before children are expanded.
//!
//! A node is pruned when `placed + min(remaining, usable - placed)` cannot
//! beat the incumbent. The incumbent starts as the extreme-point heuristic.

use crate::load_state::LoadState;
use crate::placement_pass::Decoder;
use truckpack_core::geometry::{normal_pattern_anchors, EPSILON};
use truckpack_core::{
    DecoderKind, PackOptions, PackingResult, PackingStrategy, Placement, Problem, Result,
    StopReason, TimeBudget,
};

/// Relative tolerance on volume comparisons.
const VOLUME_TOLERANCE: f64 = 1e-9;

struct Search<'a> {
    problem: &'a Problem,
    state: LoadState<'a>,
    /// Unplaced units per carton type; the next unit is at the back.
    queues: Vec<Vec<usize>>,
    remaining_volume: f64,
    /// Largest volume any packing can reach.
    ceiling: f64,
    best: Vec<Placement>,
    best_volume: f64,
    nodes: u64,
    node_limit: u64,
    budget: TimeBudget,
    stop: Option<StopReason>,
}

impl<'a> Search<'a> {
    fn new(problem: &'a Problem, incumbent: Vec<Placement>, node_limit: u64, budget: TimeBudget) -> Self {
        let order = problem.heuristic_order();
        let types: Vec<usize> = problem
            .distinct_types(&order)
            .into_iter()
            .map(|i| problem.instances()[i].carton_index)
            .collect();

        let mut queues = vec![Vec::new(); types.len()];
        for &instance in &order {
            let carton = problem.instances()[instance].carton_index;
            if let Some(slot) = types.iter().position(|&t| t == carton) {
                queues[slot].push(instance);
            }
        }
        for queue in &mut queues {
            queue.reverse();
        }

        let total = problem.total_volume();
        let best_volume = incumbent.iter().map(Placement::volume).sum();
        Self {
            problem,
            state: LoadState::new(problem),
            queues,
            remaining_volume: total,
            ceiling: total.min(problem.truck().usable_volume()),
            best: incumbent,
            best_volume,
            nodes: 0,
            node_limit,
            budget,
            stop: None,
        }
    }

    fn tolerance(&self) -> f64 {
        self.ceiling.max(1.0) * VOLUME_TOLERANCE
    }

    fn reached_ceiling(&self) -> bool {
        self.best_volume >= self.ceiling - self.tolerance()
    }

    fn run(&mut self) {
        if !self.reached_ceiling() {
            self.expand();
        }
    }

    fn expand(&mut self) {
        let placed = self.state.placed_volume();
        if placed > self.best_volume + self.tolerance() {
            self.best = self.state.placements().to_vec();
            self.best_volume = placed;
            log::debug!(
                "B&B node {}: incumbent volume {:.1} ({} boxes)",
                self.nodes,
                placed,
                self.best.len()
            );
            if self.reached_ceiling() {
                self.stop = Some(StopReason::Completed);
                return;
            }
        }

        let usable = self.problem.truck().usable_volume();
        let bound = placed + self.remaining_volume.min(usable - placed);
        if bound <= self.best_volume + self.tolerance() {
            return;
        }

        let problem = self.problem;
        let truck = problem.truck().dimensions();
        let mut anchors = normal_pattern_anchors(self.state.boxes());
        anchors.retain(|a| {
            (0..3).all(|axis| a[axis] < truck[axis] - EPSILON)
                && !self.state.boxes().iter().any(|b| b.strictly_contains_point(a))
        });
        for slot in 0..self.queues.len() {
            let Some(&instance) = self.queues[slot].last() else {
                continue;
            };
            if !self.state.has_capacity_for(instance) {
                continue;
            }
            let volume = problem.instance_volume(instance);

            for oriented in problem.orientations_of(instance) {
                for anchor in &anchors {
                    if !self.state.fits_at(anchor, &oriented.extents) {
                        continue;
                    }
                    if self.nodes >= self.node_limit {
                        self.stop = Some(StopReason::NodeLimit);
                        return;
                    }
                    if self.budget.exhausted() {
                        self.stop = Some(StopReason::TimeBudget);
                        return;
                    }
                    self.nodes += 1;

                    self.queues[slot].pop();
                    self.remaining_volume -= volume;
                    self.state.place(instance, oriented, *anchor);

                    self.expand();

                    self.state.undo();
                    self.remaining_volume += volume;
                    self.queues[slot].push(instance);

                    if self.stop.is_some() {
                        return;
                    }
                }
            }
        }
    }
}

/// Branch-and-bound strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchBoundPacker;

impl BranchBoundPacker {
    /// Creates a new packer.
    pub fn new() -> Self {
        Self
    }
}

impl PackingStrategy for BranchBoundPacker {
    fn pack(&self, problem: &Problem, options: &PackOptions) -> Result<PackingResult> {
        let budget = options.start_budget();
        let params = &options.params;
        log::info!(
            "branch-and-bound: packing {} instances, node limit {}",
            problem.instance_count(),
            params.node_limit
        );

        let decoder = Decoder::new(problem, DecoderKind::ExtremePoints, options.weights);
        let incumbent = decoder.decode(&Decoder::heuristic_seed(problem));

        let mut search = Search::new(problem, incumbent, params.node_limit, budget);
        search.run();

        let stop_reason = search.stop.unwrap_or(StopReason::Completed);
        let result = decoder
            .result("branch-and-bound", search.best)
            .with_stop_reason(stop_reason)
            .with_iterations(search.nodes)
            .with_elapsed_ms(budget.elapsed_ms());

        log::info!(
            "branch-and-bound: placed {}/{} after {} nodes ({:?})",
            result.placed_count(),
            problem.instance_count(),
            result.iterations,
            result.stop_reason
        );
        Ok(result)
    }
}

/// Returns the volume a result places.
pub fn placed_volume(result: &PackingResult) -> f64 {
    result.placements.iter().map(Placement::volume).sum()
}
