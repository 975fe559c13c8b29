//! Deterministic placement pass shared by every strategy.
//!
//! A [`Decoder`] turns a [`PackingSequence`] into placements: instances are
//! taken in sequence order, each tries its preferred orientation first and
//! falls back to its other permitted orientations, and an [`AnchorPolicy`]
//! (skyline or extreme points) picks the position. Instances that fit nowhere
//! are skipped and end up unplaced.

use crate::extreme_point::ExtremePointList;
use crate::load_state::LoadState;
use crate::skyline::HeightMap;
use nalgebra::Vector3;
use truckpack_core::geometry::Aabb;
use truckpack_core::{
    DecoderKind, Metrics, OrientedExtents, PackingResult, PackingSequence, Placement, Problem,
    ScoreWeights,
};

/// Chooses where the next instance goes.
pub trait AnchorPolicy {
    /// Returns the orientation and anchor for `instance`, trying
    /// `orientations` in preference order, or `None` if it fits nowhere.
    fn select(
        &self,
        state: &LoadState<'_>,
        instance: usize,
        orientations: &[OrientedExtents],
    ) -> Option<(OrientedExtents, Vector3<f64>)>;

    /// Updates the policy after a placement.
    fn record(&mut self, state: &LoadState<'_>, placed: &Aabb);
}

/// Decodes sequences into placements for one problem.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    problem: &'a Problem,
    kind: DecoderKind,
    weights: ScoreWeights,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder.
    pub fn new(problem: &'a Problem, kind: DecoderKind, weights: ScoreWeights) -> Self {
        Self {
            problem,
            kind,
            weights,
        }
    }

    /// Returns the problem.
    pub fn problem(&self) -> &'a Problem {
        self.problem
    }

    /// Returns the heuristic sequence: volume, weight and priority
    /// descending, input order ascending, first resolved orientation.
    pub fn heuristic_seed(problem: &Problem) -> PackingSequence {
        PackingSequence::from_order(problem.heuristic_order())
    }

    /// Places the sequence's instances in order.
    pub fn decode(&self, sequence: &PackingSequence) -> Vec<Placement> {
        self.decode_parts(&sequence.order, &sequence.orientations)
    }

    /// Places instances in `order`, with `genes[i]` the preferred orientation
    /// of instance `i` (taken modulo its resolved orientation count).
    pub fn decode_parts(&self, order: &[usize], genes: &[usize]) -> Vec<Placement> {
        let truck = self.problem.truck().dimensions();
        match self.kind {
            DecoderKind::ExtremePoints => {
                self.run(order, genes, &mut ExtremePointList::new(truck))
            }
            DecoderKind::Skyline => self.run(order, genes, &mut HeightMap::new(truck)),
        }
    }

    fn run<P: AnchorPolicy>(&self, order: &[usize], genes: &[usize], policy: &mut P) -> Vec<Placement> {
        let mut state = LoadState::new(self.problem);
        for &instance in order {
            if !state.has_capacity_for(instance) {
                continue;
            }
            let gene = genes.get(instance).copied().unwrap_or(0);
            let orientations = preference_order(self.problem.orientations_of(instance), gene);
            if let Some((oriented, anchor)) = policy.select(&state, instance, &orientations) {
                let placed = state.place(instance, &oriented, anchor);
                policy.record(&state, &placed);
            }
        }
        state.into_placements()
    }

    /// Returns the efficiency of a set of placements.
    pub fn score(&self, placements: &[Placement]) -> f64 {
        Metrics::compute(self.problem, placements, &self.weights).efficiency
    }

    /// Decodes and scores a sequence.
    pub fn evaluate(&self, sequence: &PackingSequence) -> f64 {
        self.score(&self.decode(sequence))
    }

    /// Builds a result for placements produced by this decoder.
    pub fn result(&self, strategy: &str, placements: Vec<Placement>) -> PackingResult {
        PackingResult::from_placements(self.problem, strategy, placements, &self.weights)
    }
}

/// Reorders resolved orientations so that `gene % len` comes first and the
/// rest follow in ascending order.
pub fn preference_order(resolved: &[OrientedExtents], gene: usize) -> Vec<OrientedExtents> {
    if resolved.is_empty() {
        return Vec::new();
    }
    let first = gene % resolved.len();
    let mut ordered = Vec::with_capacity(resolved.len());
    ordered.push(resolved[first]);
    ordered.extend(
        resolved
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != first)
            .map(|(_, o)| *o),
    );
    ordered
}
