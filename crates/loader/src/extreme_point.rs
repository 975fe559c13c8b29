//! Extreme Point heuristic.
//!
//! Extreme points are positions where a new carton could be placed touching
//! the walls or other cartons. The list is kept in insertion order. When a
//! carton is placed, three new points appear at its +x, +y and +z corners,
//! followed by the gravity projections of the +x and +y points onto the
//! surface below them. Points that become dominated (duplicates, points
//! inside a placed carton, points on or beyond a truck wall) are removed.
//!
//! # References
//!
//! - Crainic, T. G., Perboli, G., & Tadei, R. (2008). Extreme point-based heuristics
//!   for three-dimensional bin packing.

use crate::load_state::LoadState;
use crate::placement_pass::{AnchorPolicy, Decoder};
use nalgebra::Vector3;
use truckpack_core::geometry::{self, Aabb, EPSILON};
use truckpack_core::{
    DecoderKind, OrientedExtents, PackOptions, PackingResult, PackingStrategy, Problem, Result,
};

/// Insertion-ordered extreme point list.
#[derive(Debug, Clone)]
pub struct ExtremePointList {
    truck: Vector3<f64>,
    points: Vec<Vector3<f64>>,
}

impl ExtremePointList {
    /// Creates a list holding only the truck origin.
    pub fn new(truck: Vector3<f64>) -> Self {
        Self {
            truck,
            points: vec![Vector3::zeros()],
        }
    }

    /// Returns the points in insertion order.
    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    /// Returns the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if no point remains.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Updates the list after `placed` was added to `boxes`.
    pub fn update(&mut self, boxes: &[Aabb], placed: &Aabb) {
        self.points.retain(|p| !starts_inside(placed, p));

        // The origin comes back too; it is either still listed or covered.
        let corners =
            geometry::candidate_anchors(std::slice::from_ref(placed), &placed.extents());
        let projected: Vec<Vector3<f64>> = corners
            .iter()
            .filter(|c| (c.z - placed.min.z).abs() < EPSILON)
            .map(|c| project_down(boxes, c))
            .collect();
        for point in corners.into_iter().chain(projected) {
            self.push(boxes, point);
        }
    }

    fn push(&mut self, boxes: &[Aabb], point: Vector3<f64>) {
        let inside_truck = (0..3).all(|axis| point[axis] < self.truck[axis] - EPSILON);
        if !inside_truck
            || self.points.iter().any(|p| geometry::same_point(p, &point))
            || boxes.iter().any(|b| starts_inside(b, &point))
        {
            return;
        }
        self.points.push(point);
    }
}

/// Returns true if a box anchored at `p` would begin inside `b`.
fn starts_inside(b: &Aabb, p: &Vector3<f64>) -> bool {
    (0..3).all(|axis| p[axis] >= b.min[axis] - EPSILON && p[axis] < b.max[axis] - EPSILON)
}

/// Drops a point onto the highest top face beneath it, or the floor.
fn project_down(boxes: &[Aabb], p: &Vector3<f64>) -> Vector3<f64> {
    let z = boxes
        .iter()
        .filter(|b| {
            b.max.z <= p.z + EPSILON
                && p.x >= b.min.x - EPSILON
                && p.x < b.max.x - EPSILON
                && p.y >= b.min.y - EPSILON
                && p.y < b.max.y - EPSILON
        })
        .map(|b| b.max.z)
        .fold(0.0, f64::max);
    Vector3::new(p.x, p.y, z)
}

impl AnchorPolicy for ExtremePointList {
    fn select(
        &self,
        state: &LoadState<'_>,
        _instance: usize,
        orientations: &[OrientedExtents],
    ) -> Option<(OrientedExtents, Vector3<f64>)> {
        for point in &self.points {
            for oriented in orientations {
                if state.fits_at(point, &oriented.extents) {
                    return Some((*oriented, *point));
                }
            }
        }
        None
    }

    fn record(&mut self, state: &LoadState<'_>, placed: &Aabb) {
        self.update(state.boxes(), placed);
    }
}

/// Extreme Point heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtremePointPacker;

impl ExtremePointPacker {
    /// Creates a new packer.
    pub fn new() -> Self {
        Self
    }
}

impl PackingStrategy for ExtremePointPacker {
    fn pack(&self, problem: &Problem, options: &PackOptions) -> Result<PackingResult> {
        let budget = options.start_budget();
        log::info!("extreme-points: packing {} instances", problem.instance_count());

        let decoder = Decoder::new(problem, DecoderKind::ExtremePoints, options.weights);
        let placements = decoder.decode(&Decoder::heuristic_seed(problem));
        let result = decoder
            .result("extreme-points", placements)
            .with_iterations(problem.instance_count() as u64)
            .with_elapsed_ms(budget.elapsed_ms());

        log::info!(
            "extreme-points: placed {}/{}, efficiency {:.4}",
            result.placed_count(),
            problem.instance_count(),
            result.efficiency()
        );
        Ok(result)
    }
}
