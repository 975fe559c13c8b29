//! Skyline-Bottom-Left placement.
//!
//! The skyline is kept as a height map of floor rectangles: every placed
//! carton contributes its footprint at its top height. A new carton rests at
//! the highest tile under its footprint, so it is always placed on top of the
//! contour and never slid under an overhang. Candidates are the corners of
//! the map (`{0} ∪ tile max x` × `{0} ∪ tile max y`), ordered by resting
//! height, then x, then y, then orientation preference; the first feasible
//! candidate wins.

use crate::load_state::LoadState;
use crate::placement_pass::{AnchorPolicy, Decoder};
use nalgebra::Vector3;
use std::cmp::Ordering;
use truckpack_core::geometry::{Aabb, EPSILON};
use truckpack_core::{
    DecoderKind, OrientedExtents, PackOptions, PackingResult, PackingStrategy, Problem, Result,
};

/// A floor rectangle of the height map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    /// Minimum x.
    pub min_x: f64,
    /// Minimum y.
    pub min_y: f64,
    /// Maximum x.
    pub max_x: f64,
    /// Maximum y.
    pub max_y: f64,
    /// Height of the surface.
    pub top: f64,
}

impl Tile {
    fn overlaps_footprint(&self, x: f64, y: f64, ex: f64, ey: f64) -> bool {
        self.min_x < x + ex - EPSILON
            && x < self.max_x - EPSILON
            && self.min_y < y + ey - EPSILON
            && y < self.max_y - EPSILON
    }
}

/// Upper contour of the load.
#[derive(Debug, Clone)]
pub struct HeightMap {
    truck: Vector3<f64>,
    tiles: Vec<Tile>,
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl HeightMap {
    /// Creates a flat map over the truck floor.
    pub fn new(truck: Vector3<f64>) -> Self {
        Self {
            truck,
            tiles: Vec::new(),
            xs: vec![0.0],
            ys: vec![0.0],
        }
    }

    /// Returns the tiles.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Returns the height a footprint would rest at.
    pub fn resting_height(&self, x: f64, y: f64, ex: f64, ey: f64) -> f64 {
        self.tiles
            .iter()
            .filter(|t| t.overlaps_footprint(x, y, ex, ey))
            .map(|t| t.top)
            .fold(0.0, f64::max)
    }

    /// Raises the map under a newly placed box.
    pub fn raise(&mut self, placed: &Aabb) {
        self.tiles.push(Tile {
            min_x: placed.min.x,
            min_y: placed.min.y,
            max_x: placed.max.x,
            max_y: placed.max.y,
            top: placed.max.z,
        });
        insert_sorted(&mut self.xs, placed.max.x);
        insert_sorted(&mut self.ys, placed.max.y);
    }

    /// Lists candidate anchors for each orientation as
    /// `(anchor, orientation rank)`, sorted by z, x, y, then rank.
    pub fn candidates(&self, orientations: &[OrientedExtents]) -> Vec<(Vector3<f64>, usize)> {
        let mut out = Vec::new();
        for (rank, oriented) in orientations.iter().enumerate() {
            let e = oriented.extents;
            for &x in self.xs.iter().filter(|&&x| x + e.x <= self.truck.x + EPSILON) {
                for &y in self.ys.iter().filter(|&&y| y + e.y <= self.truck.y + EPSILON) {
                    let z = self.resting_height(x, y, e.x, e.y);
                    if z + e.z <= self.truck.z + EPSILON {
                        out.push((Vector3::new(x, y, z), rank));
                    }
                }
            }
        }
        out.sort_by(|(a, ra), (b, rb)| {
            a.z.total_cmp(&b.z)
                .then_with(|| a.x.total_cmp(&b.x))
                .then_with(|| a.y.total_cmp(&b.y))
                .then_with(|| ra.cmp(rb))
        });
        out
    }
}

fn insert_sorted(values: &mut Vec<f64>, value: f64) {
    let pos = values.partition_point(|v| v.total_cmp(&value) == Ordering::Less);
    let near = |i: usize| values.get(i).is_some_and(|v| (v - value).abs() < EPSILON);
    if near(pos) || (pos > 0 && near(pos - 1)) {
        return;
    }
    values.insert(pos, value);
}

impl AnchorPolicy for HeightMap {
    fn select(
        &self,
        state: &LoadState<'_>,
        _instance: usize,
        orientations: &[OrientedExtents],
    ) -> Option<(OrientedExtents, Vector3<f64>)> {
        self.candidates(orientations)
            .into_iter()
            .find(|(anchor, rank)| state.fits_at(anchor, &orientations[*rank].extents))
            .map(|(anchor, rank)| (orientations[rank], anchor))
    }

    fn record(&mut self, _state: &LoadState<'_>, placed: &Aabb) {
        self.raise(placed);
    }
}

/// Skyline-Bottom-Left heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkylinePacker;

impl SkylinePacker {
    /// Creates a new packer.
    pub fn new() -> Self {
        Self
    }
}

impl PackingStrategy for SkylinePacker {
    fn pack(&self, problem: &Problem, options: &PackOptions) -> Result<PackingResult> {
        let budget = options.start_budget();
        log::info!("skyline: packing {} instances", problem.instance_count());

        let decoder = Decoder::new(problem, DecoderKind::Skyline, options.weights);
        let placements = decoder.decode(&Decoder::heuristic_seed(problem));
        let result = decoder
            .result("skyline", placements)
            .with_iterations(problem.instance_count() as u64)
            .with_elapsed_ms(budget.elapsed_ms());

        log::info!(
            "skyline: placed {}/{}, efficiency {:.4}",
            result.placed_count(),
            problem.instance_count(),
            result.efficiency()
        );
        Ok(result)
    }
}
