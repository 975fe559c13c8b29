//! Incremental load state with feasibility checks.
//!
//! A [`LoadState`] is owned by one placement pass. It tracks the boxes placed
//! so far and their running weight and volume, and answers whether a carton
//! instance can go at an anchor under a given orientation.

use nalgebra::Vector3;
use truckpack_core::geometry::{self, Aabb, EPSILON};
use truckpack_core::{OrientedExtents, Placement, Problem};

/// Boxes placed so far in one truck.
#[derive(Debug, Clone)]
pub struct LoadState<'a> {
    problem: &'a Problem,
    bounds: Aabb,
    placements: Vec<Placement>,
    boxes: Vec<Aabb>,
    /// Whether each placed box may carry another carton.
    load_bearing: Vec<bool>,
    weight: f64,
    volume: f64,
}

impl<'a> LoadState<'a> {
    /// Creates an empty load for the problem's truck.
    pub fn new(problem: &'a Problem) -> Self {
        Self {
            problem,
            bounds: problem.truck().bounds(),
            placements: Vec::new(),
            boxes: Vec::new(),
            load_bearing: Vec::new(),
            weight: 0.0,
            volume: 0.0,
        }
    }

    /// Returns the problem.
    pub fn problem(&self) -> &'a Problem {
        self.problem
    }

    /// Returns the placed boxes.
    pub fn boxes(&self) -> &[Aabb] {
        &self.boxes
    }

    /// Returns the placements in placement order.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Consumes the state, returning its placements.
    pub fn into_placements(self) -> Vec<Placement> {
        self.placements
    }

    /// Returns the number of placed instances.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Returns true if nothing is placed.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Returns the placed weight.
    pub fn placed_weight(&self) -> f64 {
        self.weight
    }

    /// Returns the placed volume.
    pub fn placed_volume(&self) -> f64 {
        self.volume
    }

    /// Returns true if the instance still fits the weight and volume limits.
    pub fn has_capacity_for(&self, instance: usize) -> bool {
        let truck = self.problem.truck();
        self.weight + self.problem.instance_weight(instance) <= truck.max_weight() + EPSILON
            && self.volume + self.problem.instance_volume(instance)
                <= truck.usable_volume() * (1.0 + EPSILON)
    }

    /// Returns true if a box of `extents` anchored at `anchor` lies inside the
    /// truck, overlaps nothing and rests on no non-stackable carton.
    pub fn fits_at(&self, anchor: &Vector3<f64>, extents: &Vector3<f64>) -> bool {
        let candidate = Aabb::from_anchor(*anchor, *extents);
        if !geometry::contains(&self.bounds, &candidate) {
            return false;
        }
        if self.boxes.iter().any(|b| geometry::overlaps(b, &candidate)) {
            return false;
        }
        !self.rests_on_fragile(&candidate)
    }

    /// Returns true if the instance can be placed at the anchor.
    pub fn can_place(&self, instance: usize, anchor: &Vector3<f64>, extents: &Vector3<f64>) -> bool {
        self.has_capacity_for(instance) && self.fits_at(anchor, extents)
    }

    /// Records a placement. The caller is responsible for feasibility.
    pub fn place(&mut self, instance: usize, oriented: &OrientedExtents, anchor: Vector3<f64>) -> Aabb {
        let carton = self.problem.carton_of(instance);
        let placement = Placement {
            instance,
            carton_id: carton.id().to_string(),
            ordinal: self.problem.instances()[instance].ordinal,
            orientation: oriented.orientation,
            position: anchor,
            extents: oriented.extents,
        };
        let bounds = placement.bounds();

        self.weight += carton.weight();
        self.volume += placement.volume();
        self.load_bearing.push(carton.is_stackable());
        self.boxes.push(bounds);
        self.placements.push(placement);
        bounds
    }

    /// Removes the most recent placement.
    pub fn undo(&mut self) -> Option<Placement> {
        let placement = self.placements.pop()?;
        self.boxes.pop();
        self.load_bearing.pop();
        self.weight -= self.problem.instance_weight(placement.instance);
        self.volume -= placement.volume();
        Some(placement)
    }

    fn rests_on_fragile(&self, candidate: &Aabb) -> bool {
        if candidate.min.z <= EPSILON {
            return false;
        }
        self.boxes
            .iter()
            .zip(&self.load_bearing)
            .filter(|&(_, &bearing)| !bearing)
            .any(|(b, _)| {
                (b.max.z - candidate.min.z).abs() <= EPSILON
                    && geometry::footprint_overlap_area(b, candidate) > 0.0
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use truckpack_core::{Carton, Truck};

    fn oriented(extents: Vector3<f64>) -> OrientedExtents {
        OrientedExtents {
            orientation: 0,
            extents,
        }
    }

    #[test]
    fn test_fits_and_places() {
        let problem = Problem::new(
            vec![Carton::new("A", 50.0, 50.0, 50.0).with_quantity(2)],
            Truck::new(100.0, 50.0, 50.0, 1000.0),
        )
        .unwrap();
        let mut state = LoadState::new(&problem);
        let dims = Vector3::new(50.0, 50.0, 50.0);

        assert!(state.can_place(0, &Vector3::zeros(), &dims));
        state.place(0, &oriented(dims), Vector3::zeros());

        assert!(!state.can_place(1, &Vector3::new(25.0, 0.0, 0.0), &dims));
        assert!(state.can_place(1, &Vector3::new(50.0, 0.0, 0.0), &dims));
        assert!(!state.can_place(1, &Vector3::new(60.0, 0.0, 0.0), &dims));
    }

    #[test]
    fn test_capacity_limits() {
        let problem = Problem::new(
            vec![Carton::new("A", 10.0, 10.0, 10.0)
                .with_weight(60.0)
                .with_quantity(2)],
            Truck::new(100.0, 100.0, 100.0, 100.0),
        )
        .unwrap();
        let mut state = LoadState::new(&problem);
        let dims = Vector3::new(10.0, 10.0, 10.0);

        assert!(state.has_capacity_for(0));
        state.place(0, &oriented(dims), Vector3::zeros());
        assert!(!state.has_capacity_for(1));

        state.undo();
        assert!(state.is_empty());
        assert_eq!(state.placed_weight(), 0.0);
    }

    #[test]
    fn test_usable_volume_limit() {
        // Usable volume of 0.0015 m³ = 1500 cm³ admits one 1000 cm³ carton.
        let problem = Problem::new(
            vec![Carton::new("A", 10.0, 10.0, 10.0).with_quantity(2)],
            Truck::new(100.0, 100.0, 100.0, 100.0).with_max_volume(0.0015),
        )
        .unwrap();
        let mut state = LoadState::new(&problem);
        let dims = Vector3::new(10.0, 10.0, 10.0);
        state.place(0, &oriented(dims), Vector3::zeros());
        assert!(!state.has_capacity_for(1));
    }

    #[test]
    fn test_non_stackable_carries_nothing() {
        let problem = Problem::new(
            vec![
                Carton::new("fragile", 50.0, 50.0, 50.0).with_stackable(false),
                Carton::new("B", 50.0, 50.0, 50.0),
            ],
            Truck::new(100.0, 50.0, 100.0, 1000.0),
        )
        .unwrap();
        let mut state = LoadState::new(&problem);
        let dims = Vector3::new(50.0, 50.0, 50.0);
        state.place(0, &oriented(dims), Vector3::zeros());

        assert!(!state.fits_at(&Vector3::new(0.0, 0.0, 50.0), &dims));
        assert!(state.fits_at(&Vector3::new(50.0, 0.0, 0.0), &dims));
    }
}
