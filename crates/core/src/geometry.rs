//! Geometry kernel: axis-aligned boxes and the tests every strategy relies on.
//!
//! All functions here are pure. Coordinates are `f64` centimetres in the
//! truck frame (origin at one floor corner, x along the length, y along the
//! width, z up). Comparisons absorb accumulated rounding with [`EPSILON`] so
//! that boxes sharing a face are treated as touching, not overlapping.

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance used for every coordinate comparison.
pub const EPSILON: f64 = 1e-6;

/// An axis-aligned bounding box given by its min and max corners.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vector3<f64>,
    /// Maximum corner.
    pub max: Vector3<f64>,
}

impl Aabb {
    /// Creates a box from its min and max corners.
    pub fn new(min: Vector3<f64>, max: Vector3<f64>) -> Self {
        Self { min, max }
    }

    /// Creates a box anchored at `anchor` (min corner) with the given extents.
    pub fn from_anchor(anchor: Vector3<f64>, extents: Vector3<f64>) -> Self {
        Self {
            min: anchor,
            max: anchor + extents,
        }
    }

    /// Creates the box spanning `[0, extents]` on every axis.
    pub fn from_extents(extents: Vector3<f64>) -> Self {
        Self::from_anchor(Vector3::zeros(), extents)
    }

    /// Returns the size along each axis.
    pub fn extents(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Returns the volume.
    pub fn volume(&self) -> f64 {
        let e = self.extents();
        e.x * e.y * e.z
    }

    /// Returns the floor (xy) area.
    pub fn base_area(&self) -> f64 {
        let e = self.extents();
        e.x * e.y
    }

    /// Returns the 8 corner points.
    pub fn corners(&self) -> [Vector3<f64>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vector3::new(lo.x, lo.y, lo.z),
            Vector3::new(hi.x, lo.y, lo.z),
            Vector3::new(lo.x, hi.y, lo.z),
            Vector3::new(hi.x, hi.y, lo.z),
            Vector3::new(lo.x, lo.y, hi.z),
            Vector3::new(hi.x, lo.y, hi.z),
            Vector3::new(lo.x, hi.y, hi.z),
            Vector3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Returns true if the point lies inside or on the surface of this box.
    pub fn contains_point(&self, p: &Vector3<f64>) -> bool {
        (0..3).all(|axis| p[axis] >= self.min[axis] - EPSILON && p[axis] <= self.max[axis] + EPSILON)
    }

    /// Returns true if the point lies strictly inside this box.
    pub fn strictly_contains_point(&self, p: &Vector3<f64>) -> bool {
        (0..3).all(|axis| p[axis] > self.min[axis] + EPSILON && p[axis] < self.max[axis] - EPSILON)
    }
}

/// Returns true if two boxes intersect with positive volume.
///
/// Two boxes overlap iff their projections overlap on all three axes. Touching
/// faces (zero-volume intersection) do not count, which allows flush packing.
pub fn overlaps(a: &Aabb, b: &Aabb) -> bool {
    (0..3).all(|axis| a.min[axis] < b.max[axis] - EPSILON && b.min[axis] < a.max[axis] - EPSILON)
}

/// Returns true if all 8 corners of `inner` lie within `outer`.
pub fn contains(outer: &Aabb, inner: &Aabb) -> bool {
    inner.corners().iter().all(|c| outer.contains_point(c))
}

/// Returns the area of the xy-projection intersection of two boxes.
pub fn footprint_overlap_area(a: &Aabb, b: &Aabb) -> f64 {
    let dx = a.max.x.min(b.max.x) - a.min.x.max(b.min.x);
    let dy = a.max.y.min(b.max.y) - a.min.y.max(b.min.y);
    if dx <= EPSILON || dy <= EPSILON {
        0.0
    } else {
        dx * dy
    }
}

/// Generates candidate anchor points for a new box of the given extents.
///
/// Candidates are the truck origin and, for every placed box, the three
/// corner points adjacent to it along +x, +y and +z. Points whose anchored
/// box would start inside an already placed box are dropped. Feasibility
/// (containment, overlap) is left to the caller.
pub fn candidate_anchors(placed: &[Aabb], extents: &Vector3<f64>) -> Vec<Vector3<f64>> {
    let mut anchors = vec![Vector3::zeros()];
    for b in placed {
        anchors.push(Vector3::new(b.max.x, b.min.y, b.min.z));
        anchors.push(Vector3::new(b.min.x, b.max.y, b.min.z));
        anchors.push(Vector3::new(b.min.x, b.min.y, b.max.z));
    }

    let mut unique: Vec<Vector3<f64>> = Vec::with_capacity(anchors.len());
    for a in anchors {
        if unique.iter().any(|u| same_point(u, &a)) {
            continue;
        }
        // A zero-extent probe anchored here must not start inside a placed box.
        let probe_center = a + extents.map(|e| e.min(EPSILON * 10.0));
        if placed.iter().any(|b| b.strictly_contains_point(&probe_center)) {
            continue;
        }
        unique.push(a);
    }
    unique
}

/// Generates the normal-pattern anchors for a set of placed boxes.
///
/// Each coordinate is either 0 or the max coordinate of some placed box on
/// that axis; every packing can be compacted so that all boxes sit on such
/// points, which makes this set complete for exhaustive search. Anchors are
/// ordered by z, then y, then x.
pub fn normal_pattern_anchors(placed: &[Aabb]) -> Vec<Vector3<f64>> {
    let axis_values = |axis: usize| -> Vec<f64> {
        let mut values = vec![0.0];
        values.extend(placed.iter().map(|b| b.max[axis]));
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup_by(|a, b| (*a - *b).abs() < EPSILON);
        values
    };

    let xs = axis_values(0);
    let ys = axis_values(1);
    let zs = axis_values(2);

    let mut anchors = Vec::with_capacity(xs.len() * ys.len() * zs.len());
    for &z in &zs {
        for &y in &ys {
            for &x in &xs {
                anchors.push(Vector3::new(x, y, z));
            }
        }
    }
    anchors
}

/// Returns true if two points coincide within tolerance.
pub fn same_point(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
    (a - b).amax() < EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube(x: f64, y: f64, z: f64, size: f64) -> Aabb {
        Aabb::from_anchor(Vector3::new(x, y, z), Vector3::new(size, size, size))
    }

    #[test]
    fn test_aabb_volume_and_area() {
        let b = Aabb::from_extents(Vector3::new(50.0, 30.0, 40.0));
        assert_relative_eq!(b.volume(), 60_000.0, epsilon = 1e-9);
        assert_relative_eq!(b.base_area(), 1_500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_overlap_detection() {
        let a = cube(0.0, 0.0, 0.0, 10.0);
        assert!(overlaps(&a, &cube(5.0, 5.0, 5.0, 10.0)));
        assert!(!overlaps(&a, &cube(15.0, 0.0, 0.0, 10.0)));
    }

    #[test]
    fn test_touching_faces_do_not_overlap() {
        let a = cube(0.0, 0.0, 0.0, 10.0);
        assert!(!overlaps(&a, &cube(10.0, 0.0, 0.0, 10.0)));
        assert!(!overlaps(&a, &cube(0.0, 10.0, 0.0, 10.0)));
        assert!(!overlaps(&a, &cube(0.0, 0.0, 10.0, 10.0)));
        // Rounding noise at a shared face is absorbed.
        assert!(!overlaps(&a, &cube(10.0 - 1e-9, 0.0, 0.0, 10.0)));
    }

    #[test]
    fn test_overlap_requires_all_axes() {
        let a = cube(0.0, 0.0, 0.0, 10.0);
        // Overlaps on x and y but separated on z.
        assert!(!overlaps(&a, &cube(2.0, 2.0, 20.0, 10.0)));
    }

    #[test]
    fn test_contains() {
        let truck = Aabb::from_extents(Vector3::new(100.0, 50.0, 50.0));
        assert!(contains(&truck, &cube(0.0, 0.0, 0.0, 50.0)));
        assert!(contains(&truck, &cube(50.0, 0.0, 0.0, 50.0)));
        assert!(!contains(&truck, &cube(60.0, 0.0, 0.0, 50.0)));
        assert!(!contains(&truck, &cube(-1.0, 0.0, 0.0, 10.0)));
    }

    #[test]
    fn test_footprint_overlap_area() {
        let a = cube(0.0, 0.0, 0.0, 10.0);
        let b = cube(5.0, 5.0, 10.0, 10.0);
        assert_relative_eq!(footprint_overlap_area(&a, &b), 25.0, epsilon = 1e-9);
        assert_eq!(footprint_overlap_area(&a, &cube(10.0, 0.0, 0.0, 5.0)), 0.0);
    }

    #[test]
    fn test_candidate_anchors_empty() {
        let anchors = candidate_anchors(&[], &Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(anchors.len(), 1);
        assert!(same_point(&anchors[0], &Vector3::zeros()));
    }

    #[test]
    fn test_candidate_anchors_corners() {
        let placed = [cube(0.0, 0.0, 0.0, 10.0)];
        let anchors = candidate_anchors(&placed, &Vector3::new(5.0, 5.0, 5.0));
        // The origin is inside the placed box, the three corner points are not.
        assert_eq!(anchors.len(), 3);
        assert!(anchors.iter().any(|a| same_point(a, &Vector3::new(10.0, 0.0, 0.0))));
        assert!(anchors.iter().any(|a| same_point(a, &Vector3::new(0.0, 10.0, 0.0))));
        assert!(anchors.iter().any(|a| same_point(a, &Vector3::new(0.0, 0.0, 10.0))));
    }

    #[test]
    fn test_normal_pattern_anchors() {
        let placed = [cube(0.0, 0.0, 0.0, 10.0), cube(10.0, 0.0, 0.0, 5.0)];
        let anchors = normal_pattern_anchors(&placed);
        // x ∈ {0, 10, 15}, y ∈ {0, 5, 10}, z ∈ {0, 5, 10}
        assert_eq!(anchors.len(), 27);
        assert!(same_point(&anchors[0], &Vector3::zeros()));
        // Ordered by z first.
        assert!(anchors.windows(2).all(|w| w[0].z <= w[1].z));
    }
}
