//! Orientation resolver.
//!
//! A carton has six axis-aligned orientations, each a permutation assigning
//! its (length, width, height) edges to the truck's (x, y, z) axes.

use crate::carton::Carton;
use crate::error::{Error, Result};
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis permutation for each orientation index.
///
/// Entry `i` is `(x_src, y_src, z_src)` where 0 = length, 1 = width, 2 = height.
pub const PERMUTATIONS: [(usize, usize, usize); 6] = [
    (0, 1, 2), // Original
    (0, 2, 1), // Rotated 90° around x
    (1, 0, 2), // Rotated 90° around z
    (1, 2, 0), // Rotated 90° around x then z
    (2, 0, 1), // Rotated 90° around y
    (2, 1, 0), // Rotated 90° around y then x
];

/// Orientation indices that keep the carton's height on the z axis.
pub const UPRIGHT: [usize; 2] = [0, 2];

/// Set of permitted orientation indices (bit `i` = orientation `i`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<u8>", into = "Vec<u8>"))]
pub struct OrientationSet(u8);

impl OrientationSet {
    /// All six orientations.
    pub const ALL: Self = Self(0b11_1111);
    /// The two orientations that keep the carton upright.
    pub const UPRIGHT: Self = Self(0b00_0101);
    /// No orientation permitted (invalid for packing).
    pub const EMPTY: Self = Self(0);

    /// Creates a set from orientation indices; indices above 5 are rejected.
    pub fn from_indices(indices: &[u8]) -> Result<Self> {
        let mut bits = 0u8;
        for &idx in indices {
            if idx > 5 {
                return Err(Error::InvalidConstraint(format!(
                    "orientation index {} out of range 0..=5",
                    idx
                )));
            }
            bits |= 1 << idx;
        }
        Ok(Self(bits))
    }

    /// Returns true if the orientation index is permitted.
    pub fn contains(&self, index: usize) -> bool {
        index < 6 && self.0 & (1 << index) != 0
    }

    /// Returns true if no orientation is permitted.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns the number of permitted orientations.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates permitted indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..6).filter(move |&i| self.contains(i))
    }
}

impl Default for OrientationSet {
    fn default() -> Self {
        Self::ALL
    }
}

impl TryFrom<Vec<u8>> for OrientationSet {
    type Error = Error;

    fn try_from(indices: Vec<u8>) -> Result<Self> {
        Self::from_indices(&indices)
    }
}

impl From<OrientationSet> for Vec<u8> {
    fn from(set: OrientationSet) -> Self {
        set.iter().map(|i| i as u8).collect()
    }
}

/// Concrete extents of a carton under one orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedExtents {
    /// Orientation index (0..6).
    pub orientation: usize,
    /// Size along x, y, z.
    pub extents: Vector3<f64>,
}

/// Applies orientation `index` to `(length, width, height)`.
pub fn apply(dims: &Vector3<f64>, index: usize) -> Vector3<f64> {
    let (x, y, z) = PERMUTATIONS[index % PERMUTATIONS.len()];
    Vector3::new(dims[x], dims[y], dims[z])
}

/// Resolves the distinct oriented extents a carton may take.
///
/// Orientations yielding identical extents are collapsed, keeping the lowest
/// index (a cube has a single effective orientation). Fails with
/// [`Error::InvalidConstraint`] if the carton permits no orientation.
pub fn resolve(carton: &Carton) -> Result<Vec<OrientedExtents>> {
    let permitted = carton.permitted_orientations();
    if permitted.is_empty() {
        return Err(Error::InvalidConstraint(format!(
            "carton '{}' has an empty orientation set",
            carton.id()
        )));
    }

    let dims = carton.dimensions();
    let mut resolved: Vec<OrientedExtents> = Vec::with_capacity(permitted.len());
    for orientation in permitted.iter() {
        let extents = apply(&dims, orientation);
        if resolved
            .iter()
            .any(|r| (r.extents - extents).amax() < crate::geometry::EPSILON)
        {
            continue;
        }
        resolved.push(OrientedExtents {
            orientation,
            extents,
        });
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_set_basics() {
        assert_eq!(OrientationSet::ALL.len(), 6);
        assert_eq!(OrientationSet::UPRIGHT.iter().collect::<Vec<_>>(), vec![0, 2]);
        assert!(OrientationSet::EMPTY.is_empty());
        assert!(OrientationSet::from_indices(&[6]).is_err());

        let set = OrientationSet::from_indices(&[1, 4]).unwrap();
        assert!(set.contains(1) && set.contains(4) && !set.contains(0));
    }

    #[test]
    fn test_apply_keeps_upright_height() {
        let dims = Vector3::new(50.0, 30.0, 40.0);
        for &idx in &UPRIGHT {
            assert_eq!(apply(&dims, idx).z, 40.0);
        }
        assert_eq!(apply(&dims, 1), Vector3::new(50.0, 40.0, 30.0));
    }

    #[test]
    fn test_resolve_distinct_box() {
        let carton = Carton::new("A", 50.0, 30.0, 40.0);
        let resolved = resolve(&carton).unwrap();
        assert_eq!(resolved.len(), 6);
    }

    #[test]
    fn test_resolve_deduplicates_cube() {
        let carton = Carton::new("C", 20.0, 20.0, 20.0);
        let resolved = resolve(&carton).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].orientation, 0);
    }

    #[test]
    fn test_resolve_square_base() {
        // Two equal edges leave three distinct extents.
        let carton = Carton::new("S", 20.0, 20.0, 50.0);
        assert_eq!(resolve(&carton).unwrap().len(), 3);
    }

    #[test]
    fn test_resolve_upright_only() {
        let carton = Carton::new("U", 50.0, 30.0, 40.0).with_keep_upright(true);
        let resolved = resolve(&carton).unwrap();
        assert_eq!(resolved.len(), 2);
        assert!(resolved.iter().all(|r| r.extents.z == 40.0));
    }

    #[test]
    fn test_resolve_empty_set_fails() {
        let carton =
            Carton::new("E", 50.0, 30.0, 40.0).with_allowed_orientations(OrientationSet::EMPTY);
        assert!(matches!(resolve(&carton), Err(Error::InvalidConstraint(_))));
    }
}
