//! Placement of a carton instance inside the truck.

use crate::geometry::Aabb;
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A carton instance at a fixed orientation and anchor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Placement {
    /// Instance index within the problem.
    pub instance: usize,

    /// ID of the source carton.
    pub carton_id: String,

    /// Ordinal among units of the same carton.
    pub ordinal: usize,

    /// Orientation index (0..6).
    pub orientation: usize,

    /// Min corner in the truck frame.
    pub position: Vector3<f64>,

    /// Size along x, y, z under the chosen orientation.
    pub extents: Vector3<f64>,
}

impl Placement {
    /// Returns the occupied box.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_anchor(self.position, self.extents)
    }

    /// Returns the occupied volume.
    pub fn volume(&self) -> f64 {
        self.extents.x * self.extents.y * self.extents.z
    }

    /// Returns the x coordinate.
    pub fn x(&self) -> f64 {
        self.position.x
    }

    /// Returns the y coordinate.
    pub fn y(&self) -> f64 {
        self.position.y
    }

    /// Returns the z coordinate.
    pub fn z(&self) -> f64 {
        self.position.z
    }
}

/// An instance left out of the load.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Unplaced {
    /// Instance index within the problem.
    pub instance: usize,
    /// ID of the source carton.
    pub carton_id: String,
    /// Ordinal among units of the same carton.
    pub ordinal: usize,
}
