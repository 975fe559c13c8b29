//! Truck (container) definitions.

use crate::error::{Error, Result};
use crate::geometry::Aabb;
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cubic centimetres per cubic metre.
pub const CM3_PER_M3: f64 = 1_000_000.0;

/// A truck's cargo space.
///
/// Interior dimensions are in centimetres, payload in kilograms, and the
/// optional usable volume in cubic metres.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Truck {
    /// Identifier.
    #[cfg_attr(feature = "serde", serde(default))]
    id: String,

    /// Interior length (x axis).
    length: f64,

    /// Interior width (y axis).
    width: f64,

    /// Interior height (z axis).
    height: f64,

    /// Maximum payload weight.
    max_weight: f64,

    /// Maximum usable volume in cubic metres, if less than the geometric volume.
    #[cfg_attr(feature = "serde", serde(default))]
    max_volume: Option<f64>,
}

impl Truck {
    /// Creates a truck with the given interior dimensions and payload limit.
    pub fn new(length: f64, width: f64, height: f64, max_weight: f64) -> Self {
        Self {
            id: String::new(),
            length,
            width,
            height,
            max_weight,
            max_volume: None,
        }
    }

    /// Sets the identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the usable volume in cubic metres.
    pub fn with_max_volume(mut self, cubic_metres: f64) -> Self {
        self.max_volume = Some(cubic_metres);
        self
    }

    /// Returns the identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns (length, width, height).
    pub fn dimensions(&self) -> Vector3<f64> {
        Vector3::new(self.length, self.width, self.height)
    }

    /// Returns the maximum payload weight.
    pub fn max_weight(&self) -> f64 {
        self.max_weight
    }

    /// Returns the cargo space as a box anchored at the origin.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_extents(self.dimensions())
    }

    /// Returns the geometric interior volume in cm³.
    pub fn geometric_volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Returns the usable volume in cm³.
    pub fn usable_volume(&self) -> f64 {
        let geometric = self.geometric_volume();
        match self.max_volume {
            Some(m3) => geometric.min(m3 * CM3_PER_M3),
            None => geometric,
        }
    }

    /// Validates the truck.
    pub fn validate(&self) -> Result<()> {
        let edges = [
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
        ];
        for (name, value) in edges {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidInput(format!(
                    "truck has non-positive {} ({})",
                    name, value
                )));
            }
        }

        if !(self.max_weight.is_finite() && self.max_weight > 0.0) {
            return Err(Error::InvalidInput(format!(
                "truck max weight must be positive ({})",
                self.max_weight
            )));
        }

        if let Some(volume) = self.max_volume {
            if !(volume.is_finite() && volume > 0.0) {
                return Err(Error::InvalidInput(format!(
                    "truck max volume must be positive ({})",
                    volume
                )));
            }
        }

        Ok(())
    }
}
