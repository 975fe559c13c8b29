//! Carton definitions.

use crate::error::{Error, Result};
use crate::orientation::OrientationSet;
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A box-shaped item type to be loaded, with a quantity of identical units.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Carton {
    /// Unique identifier. Left empty, it becomes `carton-{index}` in the problem.
    #[cfg_attr(feature = "serde", serde(default))]
    id: String,

    /// Edge along the carton's own length axis.
    length: f64,

    /// Edge along the carton's own width axis.
    width: f64,

    /// Edge along the carton's own height axis.
    height: f64,

    /// Weight of one unit in kilograms.
    #[cfg_attr(feature = "serde", serde(default))]
    weight: f64,

    /// Number of units to load.
    #[cfg_attr(feature = "serde", serde(default = "default_quantity"))]
    quantity: usize,

    /// Explicitly permitted orientations. `None` derives the set from `keep_upright`.
    #[cfg_attr(feature = "serde", serde(default))]
    allowed_orientations: Option<OrientationSet>,

    /// Restricts the default orientation set to upright rotations.
    #[cfg_attr(feature = "serde", serde(default))]
    keep_upright: bool,

    /// Placement priority, higher loads first among otherwise equal units.
    #[cfg_attr(feature = "serde", serde(default))]
    priority: i32,

    /// Whether other cartons may rest on top of this one.
    #[cfg_attr(feature = "serde", serde(default = "default_stackable"))]
    stackable: bool,
}

#[cfg(feature = "serde")]
fn default_quantity() -> usize {
    1
}

#[cfg(feature = "serde")]
fn default_stackable() -> bool {
    true
}

impl Carton {
    /// Creates a carton with the given ID and (length, width, height).
    pub fn new(id: impl Into<String>, length: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            length,
            width,
            height,
            weight: 0.0,
            quantity: 1,
            allowed_orientations: None,
            keep_upright: false,
            priority: 0,
            stackable: true,
        }
    }

    /// Sets the quantity to load.
    pub fn with_quantity(mut self, n: usize) -> Self {
        self.quantity = n;
        self
    }

    /// Sets the unit weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Sets an explicit orientation set.
    pub fn with_allowed_orientations(mut self, set: OrientationSet) -> Self {
        self.allowed_orientations = Some(set);
        self
    }

    /// Marks the carton as this-side-up.
    pub fn with_keep_upright(mut self, keep_upright: bool) -> Self {
        self.keep_upright = keep_upright;
        self
    }

    /// Sets the placement priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets whether other cartons may be stacked on top.
    pub fn with_stackable(mut self, stackable: bool) -> Self {
        self.stackable = stackable;
        self
    }

    /// Returns the identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Gives an ID-less carton the positional ID `carton-{index}`.
    pub(crate) fn assign_default_id(&mut self, index: usize) {
        if self.id.is_empty() {
            self.id = format!("carton-{}", index);
        }
    }

    /// Returns (length, width, height).
    pub fn dimensions(&self) -> Vector3<f64> {
        Vector3::new(self.length, self.width, self.height)
    }

    /// Returns the unit weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns the quantity.
    pub fn quantity(&self) -> usize {
        self.quantity
    }

    /// Returns the placement priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Returns whether other cartons may rest on this one.
    pub fn is_stackable(&self) -> bool {
        self.stackable
    }

    /// Returns the volume of one unit.
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Returns the effective set of permitted orientations.
    pub fn permitted_orientations(&self) -> OrientationSet {
        match self.allowed_orientations {
            Some(set) => set,
            None if self.keep_upright => OrientationSet::UPRIGHT,
            None => OrientationSet::ALL,
        }
    }

    /// Validates the carton.
    pub fn validate(&self) -> Result<()> {
        let edges = [
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
        ];
        for (name, value) in edges {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidInput(format!(
                    "carton '{}' has non-positive {} ({})",
                    self.id, name, value
                )));
            }
        }

        if !(self.weight.is_finite() && self.weight >= 0.0) {
            return Err(Error::InvalidInput(format!(
                "carton '{}' has negative weight ({})",
                self.id, self.weight
            )));
        }

        if self.quantity == 0 {
            return Err(Error::InvalidInput(format!(
                "quantity for carton '{}' must be at least 1",
                self.id
            )));
        }

        Ok(())
    }
}
