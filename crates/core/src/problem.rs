//! Packing problem: validated cartons expanded into individual instances.

use crate::carton::Carton;
use crate::error::{Error, Result};
use crate::orientation::{self, OrientedExtents};
use crate::truck::Truck;
use std::cmp::Ordering;
use std::collections::HashSet;

/// One physical unit derived from a carton's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartonInstance {
    /// Position in the problem's instance list.
    pub index: usize,
    /// Index of the source carton definition.
    pub carton_index: usize,
    /// Ordinal among the units of the same carton (0-based).
    pub ordinal: usize,
}

/// A validated, immutable packing problem shared by every strategy.
#[derive(Debug, Clone)]
pub struct Problem {
    cartons: Vec<Carton>,
    truck: Truck,
    instances: Vec<CartonInstance>,
    orientations: Vec<Vec<OrientedExtents>>,
}

impl Problem {
    /// Validates the input and expands carton quantities in input order.
    /// Cartons without an ID are named `carton-{index}` by input position.
    ///
    /// Fails with [`Error::InvalidInput`] on malformed dimensions, weights,
    /// quantities or duplicate carton IDs, and with
    /// [`Error::InvalidConstraint`] on an empty orientation set.
    pub fn new(mut cartons: Vec<Carton>, truck: Truck) -> Result<Self> {
        truck.validate()?;

        for (index, carton) in cartons.iter_mut().enumerate() {
            carton.assign_default_id(index);
        }

        let mut seen = HashSet::new();
        for carton in &cartons {
            carton.validate()?;
            if !seen.insert(carton.id()) {
                return Err(Error::InvalidInput(format!(
                    "duplicate carton id '{}'",
                    carton.id()
                )));
            }
        }

        let orientations = cartons
            .iter()
            .map(orientation::resolve)
            .collect::<Result<Vec<_>>>()?;

        let mut instances = Vec::new();
        for (carton_index, carton) in cartons.iter().enumerate() {
            for ordinal in 0..carton.quantity() {
                instances.push(CartonInstance {
                    index: instances.len(),
                    carton_index,
                    ordinal,
                });
            }
        }

        log::debug!(
            "expanded {} carton definitions into {} instances",
            cartons.len(),
            instances.len()
        );

        Ok(Self {
            cartons,
            truck,
            instances,
            orientations,
        })
    }

    /// Returns the carton definitions.
    pub fn cartons(&self) -> &[Carton] {
        &self.cartons
    }

    /// Returns the truck.
    pub fn truck(&self) -> &Truck {
        &self.truck
    }

    /// Returns all instances in expansion order.
    pub fn instances(&self) -> &[CartonInstance] {
        &self.instances
    }

    /// Returns the number of instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Returns the carton definition an instance was expanded from.
    pub fn carton_of(&self, instance: usize) -> &Carton {
        &self.cartons[self.instances[instance].carton_index]
    }

    /// Returns the distinct oriented extents permitted for an instance.
    pub fn orientations_of(&self, instance: usize) -> &[OrientedExtents] {
        &self.orientations[self.instances[instance].carton_index]
    }

    /// Returns the volume of one instance.
    pub fn instance_volume(&self, instance: usize) -> f64 {
        self.carton_of(instance).volume()
    }

    /// Returns the weight of one instance.
    pub fn instance_weight(&self, instance: usize) -> f64 {
        self.carton_of(instance).weight()
    }

    /// Returns the volume of all instances.
    pub fn total_volume(&self) -> f64 {
        (0..self.instances.len()).map(|i| self.instance_volume(i)).sum()
    }

    /// Returns the instance order used by the heuristics.
    ///
    /// Volume descending, then weight descending, then priority descending,
    /// then input order.
    pub fn heuristic_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.instances.len()).collect();
        order.sort_by(|&a, &b| {
            let (ca, cb) = (self.carton_of(a), self.carton_of(b));
            cb.volume()
                .partial_cmp(&ca.volume())
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    cb.weight()
                        .partial_cmp(&ca.weight())
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| cb.priority().cmp(&ca.priority()))
                .then_with(|| a.cmp(&b))
        });
        order
    }

    /// Returns one entry per distinct carton definition among `instances`,
    /// keeping the first instance of each in the given order.
    pub fn distinct_types(&self, instances: &[usize]) -> Vec<usize> {
        let mut seen = HashSet::new();
        instances
            .iter()
            .copied()
            .filter(|&i| seen.insert(self.instances[i].carton_index))
            .collect()
    }
}
