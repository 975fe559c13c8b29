//! Packing result, metrics and invariant verification.

use crate::error::{Error, Result};
use crate::geometry::{self, EPSILON};
use crate::orientation;
use crate::placement::{Placement, Unplaced};
use crate::problem::Problem;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Why a strategy stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum StopReason {
    /// Search ran to completion.
    #[default]
    Completed,
    /// Wall-clock budget exhausted; best-so-far returned.
    TimeBudget,
    /// Iteration cap reached.
    IterationCap,
    /// Node-expansion limit reached (exact search).
    NodeLimit,
}

impl StopReason {
    /// Returns true if the strategy terminated before finishing its search.
    pub fn is_early(&self) -> bool {
        matches!(self, Self::TimeBudget | Self::IterationCap | Self::NodeLimit)
    }
}

/// Weights of the efficiency score.
///
/// The score is `volume * vu + weight * wu + stability * s + placed * p`
/// where `vu`, `wu` are volume and weight utilisation, `s` the mean supported
/// fraction of each placed carton's base and `p` the placed ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScoreWeights {
    /// Weight of volume utilisation.
    pub volume: f64,
    /// Weight of weight utilisation.
    pub weight: f64,
    /// Weight of the stability sub-score.
    pub stability: f64,
    /// Weight of the placed ratio.
    pub placed: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            volume: 0.6,
            weight: 0.1,
            stability: 0.1,
            placed: 0.2,
        }
    }
}

impl ScoreWeights {
    /// Creates weights, clamping negatives to zero.
    pub fn new(volume: f64, weight: f64, stability: f64, placed: f64) -> Self {
        Self {
            volume: volume.max(0.0),
            weight: weight.max(0.0),
            stability: stability.max(0.0),
            placed: placed.max(0.0),
        }
    }

    /// Validates that all weights are finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        let all = [self.volume, self.weight, self.stability, self.placed];
        if all.iter().any(|w| !(w.is_finite() && *w >= 0.0)) {
            return Err(Error::InvalidInput(
                "score weights must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Combines sub-scores into one efficiency value.
    pub fn score(&self, volume_util: f64, weight_util: f64, stability: f64, placed: f64) -> f64 {
        self.volume * volume_util
            + self.weight * weight_util
            + self.stability * stability
            + self.placed * placed
    }
}

/// Derived metrics of a packing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Metrics {
    /// Placed volume / usable truck volume.
    pub volume_utilization: f64,
    /// Placed weight / max payload.
    pub weight_utilization: f64,
    /// Number of instances left out.
    pub unplaced_count: usize,
    /// Mean supported base fraction of placed cartons (floor = 1).
    pub stability: f64,
    /// Composite efficiency score.
    pub efficiency: f64,
}

impl Metrics {
    /// Computes metrics for a set of placements.
    pub fn compute(problem: &Problem, placements: &[Placement], weights: &ScoreWeights) -> Self {
        let truck = problem.truck();
        let placed_volume: f64 = placements.iter().map(|p| p.volume()).sum();
        let placed_weight: f64 = placements
            .iter()
            .map(|p| problem.instance_weight(p.instance))
            .sum();

        let volume_utilization = placed_volume / truck.usable_volume();
        let weight_utilization = placed_weight / truck.max_weight();
        let stability = stability(placements);
        let total = problem.instance_count();
        let placed_ratio = if total == 0 {
            1.0
        } else {
            placements.len() as f64 / total as f64
        };

        Self {
            volume_utilization,
            weight_utilization,
            unplaced_count: total.saturating_sub(placements.len()),
            stability,
            efficiency: weights.score(volume_utilization, weight_utilization, stability, placed_ratio),
        }
    }
}

/// Returns the mean fraction of each carton's base resting on the floor or
/// on top faces of other cartons. Zero for an empty packing.
pub fn stability(placements: &[Placement]) -> f64 {
    if placements.is_empty() {
        return 0.0;
    }

    let total: f64 = placements
        .iter()
        .map(|p| {
            let b = p.bounds();
            if b.min.z <= EPSILON {
                return 1.0;
            }
            let supported: f64 = placements
                .iter()
                .map(|q| q.bounds())
                .filter(|q| (q.max.z - b.min.z).abs() <= EPSILON)
                .map(|q| geometry::footprint_overlap_area(&b, &q))
                .sum();
            (supported / b.base_area()).min(1.0)
        })
        .sum();

    total / placements.len() as f64
}

/// The outcome of one strategy run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PackingResult {
    /// Name of the strategy that produced the result.
    pub strategy: String,

    /// Placements in placement order.
    pub placements: Vec<Placement>,

    /// Instances that could not be placed.
    pub unplaced: Vec<Unplaced>,

    /// Derived metrics.
    pub metrics: Metrics,

    /// Why the strategy stopped.
    pub stop_reason: StopReason,

    /// Iterations, generations or nodes processed.
    pub iterations: u64,

    /// Wall-clock time in milliseconds.
    pub elapsed_ms: u64,

    /// Best efficiency per generation or temperature level.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub history: Vec<f64>,
}

impl PackingResult {
    /// Builds a result from placements; every instance not placed is listed
    /// as unplaced in instance order.
    pub fn from_placements(
        problem: &Problem,
        strategy: impl Into<String>,
        placements: Vec<Placement>,
        weights: &ScoreWeights,
    ) -> Self {
        let mut placed = vec![false; problem.instance_count()];
        for p in &placements {
            if let Some(flag) = placed.get_mut(p.instance) {
                *flag = true;
            }
        }

        let unplaced = problem
            .instances()
            .iter()
            .filter(|inst| !placed[inst.index])
            .map(|inst| Unplaced {
                instance: inst.index,
                carton_id: problem.carton_of(inst.index).id().to_string(),
                ordinal: inst.ordinal,
            })
            .collect();

        let metrics = Metrics::compute(problem, &placements, weights);

        Self {
            strategy: strategy.into(),
            placements,
            unplaced,
            metrics,
            stop_reason: StopReason::Completed,
            iterations: 0,
            elapsed_ms: 0,
            history: Vec::new(),
        }
    }

    /// Sets the stop reason.
    pub fn with_stop_reason(mut self, reason: StopReason) -> Self {
        self.stop_reason = reason;
        self
    }

    /// Sets the iteration count.
    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the elapsed time.
    pub fn with_elapsed_ms(mut self, ms: u64) -> Self {
        self.elapsed_ms = ms;
        self
    }

    /// Sets the score history.
    pub fn with_history(mut self, history: Vec<f64>) -> Self {
        self.history = history;
        self
    }

    /// Returns the efficiency score.
    pub fn efficiency(&self) -> f64 {
        self.metrics.efficiency
    }

    /// Returns true if every instance was placed.
    pub fn all_placed(&self) -> bool {
        self.unplaced.is_empty()
    }

    /// Returns the number of placed instances.
    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }

    /// Returns volume utilisation as a percentage string.
    pub fn utilization_percent(&self) -> String {
        format!("{:.1}%", self.metrics.volume_utilization * 100.0)
    }

    /// Checks every packing invariant against the problem.
    ///
    /// Returns [`Error::Internal`] describing the first violation found.
    pub fn verify(&self, problem: &Problem) -> Result<()> {
        let truck = problem.truck();
        let bounds = truck.bounds();
        let n = problem.instance_count();

        // Conservation: each instance exactly once across placed and unplaced.
        let mut seen = vec![false; n];
        let listed = self
            .placements
            .iter()
            .map(|p| p.instance)
            .chain(self.unplaced.iter().map(|u| u.instance));
        for instance in listed {
            match seen.get_mut(instance) {
                None => {
                    return Err(Error::Internal(format!(
                        "instance {} does not exist",
                        instance
                    )))
                }
                Some(true) => {
                    return Err(Error::Internal(format!(
                        "instance {} listed more than once",
                        instance
                    )))
                }
                Some(flag) => *flag = true,
            }
        }
        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(Error::Internal(format!(
                "instance {} is neither placed nor unplaced",
                missing
            )));
        }

        let boxes: Vec<_> = self.placements.iter().map(|p| p.bounds()).collect();
        for (i, p) in self.placements.iter().enumerate() {
            let carton = problem.carton_of(p.instance);

            if !carton.permitted_orientations().contains(p.orientation) {
                return Err(Error::Internal(format!(
                    "carton '{}' placed with forbidden orientation {}",
                    carton.id(),
                    p.orientation
                )));
            }
            let expected = orientation::apply(&carton.dimensions(), p.orientation);
            if !geometry::same_point(&expected, &p.extents) {
                return Err(Error::Internal(format!(
                    "carton '{}' extents do not match orientation {}",
                    carton.id(),
                    p.orientation
                )));
            }

            if !geometry::contains(&bounds, &boxes[i]) {
                return Err(Error::Internal(format!(
                    "carton '{}' #{} extends outside the truck",
                    carton.id(),
                    p.ordinal
                )));
            }

            for j in (i + 1)..boxes.len() {
                if geometry::overlaps(&boxes[i], &boxes[j]) {
                    return Err(Error::Internal(format!(
                        "instances {} and {} overlap",
                        p.instance, self.placements[j].instance
                    )));
                }
            }

            if !carton.is_stackable() {
                let burdened = boxes.iter().any(|b| {
                    (b.min.z - boxes[i].max.z).abs() <= EPSILON
                        && geometry::footprint_overlap_area(b, &boxes[i]) > 0.0
                });
                if burdened {
                    return Err(Error::Internal(format!(
                        "carton '{}' is not stackable but supports another carton",
                        carton.id()
                    )));
                }
            }
        }

        let weight: f64 = self
            .placements
            .iter()
            .map(|p| problem.instance_weight(p.instance))
            .sum();
        if weight > truck.max_weight() + EPSILON {
            return Err(Error::Internal(format!(
                "placed weight {:.3} exceeds max weight {:.3}",
                weight,
                truck.max_weight()
            )));
        }

        let volume: f64 = self.placements.iter().map(|p| p.volume()).sum();
        if volume > truck.usable_volume() * (1.0 + EPSILON) {
            return Err(Error::Internal(format!(
                "placed volume {:.3} exceeds usable volume {:.3}",
                volume,
                truck.usable_volume()
            )));
        }

        Ok(())
    }
}
