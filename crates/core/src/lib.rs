//! # truckpack-core
//!
//! Data model, geometry kernel and search frameworks shared by every
//! truckpack strategy.
//!
//! ## Core Components
//!
//! - **Model**: [`Carton`], [`Truck`], [`Problem`] (validated, expanded instances)
//! - **Geometry kernel**: [`Aabb`], overlap/containment tests, anchor generation
//! - **Orientation resolver**: six axis permutations filtered by policy
//! - **Results**: [`PackingResult`], [`Metrics`], invariant verification
//! - **Strategy contract**: [`PackingStrategy`], [`PackOptions`], [`TimeBudget`]
//! - **Search frameworks**: genetic algorithm, simulated annealing, tabu search
//!
//! ## Units
//!
//! Lengths are centimetres, weights kilograms. A truck's optional usable
//! volume is given in cubic metres.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod carton;
pub mod error;
pub mod ga;
pub mod geometry;
pub mod orientation;
pub mod placement;
pub mod problem;
pub mod random_keys;
pub mod result;
pub mod sa;
pub mod sequence;
pub mod solver;
pub mod tabu;
pub mod truck;

// Re-exports
pub use carton::Carton;
pub use error::{Error, Result};
pub use ga::{GaConfig, GaProblem, GaResult, GaRunner, Individual};
pub use geometry::Aabb;
pub use orientation::{OrientationSet, OrientedExtents};
pub use placement::{Placement, Unplaced};
pub use problem::{CartonInstance, Problem};
pub use random_keys::RandomKeys;
pub use result::{Metrics, PackingResult, ScoreWeights, StopReason};
pub use sa::{NeighborhoodOperator, SaConfig, SaProblem, SaResult};
pub use sequence::{PackingSequence, ORIENTATION_GENES};
pub use solver::{DecoderKind, PackOptions, PackingStrategy, StrategyParams, TimeBudget};
pub use tabu::{TabuConfig, TabuProblem, TabuResult, TabuRunner};
pub use truck::Truck;
