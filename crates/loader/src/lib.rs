//! # truckpack-loader
//!
//! Placement strategies for loading cartons into a truck, plus the registry,
//! comparator and request handling that expose them by name.
//!
//! ## Strategies
//!
//! | Name | Kind |
//! |------|------|
//! | `skyline` | height-map bottom-left heuristic |
//! | `extreme-points` | extreme-point first fit |
//! | `simulated-annealing` | local search |
//! | `tabu-search` | local search |
//! | `genetic` | population |
//! | `hybrid` | genetic + annealing polish |
//! | `particle-swarm` | population (random keys) |
//! | `ant-colony` | population (MAX-MIN ant system) |
//! | `branch-and-bound` | exact, node-limited |
//!
//! Every strategy except `branch-and-bound` decodes an order plus preferred
//! orientations through the same placement pass, so search strategies start
//! from, and never end below, the heuristic they are seeded with.
//!
//! ## Example
//!
//! ```rust
//! use truckpack_core::{Carton, PackOptions, Problem, Truck};
//! use truckpack_loader::Registry;
//!
//! let problem = Problem::new(
//!     vec![Carton::new("A", 50.0, 30.0, 40.0).with_weight(15.0).with_quantity(10)],
//!     Truck::new(600.0, 240.0, 240.0, 20_000.0),
//! )
//! .unwrap();
//!
//! let registry = Registry::standard();
//! let result = registry.run("skyline", &problem, &PackOptions::default()).unwrap();
//! assert!(result.all_placed());
//! ```

pub mod aco_packing;
pub mod branch_bound;
pub mod compare;
pub mod extreme_point;
pub mod ga_packing;
pub mod hybrid_packing;
pub mod load_state;
pub mod placement_pass;
pub mod pso_packing;
pub mod registry;
pub mod request;
pub mod sa_packing;
pub mod skyline;
pub mod tabu_packing;

// Re-exports
pub use aco_packing::AcoPacker;
pub use branch_bound::BranchBoundPacker;
pub use compare::{compare, Comparison, ComparisonEntry, Outcome};
pub use extreme_point::ExtremePointPacker;
pub use ga_packing::GaPacker;
pub use hybrid_packing::HybridPacker;
pub use load_state::LoadState;
pub use placement_pass::{AnchorPolicy, Decoder};
pub use pso_packing::PsoPacker;
pub use registry::{AutoSelectPolicy, Registry, RegistryBuilder, StrategyInfo, AUTO};
pub use request::{handle, PackRequest, PackResponse, RequestOptions, COMPARE};
pub use sa_packing::SaPacker;
pub use skyline::SkylinePacker;
pub use tabu_packing::TabuPacker;
