//! # truckpack
//!
//! Truck loading optimization: places carton instances inside a truck's
//! cargo space with interchangeable strategies, from fast heuristics to
//! metaheuristics and exact search.
//!
//! ## Quick Start
//!
//! ```rust
//! use truckpack::core::{Carton, PackOptions, Problem, Truck};
//! use truckpack::loader::Registry;
//!
//! let problem = Problem::new(
//!     vec![
//!         Carton::new("pallet-box", 120.0, 80.0, 100.0).with_weight(200.0).with_quantity(4),
//!         Carton::new("crate", 60.0, 40.0, 40.0).with_weight(25.0).with_quantity(8),
//!     ],
//!     Truck::new(600.0, 240.0, 240.0, 20_000.0).with_max_volume(34.5),
//! )?;
//!
//! let registry = Registry::standard();
//! let name = registry.resolve("auto", &problem, &PackOptions::default())?;
//! let result = registry.run(name, &problem, &PackOptions::default().with_seed(7))?;
//! println!("{} placed, {}", result.placed_count(), result.utilization_percent());
//! # Ok::<(), truckpack::Error>(())
//! ```

/// Data model, geometry kernel and search frameworks.
pub use truckpack_core as core;

/// Strategies, registry, comparator and request handling.
pub use truckpack_loader as loader;

// Re-export commonly used types at root level
pub use truckpack_core::{
    Carton, Error, PackOptions, PackingResult, PackingStrategy, Problem, Result, StopReason,
    Truck,
};
pub use truckpack_loader::{compare, handle, PackRequest, PackResponse, Registry};
