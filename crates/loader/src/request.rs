//! JSON-shaped request handling: one entry point for single runs, `auto`
//! and comparisons.

use crate::compare::{compare, Comparison};
use crate::registry::{Registry, AUTO};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use truckpack_core::{
    Carton, Error, PackOptions, PackingResult, Problem, Result, ScoreWeights, StrategyParams,
    Truck,
};

/// Algorithm name that runs a comparison instead of a single strategy.
pub const COMPARE: &str = "compare";

fn default_algorithm() -> String {
    AUTO.to_string()
}

/// A packing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackRequest {
    /// Carton definitions.
    pub cartons: Vec<Carton>,
    /// The truck to load.
    pub truck: Truck,
    /// Strategy name, `"auto"` or `"compare"` (default `"auto"`).
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Strategies to compare; all registered ones when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategies: Option<Vec<String>>,
    /// Run options.
    #[serde(default)]
    pub options: RequestOptions,
}

impl PackRequest {
    /// Parses a request from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidInput(format!("malformed request: {}", e)))
    }
}

/// Run options as they appear in a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestOptions {
    /// RNG seed.
    pub seed: Option<u64>,
    /// Wall-clock budget per strategy run, in milliseconds.
    pub time_budget_ms: Option<u64>,
    /// Strategy tunables.
    pub strategy_params: Option<StrategyParams>,
    /// Efficiency score weights.
    pub score_weights: Option<ScoreWeights>,
}

impl RequestOptions {
    /// Converts to strategy run options.
    pub fn to_pack_options(&self) -> PackOptions {
        PackOptions {
            seed: self.seed,
            time_budget: self.time_budget_ms.map(Duration::from_millis),
            params: self.strategy_params.clone().unwrap_or_default(),
            weights: self.score_weights.unwrap_or_default(),
        }
    }
}

/// Response to a [`PackRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum PackResponse {
    /// One strategy ran.
    Single {
        /// The strategy that ran (resolved if `auto` was requested).
        algorithm: String,
        /// Its result.
        result: PackingResult,
    },
    /// Several strategies ran and were ranked.
    Comparison(Comparison),
}

/// Validates a request and runs it.
///
/// Input errors and unknown names are reported before any strategy runs.
pub fn handle(registry: &Registry, request: PackRequest) -> Result<PackResponse> {
    let options = request.options.to_pack_options();
    options.validate()?;
    let problem = Problem::new(request.cartons, request.truck)?;

    if request.algorithm == COMPARE {
        let comparison = compare(registry, &problem, request.strategies.as_deref(), &options)?;
        return Ok(PackResponse::Comparison(comparison));
    }

    let algorithm = registry.resolve(&request.algorithm, &problem, &options)?;
    let result = registry.run(algorithm, &problem, &options)?;
    Ok(PackResponse::Single {
        algorithm: algorithm.to_string(),
        result,
    })
}
