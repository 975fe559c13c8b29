//! Strategy registry and automatic strategy selection.

use crate::aco_packing::AcoPacker;
use crate::branch_bound::BranchBoundPacker;
use crate::extreme_point::ExtremePointPacker;
use crate::ga_packing::GaPacker;
use crate::hybrid_packing::HybridPacker;
use crate::pso_packing::PsoPacker;
use crate::sa_packing::SaPacker;
use crate::skyline::SkylinePacker;
use crate::tabu_packing::TabuPacker;
use serde::Serialize;
use std::time::Duration;
use truckpack_core::{Error, PackOptions, PackingResult, PackingStrategy, Problem, Result};

/// Name that asks the registry to pick a strategy.
pub const AUTO: &str = "auto";

/// Descriptive metadata for a registered strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyInfo {
    /// Unique lookup key, e.g. `"skyline"`.
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
    /// One-sentence description.
    pub description: String,
    /// Time complexity in the number of instances.
    pub complexity_class: String,
    /// Problems the strategy suits.
    pub best_for: String,
}

impl StrategyInfo {
    /// Creates strategy metadata.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        complexity_class: impl Into<String>,
        best_for: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: description.into(),
            complexity_class: complexity_class.into(),
            best_for: best_for.into(),
        }
    }
}

/// Rules for resolving [`AUTO`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSelectPolicy {
    /// Largest instance count, inclusive, solved exactly.
    pub exact_max_instances: usize,
    /// Budgets at or below this get the fastest heuristic.
    pub strict_budget: Duration,
}

impl Default for AutoSelectPolicy {
    fn default() -> Self {
        Self {
            exact_max_instances: 8,
            strict_budget: Duration::from_millis(250),
        }
    }
}

impl AutoSelectPolicy {
    /// Picks a strategy name for the problem and options.
    pub fn select(&self, problem: &Problem, options: &PackOptions) -> &'static str {
        if options
            .time_budget
            .is_some_and(|budget| budget <= self.strict_budget)
        {
            "skyline"
        } else if problem.instance_count() <= self.exact_max_instances {
            "branch-and-bound"
        } else {
            "hybrid"
        }
    }
}

/// Immutable table of named strategies.
pub struct Registry {
    infos: Vec<StrategyInfo>,
    strategies: Vec<Box<dyn PackingStrategy>>,
    policy: AutoSelectPolicy,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("strategies", &self.infos.iter().map(|i| &i.name).collect::<Vec<_>>())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Registry {
    /// Starts an empty registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Returns the registry with every built-in strategy.
    pub fn standard() -> Self {
        Self::builder()
            .register(
                StrategyInfo::new(
                    "skyline",
                    "Skyline Bottom-Left",
                    "Places cartons on the lowest point of a height map, bottom-left first.",
                    "O(n^2)",
                    "Fast answers under tight time budgets",
                ),
                SkylinePacker::new(),
            )
            .register(
                StrategyInfo::new(
                    "extreme-points",
                    "Extreme Points",
                    "First fit over corner points projected from every placed carton.",
                    "O(n^2)",
                    "Mixed carton sizes where a quick dense load is enough",
                ),
                ExtremePointPacker::new(),
            )
            .register(
                StrategyInfo::new(
                    "simulated-annealing",
                    "Simulated Annealing",
                    "Perturbs the heuristic order and orientations, accepting worse loads early on.",
                    "O(k * n^2)",
                    "Medium loads with time to refine",
                ),
                SaPacker::new(),
            )
            .register(
                StrategyInfo::new(
                    "tabu-search",
                    "Tabu Search",
                    "Best-improvement local search that forbids recently used moves.",
                    "O(k * m * n^2)",
                    "Escaping plateaus the heuristics get stuck on",
                ),
                TabuPacker::new(),
            )
            .register(
                StrategyInfo::new(
                    "genetic",
                    "Genetic Algorithm",
                    "Evolves placement orders and orientations with crossover and mutation.",
                    "O(g * p * n^2)",
                    "Large mixed loads",
                ),
                GaPacker::new(),
            )
            .register(
                StrategyInfo::new(
                    "hybrid",
                    "Genetic + Annealing",
                    "Genetic search followed by an annealing polish of the best load.",
                    "O(g * p * n^2 + k * n^2)",
                    "Best quality on large loads when time allows",
                ),
                HybridPacker::new(),
            )
            .register(
                StrategyInfo::new(
                    "particle-swarm",
                    "Particle Swarm",
                    "Moves random-key particles towards personal and swarm bests.",
                    "O(g * s * n^2)",
                    "Exploring orientation-sensitive loads",
                ),
                PsoPacker::new(),
            )
            .register(
                StrategyInfo::new(
                    "ant-colony",
                    "Ant Colony",
                    "MAX-MIN ant system building orders from pheromone trails.",
                    "O(g * a * n^2)",
                    "Loads where good loading sequences share structure",
                ),
                AcoPacker::new(),
            )
            .register(
                StrategyInfo::new(
                    "branch-and-bound",
                    "Branch and Bound",
                    "Exhaustive search with volume bounds for the best possible load.",
                    "O(exponential)",
                    "Small loads of up to about eight cartons",
                ),
                BranchBoundPacker::new(),
            )
            .build()
    }

    /// Returns metadata for every strategy in registration order.
    pub fn list(&self) -> &[StrategyInfo] {
        &self.infos
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Looks up a strategy by name.
    pub fn get(&self, name: &str) -> Result<&dyn PackingStrategy> {
        self.position(name)
            .map(|i| self.strategies[i].as_ref())
            .ok_or_else(|| Error::UnknownAlgorithm(name.to_string()))
    }

    /// Returns the auto-selection policy.
    pub fn policy(&self) -> &AutoSelectPolicy {
        &self.policy
    }

    /// Resolves a requested name, turning [`AUTO`] into a concrete strategy.
    pub fn resolve<'n>(&self, name: &'n str, problem: &Problem, options: &PackOptions) -> Result<&'n str> {
        let resolved = if name == AUTO {
            let picked = self.policy.select(problem, options);
            log::info!("auto-selected '{}' for {} instances", picked, problem.instance_count());
            picked
        } else {
            name
        };
        self.get(resolved)?;
        Ok(resolved)
    }

    /// Runs one strategy and verifies its result.
    ///
    /// Fails with [`Error::Internal`] if the strategy broke a packing rule.
    pub fn run(&self, name: &str, problem: &Problem, options: &PackOptions) -> Result<PackingResult> {
        options.validate()?;
        let strategy = self.get(name)?;
        let result = strategy.pack(problem, options)?;
        result.verify(problem)?;
        Ok(result)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.infos.iter().position(|info| info.name == name)
    }
}

/// Builds a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    infos: Vec<StrategyInfo>,
    strategies: Vec<Box<dyn PackingStrategy>>,
    policy: AutoSelectPolicy,
}

impl RegistryBuilder {
    /// Adds a strategy; a later registration under the same name replaces
    /// the earlier one in place.
    pub fn register<S: PackingStrategy + 'static>(mut self, info: StrategyInfo, strategy: S) -> Self {
        match self.infos.iter().position(|i| i.name == info.name) {
            Some(i) => {
                log::warn!("strategy '{}' registered twice; keeping the last", info.name);
                self.infos[i] = info;
                self.strategies[i] = Box::new(strategy);
            }
            None => {
                self.infos.push(info);
                self.strategies.push(Box::new(strategy));
            }
        }
        self
    }

    /// Sets the auto-selection policy.
    pub fn with_auto_policy(mut self, policy: AutoSelectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Freezes the registry.
    pub fn build(self) -> Registry {
        Registry {
            infos: self.infos,
            strategies: self.strategies,
            policy: self.policy,
        }
    }
}
