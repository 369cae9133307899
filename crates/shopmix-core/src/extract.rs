use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::adapter::{RawSolution, SolveStatus};
use crate::model::Model;
use crate::params::{ProductId, ResourceId, ResourceLimits};

/// Distance from 100% utilization, in percentage points, under which a
/// resource counts as binding. Absorbs solver float noise only.
pub const BINDING_EPSILON: f64 = 0.01;

/// Relative gap between the solver objective and recomputed profit worth a warning
const PROFIT_DRIFT: f64 = 1e-6;

/// A broken contract between builder, solver and extractor. Not a user error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InternalInvariantError {
    #[error("Solver returned no value for {0}")]
    MissingValue(ProductId),
    #[error("Solver returned a value for unknown variable {0}")]
    UnexpectedValue(ProductId),
    #[error("Resource {resource} has a zero limit but {usage} was used")]
    ZeroLimitUsed { resource: ResourceId, usage: f64 },
    #[error("Model constrains resource {0}, which has no limit")]
    UnknownLimit(ResourceId),
}

/// No optimal solution exists for the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SolveFailure {
    pub status: SolveStatus,
}

impl fmt::Display for SolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.status {
            SolveStatus::Infeasible => "problem is infeasible",
            SolveStatus::Unbounded => "problem is unbounded",
            SolveStatus::Error => "solver error (numerical failure or limit reached)",
            SolveStatus::Optimal => "solver reported optimal",
        };
        write!(f, "No optimal solution found: {}", reason)
    }
}

/// Business view of an optimal production plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionResult {
    pub production: BTreeMap<ProductId, i64>,
    pub profit: f64,
    pub usage: BTreeMap<ResourceId, f64>,
    /// Only resources with a positive limit, plus zero-limit resources left unused (0%)
    pub utilization_pct: BTreeMap<ResourceId, f64>,
    /// Unused capacity per resource
    pub slack: BTreeMap<ResourceId, f64>,
    pub binding_constraints: BTreeSet<ResourceId>,
    /// Duals keyed by model constraint name
    pub shadow_prices: BTreeMap<String, f64>,
    /// Profit change per unit forced into a product the plan leaves out of the basis
    pub reduced_costs: BTreeMap<ProductId, f64>,
}

impl ProductionResult {
    pub fn quantity(&self, product: &ProductId) -> i64 {
        self.production.get(product).copied().unwrap_or(0)
    }

    pub fn is_binding(&self, resource: &ResourceId) -> bool {
        self.binding_constraints.contains(resource)
    }
}

/// Terminal state of a planning run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Extracted(ProductionResult),
    Rejected(SolveFailure),
}

impl Outcome {
    pub fn result(&self) -> Option<&ProductionResult> {
        match self {
            Outcome::Extracted(result) => Some(result),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&SolveFailure> {
        match self {
            Outcome::Extracted(_) => None,
            Outcome::Rejected(failure) => Some(failure),
        }
    }
}

/// Derives usage, utilization, binding resources and shadow prices from a raw solution
#[derive(Debug, Clone)]
pub struct ResultExtractor {
    epsilon: f64,
}

impl Default for ResultExtractor {
    fn default() -> Self {
        Self { epsilon: BINDING_EPSILON }
    }
}

impl ResultExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn extract(
        &self,
        model: &Model,
        limits: &ResourceLimits,
        raw: &RawSolution,
    ) -> Result<Outcome, InternalInvariantError> {
        if raw.status != SolveStatus::Optimal {
            tracing::info!(status = %raw.status, "no optimal solution");
            return Ok(Outcome::Rejected(SolveFailure { status: raw.status }));
        }

        for variable in &model.variables {
            if !raw.variable_values.contains_key(&variable.product) {
                return Err(InternalInvariantError::MissingValue(variable.product.clone()));
            }
        }
        if let Some(stray) = raw
            .variable_values
            .keys()
            .find(|p| model.variable_index(p).is_none())
        {
            return Err(InternalInvariantError::UnexpectedValue(stray.clone()));
        }

        let production = raw.variable_values.clone();

        let mut usage = BTreeMap::new();
        let mut utilization_pct = BTreeMap::new();
        let mut slack = BTreeMap::new();
        let mut binding_constraints = BTreeSet::new();

        for (resource, constraint) in model.capacity_constraints() {
            let limit = limits
                .get(resource)
                .ok_or_else(|| InternalInvariantError::UnknownLimit(resource.clone()))?;
            let used = constraint.lhs(&production);

            let pct = if limit > 0.0 {
                used / limit * 100.0
            } else if used == 0.0 {
                0.0
            } else {
                return Err(InternalInvariantError::ZeroLimitUsed {
                    resource: resource.clone(),
                    usage: used,
                });
            };

            // A zero-limit resource sits at 0%, never binding under this rule
            if (pct - 100.0).abs() < self.epsilon {
                binding_constraints.insert(resource.clone());
            }
            usage.insert(resource.clone(), used);
            utilization_pct.insert(resource.clone(), pct);
            slack.insert(resource.clone(), limit - used);
        }

        let profit = model.profit(&production);
        let drift = (profit - raw.objective_value).abs();
        if drift > PROFIT_DRIFT * profit.abs().max(1.0) {
            tracing::warn!(profit, objective = raw.objective_value, "solver objective disagrees with recomputed profit");
        }

        let shadow_prices = raw
            .constraint_duals
            .iter()
            .filter_map(|(name, dual)| dual.map(|d| (name.clone(), d)))
            .collect();

        tracing::info!(profit, binding = binding_constraints.len(), "extracted production plan");

        Ok(Outcome::Extracted(ProductionResult {
            production,
            profit,
            usage,
            utilization_pct,
            slack,
            binding_constraints,
            shadow_prices,
            reduced_costs: raw.reduced_costs.clone(),
        }))
    }
}
