use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::params::{ProductId, ResourceId};

/// Optimization direction. Production planning only ever maximizes profit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sense {
    Maximize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Domain {
    /// Whole units, no upper bound beyond what the constraints imply
    NonNegativeInteger,
}

/// One decision variable: the number of units of `product` to make
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub product: ProductId,
    pub domain: Domain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Relation {
    Le,
    Ge,
    Eq,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Eq => "=",
        })
    }
}

/// What a constraint row stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConstraintKind {
    /// Consumption of a resource may not exceed its limit
    Capacity(ResourceId),
    /// A product must be made at least a given number of times
    Minimum(ProductId),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constraint {
    /// Unique, human-readable name; keys dual values in the solution
    pub name: String,
    pub kind: ConstraintKind,
    pub coefficients: BTreeMap<ProductId, f64>,
    pub relation: Relation,
    pub bound: f64,
}

impl Constraint {
    pub fn capacity_name(resource: &ResourceId) -> String {
        format!("{}_capacity", resource)
    }

    pub fn minimum_name(product: &ProductId) -> String {
        format!("{}_minimum", product)
    }

    pub fn coefficient(&self, product: &ProductId) -> f64 {
        self.coefficients.get(product).copied().unwrap_or(0.0)
    }

    /// Left-hand side evaluated at `quantities`
    pub fn lhs(&self, quantities: &BTreeMap<ProductId, i64>) -> f64 {
        self.coefficients
            .iter()
            .map(|(p, c)| c * quantities.get(p).copied().unwrap_or(0) as f64)
            .sum()
    }

    /// Whether `quantities` satisfy this constraint within `tolerance`
    pub fn is_satisfied(&self, quantities: &BTreeMap<ProductId, i64>, tolerance: f64) -> bool {
        let lhs = self.lhs(quantities);
        match self.relation {
            Relation::Le => lhs <= self.bound + tolerance,
            Relation::Ge => lhs >= self.bound - tolerance,
            Relation::Eq => (lhs - self.bound).abs() <= tolerance,
        }
    }
}

/// A production-mix MILP, built once per run by [`crate::ModelBuilder`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    pub sense: Sense,
    pub variables: Vec<Variable>,
    pub objective: BTreeMap<ProductId, f64>,
    pub constraints: Vec<Constraint>,
}

impl Model {
    pub fn variable_index(&self, product: &ProductId) -> Option<usize> {
        self.variables.iter().position(|v| &v.product == product)
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Capacity constraints paired with their resource, in model order
    pub fn capacity_constraints(&self) -> impl Iterator<Item = (&ResourceId, &Constraint)> {
        self.constraints.iter().filter_map(|c| match &c.kind {
            ConstraintKind::Capacity(r) => Some((r, c)),
            ConstraintKind::Minimum(_) => None,
        })
    }

    /// Objective evaluated at `quantities`
    pub fn profit(&self, quantities: &BTreeMap<ProductId, i64>) -> f64 {
        self.objective
            .iter()
            .map(|(p, c)| c * quantities.get(p).copied().unwrap_or(0) as f64)
            .sum()
    }
}
