use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use shopmix_solver::{ConstraintOp, LpProblem, Solution, SolutionStatus, Solver};

use crate::model::{Model, Relation};
use crate::params::ProductId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// Solver-internal failure: numerical trouble or an exhausted limit
    Error,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::Error => "error",
        })
    }
}

impl From<SolutionStatus> for SolveStatus {
    fn from(status: SolutionStatus) -> Self {
        match status {
            SolutionStatus::Optimal => SolveStatus::Optimal,
            SolutionStatus::Infeasible => SolveStatus::Infeasible,
            SolutionStatus::Unbounded => SolveStatus::Unbounded,
            SolutionStatus::Error => SolveStatus::Error,
        }
    }
}

/// What a solver hands back for a [`Model`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawSolution {
    pub status: SolveStatus,
    /// One entry per model variable when `status` is optimal, empty otherwise
    pub variable_values: BTreeMap<ProductId, i64>,
    pub objective_value: f64,
    /// Dual value per constraint name; `None` where the backend defines none
    pub constraint_duals: BTreeMap<String, Option<f64>>,
    /// Objective change per unit forced into each product; zero for products in the basis
    pub reduced_costs: BTreeMap<ProductId, f64>,
    pub nodes_explored: usize,
}

impl RawSolution {
    /// A solution with no values, for any non-optimal status
    pub fn failed(status: SolveStatus) -> Self {
        Self {
            status,
            variable_values: BTreeMap::new(),
            objective_value: f64::NAN,
            constraint_duals: BTreeMap::new(),
            reduced_costs: BTreeMap::new(),
            nodes_explored: 0,
        }
    }
}

/// The solving capability the pipeline depends on.
///
/// Implementations must support integer domains and report a dual per
/// constraint on optimal solutions. Identical models must give identical
/// statuses; which of several optimal vertices is returned is up to the
/// backend.
pub trait SolverAdapter {
    fn solve(&self, model: &Model) -> RawSolution;
}

/// [`SolverAdapter`] backed by the branch-and-bound [`Solver`].
///
/// Duals follow the backend convention: the change in optimal profit per unit
/// increase of a constraint's bound, read from the LP relaxation at the node
/// that produced the integer optimum. A binding capacity row therefore has a
/// non-negative dual and a binding minimum row a non-positive one. For an
/// integer program these are an approximation of true marginal values.
#[derive(Debug, Clone, Default)]
pub struct MilpAdapter {
    solver: Solver,
}

impl MilpAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up after `limit`; expiry is reported as [`SolveStatus::Error`]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.solver = self.solver.with_time_limit(limit);
        self
    }

    pub fn with_max_nodes(mut self, max: usize) -> Self {
        self.solver = self.solver.with_max_nodes(max);
        self
    }

    /// Lower the model into the solver's dense representation
    pub fn to_lp_problem(model: &Model) -> LpProblem {
        let names = model.variables.iter().map(|v| v.product.to_string()).collect();
        let mut problem = LpProblem::new(names);

        let dense = |coefficients: &BTreeMap<ProductId, f64>| -> Vec<f64> {
            model
                .variables
                .iter()
                .map(|v| coefficients.get(&v.product).copied().unwrap_or(0.0))
                .collect()
        };

        problem.set_objective(dense(&model.objective), false);
        for constraint in &model.constraints {
            let op = match constraint.relation {
                Relation::Le => ConstraintOp::Le,
                Relation::Ge => ConstraintOp::Ge,
                Relation::Eq => ConstraintOp::Eq,
            };
            problem.add_constraint(constraint.name.clone(), dense(&constraint.coefficients), op, constraint.bound);
        }
        for index in 0..model.variables.len() {
            problem.set_integer(index);
        }
        problem
    }

    fn map_solution(&self, model: &Model, solution: Solution) -> RawSolution {
        let status = SolveStatus::from(solution.status);
        if status != SolveStatus::Optimal {
            return RawSolution {
                nodes_explored: solution.nodes_explored,
                ..RawSolution::failed(status)
            };
        }

        let mut variable_values = BTreeMap::new();
        for (variable, &value) in model.variables.iter().zip(&solution.values) {
            let rounded = value.round();
            // i64::MAX as f64 rounds up to 2^63, itself out of range
            if !value.is_finite() || (value - rounded).abs() > 1e-6 || rounded < 0.0 || rounded >= i64::MAX as f64 {
                tracing::error!(product = %variable.product, value, "solver returned a quantity that is not a representable whole number");
                return RawSolution {
                    nodes_explored: solution.nodes_explored,
                    ..RawSolution::failed(SolveStatus::Error)
                };
            }
            variable_values.insert(variable.product.clone(), rounded as i64);
        }

        let constraint_duals = model
            .constraints
            .iter()
            .map(|c| (c.name.clone(), solution.shadow_price(&c.name)))
            .collect();

        let reduced_costs = model
            .variables
            .iter()
            .filter_map(|v| {
                solution
                    .reduced_cost(v.product.as_str())
                    .map(|rc| (v.product.clone(), rc))
            })
            .collect();

        RawSolution {
            status,
            variable_values,
            objective_value: solution.objective_value,
            constraint_duals,
            reduced_costs,
            nodes_explored: solution.nodes_explored,
        }
    }
}

impl SolverAdapter for MilpAdapter {
    fn solve(&self, model: &Model) -> RawSolution {
        let problem = Self::to_lp_problem(model);
        let solution = self.solver.solve(&problem);
        tracing::debug!(
            status = ?solution.status,
            nodes = solution.nodes_explored,
            objective = solution.objective_value,
            "solver finished"
        );
        self.map_solution(model, solution)
    }
}
