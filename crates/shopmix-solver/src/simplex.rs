use thiserror::Error;

use crate::problem::{ConstraintOp, LpProblem};
use crate::solution::{Analysis, ReducedCost, ShadowPrice, Solution, SolutionStatus};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LpError {
    #[error("Constraint {constraint} has {found} coefficients, expected {expected}")]
    DimensionMismatch {
        constraint: String,
        expected: usize,
        found: usize,
    },
    #[error("Objective has {found} coefficients, expected {expected}")]
    ObjectiveMismatch { expected: usize, found: usize },
    #[error("Non-finite value in {0}")]
    NonFinite(String),
    #[error("Iteration limit of {0} reached")]
    IterationLimit(usize),
}

/// Two-phase tableau simplex for continuous linear programs
#[derive(Debug, Clone)]
pub struct SimplexSolver {
    /// Maximum pivots per phase before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for SimplexSolver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
        }
    }
}

impl SimplexSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Solve the LP relaxation of `problem`, ignoring integrality flags.
    ///
    /// Malformed input and iteration exhaustion are reported as
    /// [`SolutionStatus::Error`]; use [`SimplexSolver::try_solve`] to see why.
    pub fn solve(&self, problem: &LpProblem) -> Solution {
        match self.try_solve(problem) {
            Ok(solution) => solution,
            Err(e) => {
                tracing::debug!(error = %e, "simplex failed");
                Solution::error()
            }
        }
    }

    pub fn try_solve(&self, problem: &LpProblem) -> Result<Solution, LpError> {
        let mut tableau = self.build_tableau(problem)?;

        // Phase 1: find an initial basic feasible solution
        if tableau.n_artificial > 0 && !self.phase1(&mut tableau)? {
            return Ok(Solution::infeasible().with_nodes(1));
        }

        // Phase 2: optimize
        if !self.phase2(&mut tableau)? {
            return Ok(Solution::unbounded().with_nodes(1));
        }

        Ok(self.extract_solution(&tableau, problem))
    }

    fn build_tableau(&self, problem: &LpProblem) -> Result<Tableau, LpError> {
        let n_vars = problem.num_variables();
        let n_constraints = problem.num_constraints();

        if problem.objective.coefficients.len() != n_vars {
            return Err(LpError::ObjectiveMismatch {
                expected: n_vars,
                found: problem.objective.coefficients.len(),
            });
        }
        if problem.objective.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(LpError::NonFinite("objective".to_string()));
        }

        // Normalize every row to a non-negative RHS, remembering the flip
        let mut rows = Vec::with_capacity(n_constraints);
        let mut n_slack = 0;
        let mut n_artificial = 0;
        for c in &problem.constraints {
            if c.coefficients.len() != n_vars {
                return Err(LpError::DimensionMismatch {
                    constraint: c.name.clone(),
                    expected: n_vars,
                    found: c.coefficients.len(),
                });
            }
            if !c.rhs.is_finite() || c.coefficients.iter().any(|v| !v.is_finite()) {
                return Err(LpError::NonFinite(c.name.clone()));
            }

            let flipped = c.rhs < 0.0;
            let op = if flipped { c.op.flipped() } else { c.op };
            match op {
                ConstraintOp::Le => n_slack += 1,
                ConstraintOp::Ge => {
                    n_slack += 1; // surplus
                    n_artificial += 1;
                }
                ConstraintOp::Eq => n_artificial += 1,
            }
            rows.push(RowAux {
                op,
                flipped,
                slack_col: None,
                artificial_col: None,
            });
        }

        let total_cols = n_vars + n_slack + n_artificial + 1; // +1 for RHS
        let rhs_col = total_cols - 1;
        let mut data = vec![vec![0.0; total_cols]; n_constraints + 1];
        let mut basic_vars = vec![0; n_constraints];

        let mut slack_idx = n_vars;
        let mut artificial_idx = n_vars + n_slack;

        for (i, (c, aux)) in problem.constraints.iter().zip(rows.iter_mut()).enumerate() {
            let sign = if aux.flipped { -1.0 } else { 1.0 };
            for (j, &coef) in c.coefficients.iter().enumerate() {
                data[i][j] = sign * coef;
            }
            data[i][rhs_col] = sign * c.rhs;

            match aux.op {
                ConstraintOp::Le => {
                    data[i][slack_idx] = 1.0;
                    basic_vars[i] = slack_idx;
                    aux.slack_col = Some(slack_idx);
                    slack_idx += 1;
                }
                ConstraintOp::Ge => {
                    data[i][slack_idx] = -1.0;
                    aux.slack_col = Some(slack_idx);
                    slack_idx += 1;
                    data[i][artificial_idx] = 1.0;
                    basic_vars[i] = artificial_idx;
                    aux.artificial_col = Some(artificial_idx);
                    artificial_idx += 1;
                }
                ConstraintOp::Eq => {
                    data[i][artificial_idx] = 1.0;
                    basic_vars[i] = artificial_idx;
                    aux.artificial_col = Some(artificial_idx);
                    artificial_idx += 1;
                }
            }
        }

        // Objective row (last row) always holds a maximization;
        // minimization negates the coefficients
        let obj_row = n_constraints;
        for (j, &coef) in problem.objective.coefficients.iter().enumerate() {
            data[obj_row][j] = if problem.objective.minimize { -coef } else { coef };
        }

        Ok(Tableau {
            data,
            basic_vars,
            rows,
            n_vars,
            n_slack,
            n_artificial,
        })
    }

    /// Returns `Ok(false)` when no feasible basis exists
    fn phase1(&self, tableau: &mut Tableau) -> Result<bool, LpError> {
        let obj_row = tableau.obj_row();
        let n_cols = tableau.n_cols();
        let art_start = tableau.artificial_start();

        let original_objective = tableau.data[obj_row].clone();

        // Maximize -sum(artificials)
        tableau.data[obj_row].iter_mut().for_each(|v| *v = 0.0);
        for j in art_start..(art_start + tableau.n_artificial) {
            tableau.data[obj_row][j] = -1.0;
        }
        for i in 0..obj_row {
            if tableau.basic_vars[i] >= art_start {
                for j in 0..n_cols {
                    let v = tableau.data[i][j];
                    tableau.data[obj_row][j] += v;
                }
            }
        }

        self.iterate(tableau, n_cols - 1)?;

        let rhs_col = n_cols - 1;
        for i in 0..obj_row {
            if tableau.basic_vars[i] >= art_start && tableau.data[i][rhs_col].abs() > self.tolerance {
                return Ok(false);
            }
        }

        // Drive degenerate artificials out of the basis where possible
        for i in 0..obj_row {
            if tableau.basic_vars[i] < art_start {
                continue;
            }
            if let Some(col) = (0..art_start).find(|&j| tableau.data[i][j].abs() > self.tolerance) {
                self.pivot(tableau, i, col);
            }
        }

        // Restore the real objective and price out the basis
        tableau.data[obj_row] = original_objective;
        for i in 0..obj_row {
            let basic = tableau.basic_vars[i];
            let ratio = tableau.data[obj_row][basic];
            if ratio.abs() > self.tolerance {
                for j in 0..n_cols {
                    let v = tableau.data[i][j];
                    tableau.data[obj_row][j] -= ratio * v;
                }
            }
        }

        Ok(true)
    }

    /// Returns `Ok(false)` when the objective is unbounded
    fn phase2(&self, tableau: &mut Tableau) -> Result<bool, LpError> {
        // Artificial columns never re-enter
        let limit = tableau.artificial_start();
        self.iterate(tableau, limit)
    }

    fn iterate(&self, tableau: &mut Tableau, column_limit: usize) -> Result<bool, LpError> {
        for _ in 0..self.max_iterations {
            let Some(pivot_col) = self.find_pivot_column(tableau, column_limit) else {
                return Ok(true);
            };
            let Some(pivot_row) = self.find_pivot_row(tableau, pivot_col) else {
                return Ok(false);
            };
            self.pivot(tableau, pivot_row, pivot_col);
        }
        Err(LpError::IterationLimit(self.max_iterations))
    }

    fn find_pivot_column(&self, tableau: &Tableau, column_limit: usize) -> Option<usize> {
        let obj_row = tableau.obj_row();

        // Most positive reduced profit, lowest index on ties
        let mut max_val = self.tolerance;
        let mut max_col = None;
        for j in 0..column_limit {
            if tableau.data[obj_row][j] > max_val {
                max_val = tableau.data[obj_row][j];
                max_col = Some(j);
            }
        }
        max_col
    }

    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let rhs_col = tableau.n_cols() - 1;

        let mut min_ratio = f64::INFINITY;
        let mut min_row = None;
        for i in 0..tableau.obj_row() {
            let val = tableau.data[i][col];
            if val > self.tolerance {
                let ratio = tableau.data[i][rhs_col].max(0.0) / val;
                if ratio < min_ratio {
                    min_ratio = ratio;
                    min_row = Some(i);
                }
            }
        }
        min_row
    }

    fn pivot(&self, tableau: &mut Tableau, row: usize, col: usize) {
        let n_cols = tableau.n_cols();

        tableau.basic_vars[row] = col;

        let pivot_val = tableau.data[row][col];
        for j in 0..n_cols {
            tableau.data[row][j] /= pivot_val;
        }

        let pivot_row = tableau.data[row].clone();
        for (i, r) in tableau.data.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = r[col];
            if factor != 0.0 {
                for (v, p) in r.iter_mut().zip(&pivot_row) {
                    *v -= factor * p;
                }
            }
        }
    }

    fn extract_solution(&self, tableau: &Tableau, problem: &LpProblem) -> Solution {
        let n_vars = problem.num_variables();
        let rhs_col = tableau.n_cols() - 1;

        let mut values = vec![0.0; n_vars];
        for (i, &basic) in tableau.basic_vars.iter().enumerate() {
            if basic < n_vars {
                let v = tableau.data[i][rhs_col];
                values[basic] = if v.abs() < self.tolerance { 0.0 } else { v };
            }
        }

        let objective_value = problem.evaluate(&values);
        let analysis = self.analyze(tableau, problem, &values);

        Solution {
            status: SolutionStatus::Optimal,
            values,
            objective_value,
            analysis,
            nodes_explored: 1,
        }
    }

    fn analyze(&self, tableau: &Tableau, problem: &LpProblem, values: &[f64]) -> Analysis {
        let obj_row = &tableau.data[tableau.obj_row()];
        // Tableau duals are for the maximization form; flip back for minimize
        let sense = if problem.objective.minimize { -1.0 } else { 1.0 };

        let shadow_prices = problem
            .constraints
            .iter()
            .zip(&tableau.rows)
            .map(|(constraint, aux)| {
                let raw = match (aux.op, aux.slack_col, aux.artificial_col) {
                    (ConstraintOp::Le, Some(col), _) => -obj_row[col],
                    (ConstraintOp::Ge, Some(col), _) => obj_row[col],
                    (ConstraintOp::Eq, _, Some(col)) => -obj_row[col],
                    _ => 0.0,
                };
                let flip = if aux.flipped { -1.0 } else { 1.0 };
                let mut value = sense * flip * raw;
                if value.abs() < self.tolerance {
                    value = 0.0;
                }
                ShadowPrice {
                    constraint: constraint.name.clone(),
                    value,
                }
            })
            .collect();

        let reduced_costs = problem
            .variables
            .iter()
            .enumerate()
            .map(|(j, name)| {
                let is_basic = tableau.basic_vars.contains(&j);
                let rc = if is_basic { 0.0 } else { sense * obj_row[j] };
                ReducedCost {
                    variable: name.clone(),
                    value: values[j],
                    reduced_cost: if rc.abs() < self.tolerance { 0.0 } else { rc },
                    is_basic,
                }
            })
            .collect();

        Analysis {
            shadow_prices,
            reduced_costs,
        }
    }
}

struct Tableau {
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    rows: Vec<RowAux>,
    n_vars: usize,
    n_slack: usize,
    n_artificial: usize,
}

impl Tableau {
    fn obj_row(&self) -> usize {
        self.data.len() - 1
    }

    fn n_cols(&self) -> usize {
        self.data[0].len()
    }

    fn artificial_start(&self) -> usize {
        self.n_vars + self.n_slack
    }
}

/// Bookkeeping for one constraint row after RHS normalization
struct RowAux {
    op: ConstraintOp,
    flipped: bool,
    slack_col: Option<usize>,
    artificial_col: Option<usize>,
}
