use std::time::{Duration, Instant};

use crate::problem::{ConstraintOp, LpProblem};
use crate::simplex::SimplexSolver;
use crate::solution::{Solution, SolutionStatus};

/// Mixed-integer solver: depth-first branch-and-bound over [`SimplexSolver`].
///
/// Problems without integer variables are handed straight to the simplex.
/// Dual values on an integer optimum come from the LP relaxation of the node
/// that produced the incumbent, so they describe that node's basis rather than
/// the integer program as a whole.
#[derive(Debug, Clone)]
pub struct Solver {
    lp: SimplexSolver,
    /// Maximum number of LP relaxations to solve
    max_nodes: usize,
    /// Distance from an integer below which a value counts as integral
    integrality_tolerance: f64,
    /// Wall-clock budget for the whole search
    time_limit: Option<Duration>,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            lp: SimplexSolver::default(),
            max_nodes: 10000,
            integrality_tolerance: 1e-6,
            time_limit: None,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.lp = self.lp.with_max_iterations(max);
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.lp = self.lp.with_tolerance(tol);
        self
    }

    pub fn with_max_nodes(mut self, max: usize) -> Self {
        self.max_nodes = max;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn solve(&self, problem: &LpProblem) -> Solution {
        if !problem.has_integers() {
            return self.lp.solve(problem);
        }

        let started = Instant::now();
        let sense = if problem.objective.minimize { -1.0 } else { 1.0 };
        let n_constraints = problem.num_constraints();

        let mut stack = vec![problem.clone()];
        let mut incumbent: Option<Solution> = None;
        let mut nodes = 0;

        while let Some(node) = stack.pop() {
            if nodes >= self.max_nodes {
                tracing::warn!(nodes, "branch-and-bound node limit reached");
                return Solution::error().with_nodes(nodes);
            }
            if let Some(limit) = self.time_limit
                && started.elapsed() >= limit
            {
                tracing::warn!(nodes, ?limit, "branch-and-bound time limit reached");
                return Solution::error().with_nodes(nodes);
            }
            nodes += 1;

            let relaxed = self.lp.solve(&node);
            match relaxed.status {
                SolutionStatus::Optimal => {}
                SolutionStatus::Infeasible => continue,
                SolutionStatus::Unbounded => return Solution::unbounded().with_nodes(nodes),
                SolutionStatus::Error => return Solution::error().with_nodes(nodes),
            }

            if let Some(best) = &incumbent
                && sense * relaxed.objective_value <= sense * best.objective_value + self.lp.tolerance()
            {
                continue;
            }

            match self.branching_variable(problem, &relaxed.values) {
                Some((index, value)) => {
                    tracing::trace!(node = nodes, variable = %problem.variables[index], value, "branching");
                    // Down branch is pushed last so it is explored first
                    stack.push(node.with_bound(index, ConstraintOp::Ge, value.ceil()));
                    stack.push(node.with_bound(index, ConstraintOp::Le, value.floor()));
                }
                None => {
                    let mut found = relaxed;
                    for (j, v) in found.values.iter_mut().enumerate() {
                        if problem.is_integer(j) {
                            *v = v.round();
                        }
                    }
                    found.objective_value = problem.evaluate(&found.values);
                    // Bound rows added while branching are not part of the caller's problem
                    found.analysis.shadow_prices.truncate(n_constraints);
                    tracing::debug!(node = nodes, objective = found.objective_value, "new incumbent");
                    incumbent = Some(found);
                }
            }
        }

        tracing::debug!(nodes, elapsed = ?started.elapsed(), "branch-and-bound finished");
        match incumbent {
            Some(solution) => solution.with_nodes(nodes),
            None => Solution::infeasible().with_nodes(nodes),
        }
    }

    /// Most fractional integer variable, lowest index on ties
    fn branching_variable(&self, problem: &LpProblem, values: &[f64]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64, f64)> = None;
        for (j, &v) in values.iter().enumerate() {
            if !problem.is_integer(j) {
                continue;
            }
            let fraction = v - v.floor();
            let distance = fraction.min(1.0 - fraction);
            if distance <= self.integrality_tolerance {
                continue;
            }
            if best.is_none_or(|(_, _, d)| distance > d) {
                best = Some((j, v, distance));
            }
        }
        best.map(|(j, v, _)| (j, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knapsack() -> LpProblem {
        // Maximize: 5x + 4y
        // Subject to:
        //   6x + 4y <= 24
        //   x + 2y <= 6
        // LP optimum: x=3, y=1.5, obj=21
        // Integer optimum: x=4, y=0, obj=20
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.set_objective(vec![5.0, 4.0], false);
        problem.add_constraint("capacity", vec![6.0, 4.0], ConstraintOp::Le, 24.0);
        problem.add_constraint("balance", vec![1.0, 2.0], ConstraintOp::Le, 6.0);
        problem
    }

    #[test]
    fn test_continuous_relaxation_is_fractional() {
        let solution = Solver::new().solve(&knapsack());

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.objective_value - 21.0).abs() < 1e-6, "obj = {}", solution.objective_value);
        assert_eq!(solution.nodes_explored, 1);
    }

    #[test]
    fn test_branch_and_bound_finds_integer_optimum() {
        let mut problem = knapsack();
        problem.set_integer(0);
        problem.set_integer(1);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.values, vec![4.0, 0.0]);
        assert!((solution.objective_value - 20.0).abs() < 1e-9);
        assert!(solution.nodes_explored > 1);
        // Only the caller's constraints carry duals
        assert_eq!(solution.analysis.shadow_prices.len(), 2);
        assert!(solution.shadow_price("capacity").is_some());
        assert!(solution.shadow_price("balance").is_some());
    }

    #[test]
    fn test_integer_infeasible_with_feasible_relaxation() {
        // 2x = 3 has no integer solution
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![1.0], false);
        problem.add_constraint("odd", vec![2.0], ConstraintOp::Eq, 3.0);
        problem.set_integer(0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert_eq!(solution.nodes_explored, 3);
    }

    #[test]
    fn test_unbounded_relaxation() {
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![1.0], false);
        problem.add_constraint("floor", vec![1.0], ConstraintOp::Ge, 1.0);
        problem.set_integer(0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Unbounded);
    }

    #[test]
    fn test_node_limit_is_an_error() {
        let mut problem = knapsack();
        problem.set_integer(0);
        problem.set_integer(1);

        let solution = Solver::new().with_max_nodes(1).solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Error);
        assert!(solution.values.is_empty());
    }

    #[test]
    fn test_time_limit_is_an_error() {
        let mut problem = knapsack();
        problem.set_integer(0);

        let solution = Solver::new().with_time_limit(Duration::ZERO).solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Error);
    }
}
