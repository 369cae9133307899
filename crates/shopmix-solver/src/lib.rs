mod branch;
mod problem;
mod simplex;
mod solution;

pub use branch::Solver;
pub use problem::{Constraint, ConstraintOp, LpProblem, Objective};
pub use simplex::{LpError, SimplexSolver};
pub use solution::{Analysis, ReducedCost, ShadowPrice, Solution, SolutionStatus};
