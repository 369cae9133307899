/// The result of solving an LP or MILP problem
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Optimal values for each variable
    pub values: Vec<f64>,
    /// Optimal objective value
    pub objective_value: f64,
    /// Dual information taken from the LP that produced `values`
    pub analysis: Analysis,
    /// Branch-and-bound nodes solved (1 for a pure LP)
    pub nodes_explored: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// Solver gave up: iteration, node or time limit, or numerical trouble
    Error,
}

/// Sensitivity information for the final LP basis
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Analysis {
    /// Shadow prices (dual values) for each constraint
    /// Indicates how much the objective would change per unit increase of the RHS
    pub shadow_prices: Vec<ShadowPrice>,

    /// Reduced costs for each variable
    pub reduced_costs: Vec<ReducedCost>,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShadowPrice {
    /// Constraint name
    pub constraint: String,
    /// Shadow price value
    pub value: f64,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReducedCost {
    /// Variable name
    pub variable: String,
    /// Current value in solution
    pub value: f64,
    /// Reduced cost
    pub reduced_cost: f64,
    /// Is this variable in the basis?
    pub is_basic: bool,
}

impl Solution {
    fn without_values(status: SolutionStatus, objective_value: f64) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective_value,
            analysis: Analysis::default(),
            nodes_explored: 0,
        }
    }

    pub fn infeasible() -> Self {
        Self::without_values(SolutionStatus::Infeasible, f64::NAN)
    }

    pub fn unbounded() -> Self {
        Self::without_values(SolutionStatus::Unbounded, f64::NAN)
    }

    pub fn error() -> Self {
        Self::without_values(SolutionStatus::Error, f64::NAN)
    }

    pub fn with_nodes(mut self, nodes: usize) -> Self {
        self.nodes_explored = nodes;
        self
    }

    /// Dual value for the named constraint, if the solver produced one
    pub fn shadow_price(&self, constraint: &str) -> Option<f64> {
        self.analysis
            .shadow_prices
            .iter()
            .find(|sp| sp.constraint == constraint)
            .map(|sp| sp.value)
    }

    /// Objective change per unit forced into the named variable; zero when basic
    pub fn reduced_cost(&self, variable: &str) -> Option<f64> {
        self.analysis
            .reduced_costs
            .iter()
            .find(|rc| rc.variable == variable)
            .map(|rc| rc.reduced_cost)
    }
}
