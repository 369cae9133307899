//! Built → Solved → {Extracted | Rejected}, one step per type.

use thiserror::Error;

use crate::adapter::{RawSolution, SolverAdapter};
use crate::builder::ModelError;
use crate::extract::{InternalInvariantError, Outcome, ResultExtractor};
use crate::model::Model;
use crate::params::ResourceLimits;
use crate::scenario::Scenario;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Invalid model: {0}")]
    Model(#[from] ModelError),
    #[error("Internal invariant violated: {0}")]
    Invariant(#[from] InternalInvariantError),
}

/// A model ready to be solved
#[derive(Debug, Clone)]
pub struct BuiltModel {
    model: Model,
    limits: ResourceLimits,
}

/// A model together with the solver's answer
#[derive(Debug, Clone)]
pub struct SolvedModel {
    model: Model,
    limits: ResourceLimits,
    raw: RawSolution,
}

impl BuiltModel {
    pub fn new(scenario: &Scenario) -> Result<Self, ModelError> {
        Ok(Self {
            model: scenario.build_model()?,
            limits: scenario.limits.clone(),
        })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn solve(self, adapter: &impl SolverAdapter) -> SolvedModel {
        let raw = adapter.solve(&self.model);
        tracing::debug!(status = %raw.status, nodes = raw.nodes_explored, "model solved");
        SolvedModel {
            model: self.model,
            limits: self.limits,
            raw,
        }
    }
}

impl SolvedModel {
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn raw(&self) -> &RawSolution {
        &self.raw
    }

    pub fn extract(&self, extractor: &ResultExtractor) -> Result<Outcome, InternalInvariantError> {
        extractor.extract(&self.model, &self.limits, &self.raw)
    }
}

/// Build, solve and extract `scenario` in one go
pub fn run(scenario: &Scenario, adapter: &impl SolverAdapter) -> Result<Outcome, PipelineError> {
    let built = BuiltModel::new(scenario)?;
    let solved = built.solve(adapter);
    Ok(solved.extract(&ResultExtractor::new())?)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::adapter::SolveStatus;
    use crate::params::ProductSpec;

    /// Adapter that records calls and always reports the given status
    struct Fixed {
        status: SolveStatus,
        calls: Cell<usize>,
    }

    impl SolverAdapter for Fixed {
        fn solve(&self, _model: &Model) -> RawSolution {
            self.calls.set(self.calls.get() + 1);
            RawSolution::failed(self.status)
        }
    }

    #[test]
    fn test_model_error_aborts_before_solve() {
        let mut scenario = Scenario::furniture();
        scenario.products.push(ProductSpec::new("bench", 50.0).with_usage("steel", 1.0));
        let adapter = Fixed {
            status: SolveStatus::Optimal,
            calls: Cell::new(0),
        };

        let err = run(&scenario, &adapter).unwrap_err();

        assert!(matches!(err, PipelineError::Model(ModelError::UnknownResource { .. })));
        assert_eq!(adapter.calls.get(), 0);
    }

    #[test]
    fn test_solver_failure_is_rejected() {
        let adapter = Fixed {
            status: SolveStatus::Unbounded,
            calls: Cell::new(0),
        };

        let outcome = run(&Scenario::furniture(), &adapter).unwrap();

        assert_eq!(outcome.failure().map(|f| f.status), Some(SolveStatus::Unbounded));
        assert_eq!(adapter.calls.get(), 1);
    }

    #[test]
    fn test_stages_expose_intermediate_state() {
        let built = BuiltModel::new(&Scenario::furniture()).unwrap();
        assert_eq!(built.model().variables.len(), 2);

        let solved = built.solve(&crate::MilpAdapter::new());
        assert_eq!(solved.raw().status, SolveStatus::Optimal);

        let outcome = solved.extract(&ResultExtractor::new()).unwrap();
        assert_eq!(outcome.result().map(|r| r.profit), Some(6200.0));
    }
}
