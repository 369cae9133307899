//! Production-mix planning as a small mixed-integer program.
//!
//! The flow is `Scenario` → [`ModelBuilder`] → [`Model`] → [`SolverAdapter`]
//! → [`RawSolution`] → [`ResultExtractor`] → [`Outcome`]. [`pipeline`] wires
//! the steps together as a typestate.

pub mod adapter;
pub mod builder;
pub mod extract;
pub mod model;
pub mod params;
pub mod pipeline;
pub mod scenario;

pub use adapter::{MilpAdapter, RawSolution, SolveStatus, SolverAdapter};
pub use builder::{ModelBuilder, ModelError};
pub use extract::{BINDING_EPSILON, InternalInvariantError, Outcome, ProductionResult, ResultExtractor, SolveFailure};
pub use model::{Constraint, ConstraintKind, Domain, Model, Relation, Sense, Variable};
pub use params::{ProductId, ProductSpec, ProductionFloor, ResourceId, ResourceLimits};
pub use pipeline::{BuiltModel, PipelineError, SolvedModel, run};
pub use scenario::{ConfigError, Scenario};
