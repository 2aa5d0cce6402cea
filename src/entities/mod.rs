//! Entity type definitions

pub mod session;
pub mod variable;

pub use session::{LabSession, SimulationResult, ToleranceBand};
pub use variable::{Distribution, ValueSource, Variable, VariableMode};
