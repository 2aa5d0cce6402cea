//! Sanity Lab: Monte Carlo sanity checks for engineering formulas
//!
//! Declare a few input variables (fixed values or probability
//! distributions), write a formula over them, and sample it many times to
//! see the spread of outcomes and how often they land inside a tolerance
//! band. Sessions are plain YAML files and can be shared as compact
//! URL-safe payloads.

pub mod cli;
pub mod codec;
pub mod core;
pub mod engine;
pub mod entities;
pub mod formula;
pub mod yaml;

pub use crate::codec::{decode, encode, share_link, SessionCodec};
pub use crate::core::{ConfigurationError, LabConfig, LabError, Limits};
pub use crate::engine::{simulate, SimulationOptions, SimulationRequest};
pub use crate::entities::{Distribution, LabSession, SimulationResult, ToleranceBand, Variable};
pub use crate::formula::FormulaError;
