//! CLI command implementations

pub mod completions;
pub mod new;
pub mod report;
pub mod run;
pub mod share;
pub mod validate;
