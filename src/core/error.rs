//! Engine error taxonomy
//!
//! `ConfigurationError` covers invalid session shape and parameters,
//! `FormulaError` covers the expression itself. `LabError` is what the
//! simulation engine returns.

use miette::Diagnostic;
use thiserror::Error;

use crate::formula::FormulaError;

/// Invalid session shape or parameters
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum ConfigurationError {
    #[error("Sample count must be between 1 and {max}, got {count}")]
    #[diagnostic(
        code(sanity_lab::config::sample_count),
        help("lower the sample count or raise max_sample_count in the config file")
    )]
    SampleCountOutOfRange { count: u64, max: u32 },

    #[error("Invalid variable name '{name}'")]
    #[diagnostic(
        code(sanity_lab::config::variable_name),
        help("names start with a letter or '_' and contain only letters, digits and '_'")
    )]
    InvalidVariableName { name: String },

    #[error("Variable '{name}' is declared more than once")]
    #[diagnostic(code(sanity_lab::config::duplicate_variable))]
    DuplicateVariable { name: String },

    #[error("Variable '{name}': {reason}")]
    #[diagnostic(code(sanity_lab::config::mode))]
    ModeMismatch { name: String, reason: &'static str },

    #[error("Variable '{name}' has an invalid distribution: {reason}")]
    #[diagnostic(code(sanity_lab::config::distribution))]
    InvalidDistribution { name: String, reason: String },

    #[error("Variable '{name}' has a non-finite fixed value")]
    #[diagnostic(code(sanity_lab::config::fixed_value))]
    NonFiniteFixedValue { name: String },

    #[error("Formula is {len} characters long, the limit is {max}")]
    #[diagnostic(code(sanity_lab::config::formula_length))]
    FormulaTooLong { len: usize, max: usize },

    #[error("Invalid tolerance band: lower {lower} must not exceed upper {upper}")]
    #[diagnostic(code(sanity_lab::config::tolerance_band))]
    InvalidToleranceBand { lower: f64, upper: f64 },

    #[error("Stored results are inconsistent with the session: {reason}")]
    #[diagnostic(
        code(sanity_lab::config::results),
        help("re-run the simulation to regenerate results")
    )]
    InconsistentResults { reason: String },
}

/// Errors returned by the simulation engine
#[derive(Debug, Error, Diagnostic)]
pub enum LabError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Formula(#[from] FormulaError),
}

impl LabError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, LabError::Configuration(_))
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, LabError::Formula(_))
    }

    pub fn as_formula(&self) -> Option<&FormulaError> {
        match self {
            LabError::Formula(e) => Some(e),
            LabError::Configuration(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigurationError::SampleCountOutOfRange {
            count: 0,
            max: 100_000,
        };
        assert_eq!(
            err.to_string(),
            "Sample count must be between 1 and 100000, got 0"
        );

        let err = ConfigurationError::InvalidToleranceBand {
            lower: 2.0,
            upper: 1.0,
        };
        assert!(err.to_string().contains("lower 2"));
    }

    #[test]
    fn test_lab_error_classification() {
        let err: LabError = ConfigurationError::DuplicateVariable {
            name: "x".to_string(),
        }
        .into();
        assert!(err.is_configuration());
        assert!(!err.is_formula());
        assert!(err.as_formula().is_none());

        let err: LabError = FormulaError::Empty.into();
        assert!(err.is_formula());
        assert_eq!(err.to_string(), "Formula is empty");
    }
}
