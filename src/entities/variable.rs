//! Variable entity - a named formula input, fixed or drawn from a distribution

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigurationError;

/// How a variable gets its value each iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum VariableMode {
    /// Same value every iteration
    #[default]
    Fixed,
    /// Sampled independently every iteration
    Distribution,
}

impl std::fmt::Display for VariableMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableMode::Fixed => write!(f, "fixed"),
            VariableMode::Distribution => write!(f, "distribution"),
        }
    }
}

/// Probability law for a distributed variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Distribution {
    /// Uniform over [min, max)
    Uniform { min: f64, max: f64 },
    /// Normal (Gaussian)
    Normal { mean: f64, stddev: f64 },
    /// Triangular with peak at `mode`
    Triangular { min: f64, mode: f64, max: f64 },
}

impl Distribution {
    /// Check parameter constraints; returns a reason on failure
    pub fn check(&self) -> Result<(), String> {
        match *self {
            Distribution::Uniform { min, max } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err("min and max must be finite".to_string());
                }
                if min > max {
                    return Err(format!("min {} is greater than max {}", min, max));
                }
                if !(max - min).is_finite() {
                    return Err("width max - min overflows".to_string());
                }
            }
            Distribution::Normal { mean, stddev } => {
                if !mean.is_finite() || !stddev.is_finite() {
                    return Err("mean and stddev must be finite".to_string());
                }
                if stddev < 0.0 {
                    return Err(format!("stddev {} is negative", stddev));
                }
            }
            Distribution::Triangular { min, mode, max } => {
                if !min.is_finite() || !mode.is_finite() || !max.is_finite() {
                    return Err("min, mode and max must be finite".to_string());
                }
                if min > max {
                    return Err(format!("min {} is greater than max {}", min, max));
                }
                if mode < min || mode > max {
                    return Err(format!(
                        "mode {} lies outside [{}, {}]",
                        mode, min, max
                    ));
                }
                if !(max - min).is_finite() {
                    return Err("width max - min overflows".to_string());
                }
            }
        }
        Ok(())
    }

    /// Expected value of the distribution
    pub fn expected_value(&self) -> f64 {
        match *self {
            Distribution::Uniform { min, max } => (min + max) / 2.0,
            Distribution::Normal { mean, .. } => mean,
            Distribution::Triangular { min, mode, max } => (min + mode + max) / 3.0,
        }
    }

    /// Short name of the distribution family
    pub fn kind(&self) -> &'static str {
        match self {
            Distribution::Uniform { .. } => "uniform",
            Distribution::Normal { .. } => "normal",
            Distribution::Triangular { .. } => "triangular",
        }
    }
}

impl std::fmt::Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Distribution::Uniform { min, max } => write!(f, "uniform({}, {})", min, max),
            Distribution::Normal { mean, stddev } => write!(f, "normal({}, {})", mean, stddev),
            Distribution::Triangular { min, mode, max } => {
                write!(f, "triangular({}, {}, {})", min, mode, max)
            }
        }
    }
}

/// Where a validated variable's value comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueSource {
    Fixed(f64),
    Random(Distribution),
}

/// A named numeric input to the formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Variable {
    /// Identifier referenced by the formula
    pub name: String,

    /// Fixed or distribution
    #[serde(default)]
    pub mode: VariableMode,

    /// Value used when mode is fixed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_value: Option<f64>,

    /// Distribution used when mode is distribution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,
}

impl Variable {
    /// Create a fixed variable
    pub fn fixed(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            mode: VariableMode::Fixed,
            fixed_value: Some(value),
            distribution: None,
        }
    }

    /// Create a distributed variable
    pub fn distributed(name: impl Into<String>, distribution: Distribution) -> Self {
        Self {
            name: name.into(),
            mode: VariableMode::Distribution,
            fixed_value: None,
            distribution: Some(distribution),
        }
    }

    /// Validate the variable and return its value source
    pub fn source(&self) -> Result<ValueSource, ConfigurationError> {
        if !is_identifier(&self.name) {
            return Err(ConfigurationError::InvalidVariableName {
                name: self.name.clone(),
            });
        }

        match (self.mode, self.fixed_value, self.distribution) {
            (VariableMode::Fixed, Some(value), None) => {
                if !value.is_finite() {
                    return Err(ConfigurationError::NonFiniteFixedValue {
                        name: self.name.clone(),
                    });
                }
                Ok(ValueSource::Fixed(value))
            }
            (VariableMode::Distribution, None, Some(distribution)) => {
                distribution
                    .check()
                    .map_err(|reason| ConfigurationError::InvalidDistribution {
                        name: self.name.clone(),
                        reason,
                    })?;
                Ok(ValueSource::Random(distribution))
            }
            (VariableMode::Fixed, None, _) => Err(self.mismatch("fixed mode requires fixed_value")),
            (VariableMode::Fixed, Some(_), Some(_)) => {
                Err(self.mismatch("fixed mode must not carry a distribution"))
            }
            (VariableMode::Distribution, _, None) => {
                Err(self.mismatch("distribution mode requires a distribution"))
            }
            (VariableMode::Distribution, Some(_), Some(_)) => {
                Err(self.mismatch("distribution mode must not carry fixed_value"))
            }
        }
    }

    /// Check the variable without keeping the source
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.source().map(|_| ())
    }

    fn mismatch(&self, reason: &'static str) -> ConfigurationError {
        ConfigurationError::ModeMismatch {
            name: self.name.clone(),
            reason,
        }
    }
}

/// True if `name` is usable as a formula identifier
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}
