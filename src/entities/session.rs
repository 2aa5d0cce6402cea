//! Lab session entity - the aggregate root shared by the engine and the codec
//!
//! A session holds the declared variables, the formula, the sample count and
//! an optional tolerance band. Results are only ever written by running the
//! engine, so they stay a function of the other fields.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::config::{Limits, DEFAULT_SAMPLE_COUNT, MAX_FORMULA_LEN};
use crate::core::error::{ConfigurationError, LabError};
use crate::engine::{self, SimulationOptions, SimulationRequest};
use crate::entities::variable::Variable;
use crate::formula::CompiledFormula;

/// Acceptable output range used to compute the pass rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToleranceBand {
    /// Lower bound (inclusive)
    pub lower: f64,

    /// Upper bound (inclusive)
    pub upper: f64,
}

impl ToleranceBand {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// True if `value` lies inside the band, bounds included
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.lower.is_finite() || !self.upper.is_finite() || self.lower > self.upper {
            return Err(ConfigurationError::InvalidToleranceBand {
                lower: self.lower,
                upper: self.upper,
            });
        }
        Ok(())
    }
}

/// Summary of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationResult {
    /// Raw output samples in draw order, kept only on request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<f64>>,

    /// Number of iterations summarised
    pub sample_count: u32,

    /// Arithmetic mean
    pub mean: f64,

    /// Population standard deviation
    pub stddev: f64,

    /// Smallest sample
    pub min: f64,

    /// Largest sample
    pub max: f64,

    /// 10th percentile
    pub p10: f64,

    /// Median
    pub p50: f64,

    /// 90th percentile
    pub p90: f64,

    /// Fraction of samples inside the tolerance band (0..=1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_rate: Option<f64>,
}

impl SimulationResult {
    /// Copy without the raw sample buffer
    pub fn without_samples(&self) -> Self {
        Self {
            samples: None,
            ..self.clone()
        }
    }

    /// Pass rate as a percentage, if a band was given
    pub fn pass_percent(&self) -> Option<f64> {
        self.pass_rate.map(|r| r * 100.0)
    }

    /// Check internal consistency against the session that produced it
    pub fn validate(
        &self,
        sample_count: u32,
        band: Option<&ToleranceBand>,
    ) -> Result<(), ConfigurationError> {
        let fail = |reason: String| ConfigurationError::InconsistentResults { reason };

        if self.sample_count != sample_count {
            return Err(fail(format!(
                "results cover {} samples but the session asks for {}",
                self.sample_count, sample_count
            )));
        }

        let stats = [
            self.mean, self.stddev, self.min, self.max, self.p10, self.p50, self.p90,
        ];
        if stats.iter().any(|v| !v.is_finite()) {
            return Err(fail("statistics must be finite".to_string()));
        }
        if self.stddev < 0.0 {
            return Err(fail("stddev is negative".to_string()));
        }
        if !(self.min <= self.p10
            && self.p10 <= self.p50
            && self.p50 <= self.p90
            && self.p90 <= self.max)
        {
            return Err(fail(
                "percentiles must satisfy min <= p10 <= p50 <= p90 <= max".to_string(),
            ));
        }

        match (band, self.pass_rate) {
            (Some(_), Some(rate)) if (0.0..=1.0).contains(&rate) => {}
            (Some(_), Some(rate)) => {
                return Err(fail(format!("pass rate {} lies outside [0, 1]", rate)));
            }
            (Some(_), None) => {
                return Err(fail("tolerance band given but pass rate missing".to_string()));
            }
            (None, Some(_)) => {
                return Err(fail("pass rate present without a tolerance band".to_string()));
            }
            (None, None) => {}
        }

        if let Some(ref samples) = self.samples {
            if samples.len() > self.sample_count as usize {
                return Err(fail("more retained samples than iterations".to_string()));
            }
        }

        Ok(())
    }
}

fn default_sample_count() -> u32 {
    DEFAULT_SAMPLE_COUNT
}

/// Aggregate root: everything needed to run, share and re-render a simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabSession {
    /// Optional label shown in reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Declared formula inputs
    #[serde(default)]
    pub variables: Vec<Variable>,

    /// Expression over the variable names
    pub formula: String,

    /// Iterations per run
    #[serde(default = "default_sample_count")]
    pub sample_count: u32,

    /// Optional pass/fail band
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance_band: Option<ToleranceBand>,

    /// Explicit seed; makes runs reproducible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Output of the last engine run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    results: Option<SimulationResult>,
}

impl LabSession {
    /// Create a session with no variables and no results
    pub fn new(formula: impl Into<String>, sample_count: u32) -> Self {
        Self {
            title: None,
            variables: Vec::new(),
            formula: formula.into(),
            sample_count,
            tolerance_band: None,
            seed: None,
            results: None,
        }
    }

    /// Builder: add a variable
    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    /// Builder: set the tolerance band
    pub fn with_tolerance_band(mut self, lower: f64, upper: f64) -> Self {
        self.tolerance_band = Some(ToleranceBand::new(lower, upper));
        self
    }

    /// Builder: set the seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder: set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Results of the last run, if any
    pub fn results(&self) -> Option<&SimulationResult> {
        self.results.as_ref()
    }

    /// Drop results, e.g. after editing inputs
    pub fn clear_results(&mut self) {
        self.results = None;
    }

    /// Copy whose results (if any) carry no raw samples
    pub fn without_samples(&self) -> Self {
        Self {
            results: self.results.as_ref().map(SimulationResult::without_samples),
            ..self.clone()
        }
    }

    /// Check if the engine has been run
    pub fn has_results(&self) -> bool {
        self.results.is_some()
    }

    /// Look up a variable by name
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Names of the declared variables, in declaration order
    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }

    /// Engine payload for this session
    pub fn request(&self) -> SimulationRequest {
        SimulationRequest {
            variables: self.variables.clone(),
            formula: self.formula.clone(),
            sample_count: self.sample_count,
            tolerance_band: self.tolerance_band,
        }
    }

    /// Run the engine and store the result.
    ///
    /// The session seed is used when `options` carries none. On error the
    /// previous results are cleared, never left stale.
    pub fn run(&mut self, options: &SimulationOptions) -> Result<&SimulationResult, LabError> {
        self.results = None;
        let result = engine::simulate(&self.request(), &self.options_for(options))?;
        Ok(&*self.results.insert(result))
    }

    /// `options` with the session seed filled in when none is given
    pub fn options_for(&self, options: &SimulationOptions) -> SimulationOptions {
        let mut options = options.clone();
        if options.seed.is_none() {
            options.seed = self.seed;
        }
        options
    }

    /// Store a result computed elsewhere (the background worker) for this
    /// session's current request
    pub(crate) fn store_results(&mut self, result: SimulationResult) -> &SimulationResult {
        self.results.insert(result)
    }

    /// Validate every invariant: variables, formula references, sample
    /// count, tolerance band and stored results.
    pub fn validate(&self, limits: &Limits) -> Result<(), LabError> {
        validate_inputs(
            &self.variables,
            &self.formula,
            self.sample_count,
            self.tolerance_band.as_ref(),
            limits,
        )?;
        if let Some(ref results) = self.results {
            results.validate(self.sample_count, self.tolerance_band.as_ref())?;
        }
        Ok(())
    }
}

/// Validate engine inputs and compile the formula.
///
/// Configuration problems are reported before formula problems, and both
/// before any sampling could start.
pub(crate) fn validate_inputs(
    variables: &[Variable],
    formula: &str,
    sample_count: u32,
    band: Option<&ToleranceBand>,
    limits: &Limits,
) -> Result<CompiledFormula, LabError> {
    let mut seen = HashSet::new();
    for variable in variables {
        variable.validate()?;
        if !seen.insert(variable.name.as_str()) {
            return Err(ConfigurationError::DuplicateVariable {
                name: variable.name.clone(),
            }
            .into());
        }
    }

    if sample_count == 0 || sample_count > limits.max_sample_count {
        return Err(ConfigurationError::SampleCountOutOfRange {
            count: u64::from(sample_count),
            max: limits.max_sample_count,
        }
        .into());
    }

    if let Some(band) = band {
        band.validate()?;
    }

    let len = formula.chars().count();
    if len > MAX_FORMULA_LEN {
        return Err(ConfigurationError::FormulaTooLong {
            len,
            max: MAX_FORMULA_LEN,
        }
        .into());
    }

    let names: Vec<&str> = variables.iter().map(|v| v.name.as_str()).collect();
    Ok(CompiledFormula::compile(formula, &names)?)
}
