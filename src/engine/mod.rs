//! Simulation engine - Monte Carlo evaluation of a formula over sampled inputs
//!
//! Each run validates its inputs, compiles the formula, then draws
//! `sample_count` independent iterations. Every iteration samples one value
//! per variable and evaluates the formula; the outputs are summarised into
//! mean, population standard deviation, p10/p50/p90 and, when a tolerance
//! band is given, the pass rate.
//!
//! A run either succeeds completely or returns an error; partial results are
//! never produced.

pub mod sampling;
pub mod stats;
pub mod worker;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

use crate::core::config::Limits;
use crate::core::error::LabError;
use crate::entities::session::validate_inputs;
use crate::entities::{SimulationResult, ToleranceBand, ValueSource, Variable};
use crate::formula::FormulaError;

pub use stats::{percentile, Moments};
pub use worker::{
    SequenceGate, SimulationJob, SimulationPanel, SimulationReply, SimulationWorker, WorkerStopped,
};

/// Everything the engine needs for one run; also the worker message payload
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    pub variables: Vec<Variable>,
    pub formula: String,
    pub sample_count: u32,
    pub tolerance_band: Option<ToleranceBand>,
}

/// Knobs that affect how a run executes but not what it computes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationOptions {
    /// Explicit seed; `None` seeds from the thread RNG
    pub seed: Option<u64>,

    /// Keep raw output samples (up to `limits.retained_sample_cap`)
    pub retain_samples: bool,

    /// Sample-count cap and retention cap
    pub limits: Limits,
}

impl SimulationOptions {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn retaining_samples(mut self) -> Self {
        self.retain_samples = true;
        self
    }
}

/// Run a Monte Carlo simulation.
///
/// Fails with a configuration error for invalid variables, distributions,
/// tolerance band or sample count, and with a formula error for anything the
/// formula compiler rejects; both are raised before sampling starts. A
/// non-finite output at any iteration aborts the whole run.
#[tracing::instrument(level = "debug", skip_all, fields(sample_count = request.sample_count))]
pub fn simulate(
    request: &SimulationRequest,
    options: &SimulationOptions,
) -> Result<SimulationResult, LabError> {
    let started = Instant::now();

    let formula = validate_inputs(
        &request.variables,
        &request.formula,
        request.sample_count,
        request.tolerance_band.as_ref(),
        &options.limits,
    )?;
    let sources: Vec<ValueSource> = request
        .variables
        .iter()
        .map(Variable::source)
        .collect::<Result<_, _>>()?;

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let n = request.sample_count as usize;
    let mut outputs: Vec<f64> = Vec::with_capacity(n);
    let mut bindings = vec![0.0; sources.len()];
    let mut moments = Moments::new();
    let mut in_band: u32 = 0;

    for iteration in 0..request.sample_count {
        for (slot, source) in bindings.iter_mut().zip(&sources) {
            *slot = source.draw(&mut rng);
        }

        let value = formula.evaluate(&bindings);
        if !value.is_finite() {
            tracing::debug!(iteration, value, "non-finite formula output");
            return Err(FormulaError::NonFinite { iteration, value }.into());
        }

        moments.push(value);
        if request
            .tolerance_band
            .as_ref()
            .is_some_and(|band| band.contains(value))
        {
            in_band += 1;
        }
        outputs.push(value);
    }

    let samples = if options.retain_samples {
        let keep = n.min(options.limits.retained_sample_cap);
        Some(outputs[..keep].to_vec())
    } else {
        None
    };

    outputs.sort_by(f64::total_cmp);
    let min = outputs[0];
    let max = outputs[n - 1];
    let p10 = percentile(&outputs, 0.10).unwrap_or(min);
    let p50 = percentile(&outputs, 0.50).unwrap_or(min);
    let p90 = percentile(&outputs, 0.90).unwrap_or(max);

    let pass_rate = request
        .tolerance_band
        .map(|_| f64::from(in_band) / f64::from(request.sample_count));

    let result = SimulationResult {
        samples,
        sample_count: request.sample_count,
        mean: moments.mean(),
        stddev: moments.population_stddev(),
        min,
        max,
        p10,
        p50,
        p90,
        pass_rate,
    };

    tracing::info!(
        sample_count = request.sample_count,
        mean = result.mean,
        stddev = result.stddev,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "simulation complete"
    );

    Ok(result)
}
