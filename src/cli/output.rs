//! Output formatting utilities

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::format_value;
use crate::cli::OutputFormat;
use crate::entities::{SimulationResult, ToleranceBand};

/// Determine the effective output format; `auto` means text
pub fn effective_format(format: OutputFormat) -> OutputFormat {
    match format {
        OutputFormat::Auto => OutputFormat::Text,
        other => other,
    }
}

/// Print a value as YAML or JSON; returns false for text formats
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match effective_format(format) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", crate::yaml::to_yaml(value)?);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Text summary of a simulation result
pub fn render_summary(result: &SimulationResult, band: Option<&ToleranceBand>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "   {} ({} samples):\n",
        style("Monte Carlo").bold(),
        result.sample_count
    ));
    out.push_str(&format!("     Mean: {}\n", format_value(result.mean)));
    out.push_str(&format!("     Std Dev: {}\n", format_value(result.stddev)));
    out.push_str(&format!(
        "     Range: {} to {}\n",
        format_value(result.min),
        format_value(result.max)
    ));
    out.push_str(&format!(
        "     P10 / P50 / P90: {} / {} / {}\n",
        format_value(result.p10),
        format_value(result.p50),
        format_value(result.p90)
    ));

    if let (Some(band), Some(percent)) = (band, result.pass_percent()) {
        let rate = format!("{:.2}%", percent);
        let rate = if percent >= 99.0 {
            style(rate).green()
        } else if percent >= 90.0 {
            style(rate).yellow()
        } else {
            style(rate).red()
        };
        out.push_str(&format!(
            "     Pass rate: {} within [{}, {}]\n",
            rate,
            format_value(band.lower),
            format_value(band.upper)
        ));
    }
    out
}
