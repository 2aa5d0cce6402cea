//! `sanity-lab report` command - read-only view of a shared session

use console::style;
use miette::Result;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::helpers::{format_value, load_config, truncate_str};
use crate::cli::output::{print_structured, render_summary};
use crate::cli::GlobalOpts;
use crate::codec::SessionCodec;
use crate::entities::{LabSession, ValueSource, Variable};

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Encoded payload or share link
    pub input: String,
}

#[derive(Tabled)]
struct VariableRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "MODE")]
    mode: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

impl From<&Variable> for VariableRow {
    fn from(variable: &Variable) -> Self {
        let value = match variable.source() {
            Ok(ValueSource::Fixed(v)) => format_value(v),
            Ok(ValueSource::Random(d)) => d.to_string(),
            Err(_) => "-".to_string(),
        };
        Self {
            name: truncate_str(&variable.name, 24),
            mode: variable.mode.to_string(),
            value,
        }
    }
}

pub fn run(args: ReportArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let session = SessionCodec::from_config(&config)
        .decode(&args.input)
        .ok_or_else(|| miette::miette!("Session not found"))?;

    if print_structured(&session, global.format)? {
        return Ok(());
    }

    print!("{}", render_report(&session));
    Ok(())
}

/// Text report of a decoded session
pub fn render_report(session: &LabSession) -> String {
    let mut out = String::new();
    let rule = style("─".repeat(60)).dim().to_string();

    out.push_str(&format!("{}\n", rule));
    if let Some(ref title) = session.title {
        out.push_str(&format!("{}: {}\n", style("Title").bold(), style(title).yellow()));
    }
    out.push_str(&format!(
        "{}: {}\n",
        style("Formula").bold(),
        style(&session.formula).cyan()
    ));
    out.push_str(&format!("{}: {}\n", style("Samples").bold(), session.sample_count));
    if let Some(ref band) = session.tolerance_band {
        out.push_str(&format!(
            "{}: [{}, {}]\n",
            style("Tolerance band").bold(),
            format_value(band.lower),
            format_value(band.upper)
        ));
    }
    if let Some(seed) = session.seed {
        out.push_str(&format!("{}: {}\n", style("Seed").bold(), seed));
    }
    out.push_str(&format!("{}\n", rule));

    if !session.variables.is_empty() {
        let rows: Vec<VariableRow> = session.variables.iter().map(VariableRow::from).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        out.push_str(&format!("{}\n", table));
    }

    match session.results() {
        Some(result) => {
            out.push('\n');
            out.push_str(&render_summary(result, session.tolerance_band.as_ref()));
        }
        None => {
            out.push_str(&format!("\n{}\n", style("Not yet run").dim()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SimulationOptions;
    use crate::entities::Distribution;

    #[test]
    fn test_report_shows_inputs_and_results() {
        console::set_colors_enabled(false);
        let mut session = LabSession::new("L / d", 500)
            .with_title("Beam")
            .with_variable(Variable::fixed("L", 10.0))
            .with_variable(Variable::distributed(
                "d",
                Distribution::Uniform { min: 1.0, max: 2.0 },
            ))
            .with_tolerance_band(6.0, 8.0)
            .with_seed(7);

        let text = render_report(&session);
        assert!(text.contains("Title: Beam"));
        assert!(text.contains("Formula: L / d"));
        assert!(text.contains("Tolerance band: [6, 8]"));
        assert!(text.contains("NAME"));
        assert!(text.contains("uniform(1, 2)"));
        assert!(text.contains("Not yet run"));

        session.run(&SimulationOptions::default()).unwrap();
        let text = render_report(&session);
        assert!(text.contains("500 samples"));
        assert!(text.contains("Pass rate"));
    }
}
