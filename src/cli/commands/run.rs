//! `sanity-lab run` command - Monte Carlo simulation of a session

use console::style;
use miette::{IntoDiagnostic, Result};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::helpers::{load_config, load_session, save_session};
use crate::cli::output::{effective_format, print_structured, render_summary};
use crate::cli::viz::{render_histogram, render_range_bar};
use crate::cli::GlobalOpts;
use crate::engine::{SimulationOptions, SimulationPanel};
use crate::entities::{LabSession, SimulationResult};

const BACKGROUND_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Session file to run
    pub path: PathBuf,

    /// Override the session's sample count
    #[arg(long, short = 'n')]
    pub samples: Option<u32>,

    /// Seed for a reproducible run (overrides the session seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Show ASCII histogram of the output distribution
    #[arg(long, short = 'H')]
    pub histogram: bool,

    /// Number of histogram bins (default from config)
    #[arg(long)]
    pub bins: Option<usize>,

    /// Output raw samples as CSV (for external analysis)
    #[arg(long)]
    pub csv: bool,

    /// Run on the background simulation worker
    #[arg(long)]
    pub background: bool,

    /// Write the results back into the session file
    #[arg(long)]
    pub save: bool,
}

pub fn run(args: RunArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let mut session = load_session(&args.path)?;
    if let Some(samples) = args.samples {
        session.sample_count = samples;
    }

    let options = SimulationOptions {
        seed: args.seed,
        retain_samples: args.histogram || args.csv,
        limits: config.limits(),
    };

    let result = if args.background {
        run_in_background(&mut session, &options)?
    } else {
        session.run(&options)?.clone()
    };

    if args.save {
        save_session(&args.path, &session.without_samples())?;
        tracing::info!(path = %args.path.display(), "saved results");
    }

    if args.csv {
        return write_csv(&result);
    }

    let format = effective_format(global.format);
    if print_structured(&result.without_samples(), format)? {
        return Ok(());
    }

    let title = session
        .title
        .clone()
        .unwrap_or_else(|| args.path.display().to_string());
    println!(
        "{} {} {}",
        style("✓").green(),
        style(&title).cyan(),
        style(format!("= {}", session.formula)).dim()
    );
    print!("{}", render_summary(&result, session.tolerance_band.as_ref()));

    if let Some(ref band) = session.tolerance_band {
        println!();
        println!("{}", render_range_bar(result.min, result.max, band));
    }

    if args.histogram {
        if let Some(ref samples) = result.samples {
            let bins = args.bins.unwrap_or(config.histogram_bins);
            println!();
            print!(
                "{}",
                render_histogram(samples, bins, session.tolerance_band.as_ref())
            );
        }
    }

    if args.save {
        println!();
        println!(
            "{} Saved results to {}",
            style("✓").green(),
            style(args.path.display()).cyan()
        );
    }
    Ok(())
}

fn run_in_background(
    session: &mut LabSession,
    options: &SimulationOptions,
) -> Result<SimulationResult> {
    let mut panel = SimulationPanel::new().into_diagnostic()?;
    let seq = panel
        .submit(session.request(), session.options_for(options))
        .into_diagnostic()?;
    tracing::debug!(seq, "submitted background simulation");

    session.clear_results();
    let outcome = panel
        .wait_latest(BACKGROUND_TIMEOUT)
        .ok_or_else(|| miette::miette!("Background simulation produced no result"))?;
    let result = outcome?;
    Ok(session.store_results(result).clone())
}

fn write_csv(result: &SimulationResult) -> Result<()> {
    let samples = result.samples.as_deref().unwrap_or_default();
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record(["sample", "value"]).into_diagnostic()?;
    for (i, value) in samples.iter().enumerate() {
        writer
            .write_record([(i + 1).to_string(), value.to_string()])
            .into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}
