//! `sanity-lab new` command - write a starter session file

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{load_config, save_session};
use crate::cli::GlobalOpts;
use crate::entities::{Distribution, LabSession, Variable};

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Where to write the session file
    pub path: PathBuf,

    /// Session title
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Starter session: a beam length divided by a uniformly distributed depth
pub fn starter_session(sample_count: u32) -> LabSession {
    LabSession::new("L / d", sample_count)
        .with_variable(Variable::fixed("L", 10.0))
        .with_variable(Variable::distributed(
            "d",
            Distribution::Uniform { min: 1.0, max: 2.0 },
        ))
        .with_tolerance_band(6.0, 8.0)
}

pub fn run(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    if args.path.exists() && !args.force {
        return Err(miette::miette!(
            "{} already exists (use --force to overwrite)",
            args.path.display()
        ));
    }

    let config = load_config(global)?;
    let mut session = starter_session(config.default_sample_count);
    session.title = args.title;

    save_session(&args.path, &session)?;
    tracing::info!(path = %args.path.display(), "wrote starter session");

    println!(
        "{} Created session {}",
        style("✓").green(),
        style(args.path.display()).cyan()
    );
    println!(
        "   Edit it, then try {}",
        style(format!("sanity-lab run {}", args.path.display())).yellow()
    );
    Ok(())
}
