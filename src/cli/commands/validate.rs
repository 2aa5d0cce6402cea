//! `sanity-lab validate` command - check session files without running them

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{load_config, load_session};
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Session files to validate
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Continue after the first failing file
    #[arg(long)]
    pub keep_going: bool,
}

/// Validation statistics
#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_failed: usize,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let limits = config.limits();
    let mut stats = ValidationStats::default();

    for path in &args.paths {
        stats.files_checked += 1;

        let outcome = load_session(path)
            .and_then(|session| session.validate(&limits).map_err(miette::Report::new));

        match outcome {
            Ok(()) => {
                println!("{} {}", style("✓").green(), path.display());
            }
            Err(report) => {
                stats.files_failed += 1;
                println!("{} {}", style("✗").red(), path.display());
                eprintln!("{:?}", report);
                if !args.keep_going {
                    break;
                }
            }
        }
    }

    println!();
    if stats.files_failed > 0 {
        return Err(miette::miette!(
            "{} of {} session file(s) failed validation",
            stats.files_failed,
            stats.files_checked
        ));
    }

    println!(
        "{} {} session file(s) valid",
        style("✓").green().bold(),
        stats.files_checked
    );
    Ok(())
}
