//! `sanity-lab share` command - encode a session for sharing

use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{load_config, load_session};
use crate::cli::output::print_structured;
use crate::cli::GlobalOpts;
use crate::codec::{share_link, SessionCodec};

#[derive(clap::Args, Debug)]
pub struct ShareArgs {
    /// Session file to share
    pub path: PathBuf,

    /// Base URL for a full share link (default from config)
    #[arg(long)]
    pub base_url: Option<String>,
}

#[derive(serde::Serialize)]
struct ShareOutput {
    payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<String>,
}

pub fn run(args: ShareArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let session = load_session(&args.path)?;
    session.validate(&config.limits())?;

    let payload = SessionCodec::from_config(&config).encode(&session);
    if payload.is_empty() {
        return Err(miette::miette!("Failed to encode {}", args.path.display()));
    }

    let link = args
        .base_url
        .or(config.share_base_url)
        .map(|base| share_link(&base, &payload));

    let output = ShareOutput { payload, link };
    if print_structured(&output, global.format)? {
        return Ok(());
    }

    println!("{}", output.link.as_deref().unwrap_or(&output.payload));
    Ok(())
}
