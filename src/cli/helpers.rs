//! Shared helper functions for CLI commands

use miette::Result;
use std::path::Path;

use crate::cli::GlobalOpts;
use crate::core::LabConfig;
use crate::entities::LabSession;
use crate::yaml::{parse_yaml_file, write_yaml_file};

/// Load layered configuration, honouring `--config`
pub fn load_config(global: &GlobalOpts) -> Result<LabConfig> {
    Ok(LabConfig::load(global.config.as_deref())?)
}

/// Read and parse a session file (no semantic validation)
pub fn load_session(path: &Path) -> Result<LabSession> {
    if !path.exists() {
        return Err(miette::miette!("Session file not found: {}", path.display()));
    }
    Ok(parse_yaml_file(path)?)
}

/// Write a session file
pub fn save_session(path: &Path, session: &LabSession) -> Result<()> {
    Ok(write_yaml_file(path, session)?)
}

/// Format a statistic for display: up to six significant digits, no
/// trailing zeros
pub fn format_value(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{}", value);
    }
    let magnitude = value.abs().log10().floor() as i32;
    if !(-4..=9).contains(&magnitude) {
        return format!("{:.5e}", value);
    }
    let decimals = (5 - magnitude).max(0) as usize;
    let text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
