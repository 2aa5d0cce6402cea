//! YAML error types with source-span diagnostics

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Failure reading or parsing a YAML document
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error("Failed to read file: {0}")]
    #[diagnostic(code(sanity_lab::yaml::io))]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("Failed to serialize YAML: {0}")]
    #[diagnostic(code(sanity_lab::yaml::serialize))]
    Serialize(String),
}

/// Parse error pointing at the offending location in the document
#[derive(Debug, Error, Diagnostic)]
#[error("Invalid YAML in {filename}: {message}")]
#[diagnostic(
    code(sanity_lab::yaml::syntax),
    help("Session files use snake_case keys: title, variables, formula, sample_count, tolerance_band, seed")
)]
pub struct YamlSyntaxError {
    pub filename: String,
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,

    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: Option<SourceSpan>,
}

impl YamlSyntaxError {
    pub fn from_serde_error(error: &serde_yml::Error, content: &str, filename: &str) -> Self {
        let location = error.location();
        let span = location.as_ref().map(|loc| {
            let offset = loc.index().min(content.len());
            let len = usize::from(offset < content.len());
            SourceSpan::from((offset, len))
        });

        Self {
            filename: filename.to_string(),
            message: strip_location_suffix(&error.to_string()),
            line: location.as_ref().map(|loc| loc.line()),
            column: location.as_ref().map(|loc| loc.column()),
            src: NamedSource::new(filename, content.to_string()),
            span,
        }
    }
}

// serde_yml appends " at line X column Y"; the label already shows it
fn strip_location_suffix(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}
