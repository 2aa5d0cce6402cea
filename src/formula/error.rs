//! Formula errors with source spans for miette diagnostics

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Errors raised while compiling or evaluating a formula
#[derive(Debug, Error, Diagnostic)]
pub enum FormulaError {
    #[error("Formula is empty")]
    #[diagnostic(
        code(sanity_lab::formula::empty),
        help("enter an expression such as `L / d`")
    )]
    Empty,

    #[error("Unexpected character '{found}' in formula")]
    #[diagnostic(
        code(sanity_lab::formula::character),
        help("formulas may only use numbers, variable names, + - * / ^, parentheses and commas")
    )]
    UnexpectedCharacter {
        found: char,
        #[source_code]
        src: String,
        #[label("not allowed here")]
        span: SourceSpan,
    },

    #[error("Malformed number '{text}'")]
    #[diagnostic(code(sanity_lab::formula::number))]
    InvalidNumber {
        text: String,
        #[source_code]
        src: String,
        #[label("cannot be read as a number")]
        span: SourceSpan,
    },

    #[error("Unexpected {found}, expected {expected}")]
    #[diagnostic(code(sanity_lab::formula::syntax))]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        #[source_code]
        src: String,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("Formula ended unexpectedly, expected {expected}")]
    #[diagnostic(code(sanity_lab::formula::syntax))]
    UnexpectedEnd {
        expected: &'static str,
        #[source_code]
        src: String,
        #[label("input ends here")]
        span: SourceSpan,
    },

    #[error("Undeclared variable '{name}'")]
    #[diagnostic(
        code(sanity_lab::formula::undeclared),
        help("declare it in the session's variables or fix the spelling")
    )]
    UndeclaredVariable {
        name: String,
        #[source_code]
        src: String,
        #[label("not a declared variable")]
        span: SourceSpan,
    },

    #[error("Unknown function '{name}'")]
    #[diagnostic(
        code(sanity_lab::formula::function),
        help("available: sqrt abs sin cos tan asin acos atan sinh cosh tanh exp log ln log10 log2 floor ceil round min max pow atan2 hypot")
    )]
    UnknownFunction {
        name: String,
        #[source_code]
        src: String,
        #[label("unknown function")]
        span: SourceSpan,
    },

    #[error("Function '{name}' takes {expected} argument(s), got {found}")]
    #[diagnostic(code(sanity_lab::formula::arity))]
    WrongArity {
        name: String,
        expected: usize,
        found: usize,
        #[source_code]
        src: String,
        #[label("called here")]
        span: SourceSpan,
    },

    #[error("Formula nests deeper than {limit} levels")]
    #[diagnostic(
        code(sanity_lab::formula::depth),
        help("remove redundant parentheses or signs, or split the expression")
    )]
    TooDeep {
        limit: usize,
        #[source_code]
        src: String,
        #[label("nesting limit reached here")]
        span: SourceSpan,
    },

    #[error("Formula produced a non-finite value ({value}) at sample {iteration}")]
    #[diagnostic(
        code(sanity_lab::formula::non_finite),
        help("check for division by zero or functions evaluated outside their domain")
    )]
    NonFinite { iteration: u32, value: f64 },
}

impl FormulaError {
    /// Name of the undeclared variable, if this is an undeclared-variable error
    pub fn undeclared_name(&self) -> Option<&str> {
        match self {
            FormulaError::UndeclaredVariable { name, .. } => Some(name),
            _ => None,
        }
    }

    /// True if the error was detected before any evaluation took place
    pub fn is_compile_time(&self) -> bool {
        !matches!(self, FormulaError::NonFinite { .. })
    }
}
