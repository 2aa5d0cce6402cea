//! Formula language - safe parsing and evaluation of user-entered expressions
//!
//! A formula is compiled once against the declared variable names, which
//! rejects anything outside the allowed grammar before a single sample is
//! drawn, and is then evaluated per sample against a slice of bindings.

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::{BinaryOp, Expr, Function};
pub use error::FormulaError;
pub use parser::{parse, MAX_NESTING_DEPTH};

/// A formula compiled against an ordered list of variable names
#[derive(Debug, Clone)]
pub struct CompiledFormula {
    source: String,
    expr: Expr,
    variable_count: usize,
}

impl CompiledFormula {
    /// Compile `source`; variable `i` of `variables` binds to slot `i`
    pub fn compile(source: &str, variables: &[&str]) -> Result<Self, FormulaError> {
        let expr = parse(source, variables)?;
        Ok(Self {
            source: source.to_string(),
            expr,
            variable_count: variables.len(),
        })
    }

    /// The formula text as written
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of bindings `evaluate` expects
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    /// Slots of the variables the formula actually uses
    pub fn referenced_slots(&self) -> Vec<usize> {
        let mut slots = Vec::new();
        self.expr.variables(&mut slots);
        slots
    }

    /// Evaluate with one binding per declared variable
    pub fn evaluate(&self, bindings: &[f64]) -> f64 {
        debug_assert_eq!(bindings.len(), self.variable_count);
        self.expr.eval(bindings)
    }
}
