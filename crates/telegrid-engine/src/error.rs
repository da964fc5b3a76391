//! Formula error types.

use thiserror::Error;

/// Result type for formula operations.
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors raised while parsing or evaluating a formula body.
///
/// These never cross the evaluation surface as `Err`: the evaluator folds
/// every one of them into an in-cell error value.
#[derive(Debug, Error)]
pub enum FormulaError {
    #[error("syntax error: {0}")]
    Parse(String),

    #[error("unknown identifier: {0}")]
    UnknownIdentifier(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("{0}")]
    Eval(String),
}
