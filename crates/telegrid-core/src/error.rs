//! Error types for the telegrid core.

use thiserror::Error;

/// Errors surfaced by the public grid API.
///
/// Evaluation faults are never errors here: they land inside the cell as
/// error values, and one cell's fault never blocks another cell.
#[derive(Error, Debug)]
pub enum TelegridError {
    #[error("Invalid cell reference: {0}")]
    InvalidCellRef(String),

    #[error("Engine has been disposed")]
    EngineDisposed,
}

pub type Result<T> = std::result::Result<T, TelegridError>;
