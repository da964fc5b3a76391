//! telegrid_engine - formula parsing and sandboxed evaluation.

pub mod engine;
pub mod error;

pub use engine::{CellRef, CellValue, Evaluation};
pub use error::{FormulaError, FormulaResult};
