//! Cell value scalar shared by the evaluator and the store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved cell scalar.
///
/// `Empty` means "no value yet" and is distinct from the cell being absent
/// from the store. `Error` carries a short diagnostic and renders with the
/// `#ERR:` prefix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
    Error(String),
}

impl CellValue {
    /// Numeric view used by arithmetic: numbers pass through, text is
    /// accepted when it parses as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => {
                // Integral values print without a trailing ".0".
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Empty => Ok(()),
            CellValue::Error(msg) => write!(f, "#ERR: {}", msg),
        }
    }
}
