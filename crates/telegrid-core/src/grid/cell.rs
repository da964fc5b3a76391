//! Cell records and grid storage.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use telegrid_engine::engine::{CellRef, CellValue};

/// The cell table (DashMap is internally Arc-based, clones are cheap and
/// share the same underlying cells).
pub type Grid = Arc<DashMap<CellRef, Cell>>;

/// A stored cell: the raw entry text, its resolved value, the references
/// recorded when the formula was parsed, and an optional live-metric binding.
///
/// A live cell never carries formula dependencies; its value is driven only
/// by pushes from the streaming channel.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    pub formula: String,
    pub value: CellValue,
    pub depends_on: Vec<CellRef>,
    pub live_metric: Option<String>,
    /// Store revision at which this record was last written.
    pub version: u64,
}

impl Cell {
    /// A literal entry: the text is both formula and value. Numeric-looking
    /// text becomes a number so dependent arithmetic can consume it.
    pub fn literal(text: &str) -> Cell {
        let value = match text.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(text.to_string()),
        };
        Cell {
            formula: text.to_string(),
            value,
            depends_on: Vec::new(),
            live_metric: None,
            version: 0,
        }
    }

    /// A computed formula cell.
    pub fn computed(formula: &str, value: CellValue, depends_on: Vec<CellRef>) -> Cell {
        Cell {
            formula: formula.to_string(),
            value,
            depends_on,
            live_metric: None,
            version: 0,
        }
    }

    /// A live-bound cell awaiting its first push. The empty value is the
    /// placeholder; the binding itself marks the cell as pending.
    pub fn live(formula: &str, metric: String) -> Cell {
        Cell {
            formula: formula.to_string(),
            value: CellValue::Empty,
            depends_on: Vec::new(),
            live_metric: Some(metric),
            version: 0,
        }
    }

    pub fn is_live(&self) -> bool {
        self.live_metric.is_some()
    }
}
