//! Store operations: edits, reads, and single-hop dependent refresh.

use telegrid_engine::engine::{
    CellRef, CellValue, Evaluation, evaluate_formula, extract_references,
};

use super::cell::Cell;
use super::state::{GridEngine, MAX_FORMULA_BYTES};
use crate::error::{Result, TelegridError};

impl GridEngine {
    /// Current value of `id`, or `Empty` when no such cell exists.
    pub fn cell_value(&self, id: &str) -> Result<CellValue> {
        let cell_ref = parse_id(id)?;
        Ok(self
            .grid
            .get(&cell_ref)
            .map(|c| c.value.clone())
            .unwrap_or(CellValue::Empty))
    }

    /// Stored entry text of `id`, or None when no such cell exists.
    pub fn cell_formula(&self, id: &str) -> Result<Option<String>> {
        let cell_ref = parse_id(id)?;
        Ok(self.grid.get(&cell_ref).map(|c| c.formula.clone()))
    }

    /// Commit a cell edit and refresh its direct dependents.
    ///
    /// Empty input deletes the cell (and drops any live binding). Input not
    /// starting with `=` is stored as a literal. A formula is evaluated
    /// against the store as it existed before this write - unless it carries
    /// a live directive, in which case the cell is subscribed and holds the
    /// empty placeholder until the first push. After the commit, every other
    /// cell whose dependency list names the edited id is re-evaluated exactly
    /// once (live cells excepted). One hop only: cells further downstream
    /// keep their values until their own precedents are re-saved.
    ///
    /// Evaluation faults are committed as in-cell error values; `Err` is
    /// returned only for malformed ids and use after disposal.
    pub fn set_cell_formula(&mut self, id: &str, text: &str) -> Result<()> {
        if self.disposed {
            return Err(TelegridError::EngineDisposed);
        }
        let cell_ref = parse_id(id)?;
        let trimmed = text.trim();

        if trimmed.is_empty() {
            self.delete_cell(&cell_ref);
            return Ok(());
        }

        let cell = self.build_cell(&cell_ref, trimmed);
        self.commit(cell_ref.clone(), cell);
        self.recompute_dependents(&cell_ref);
        Ok(())
    }

    fn build_cell(&mut self, cell_ref: &CellRef, trimmed: &str) -> Cell {
        // Any previous live binding is dropped on reassignment; the liveness
        // check on the push side still guards deliveries already in flight.
        self.unsubscribe_existing(cell_ref);

        if trimmed.len() > MAX_FORMULA_BYTES {
            return Cell::computed(
                trimmed,
                CellValue::Error("entry exceeds size limit".to_string()),
                Vec::new(),
            );
        }

        let Some(body) = trimmed.strip_prefix('=') else {
            return Cell::literal(trimmed);
        };

        let outcome = evaluate_formula(body, |r| self.grid.get(r).map(|c| c.value.clone()));
        match outcome {
            Evaluation::Live(metric) => {
                self.subscriptions.subscribe(&metric, cell_ref.clone());
                tracing::debug!(cell = %cell_ref, metric = %metric, "live binding registered");
                Cell::live(trimmed, metric)
            }
            Evaluation::Value(value) => Cell::computed(trimmed, value, extract_references(body)),
        }
    }

    fn commit(&mut self, cell_ref: CellRef, mut cell: Cell) {
        cell.version = self.stamp();
        self.grid.insert(cell_ref, cell);
        self.rebuild_dependents();
    }

    fn delete_cell(&mut self, cell_ref: &CellRef) {
        self.unsubscribe_existing(cell_ref);
        if self.grid.remove(cell_ref).is_some() {
            self.stamp();
            self.rebuild_dependents();
            self.recompute_dependents(cell_ref);
        }
    }

    fn unsubscribe_existing(&mut self, cell_ref: &CellRef) {
        let metric = self.grid.get(cell_ref).and_then(|c| c.live_metric.clone());
        if let Some(metric) = metric {
            self.subscriptions.unsubscribe(&metric, cell_ref);
            tracing::debug!(cell = %cell_ref, metric = %metric, "live binding dropped");
        }
    }

    /// Re-evaluate every cell whose recorded dependencies include `edited`,
    /// exactly once, against the store as it stands when its turn comes.
    /// Live cells are skipped: their values come only from pushes.
    fn recompute_dependents(&mut self, edited: &CellRef) {
        let mut targets: Vec<CellRef> = match self.dependents.get(edited) {
            Some(set) => set.iter().cloned().collect(),
            None => return,
        };
        // Deterministic refresh order.
        targets.sort_by(|a, b| (a.row, a.col).cmp(&(b.row, b.col)));

        for target in targets {
            if target == *edited {
                // The edited cell itself keeps its committed value.
                continue;
            }
            let Some((formula, live)) = self
                .grid
                .get(&target)
                .map(|c| (c.formula.clone(), c.is_live()))
            else {
                continue;
            };
            if live {
                continue;
            }
            let Some(body) = formula.strip_prefix('=') else {
                // Literals record no dependencies; nothing to refresh.
                continue;
            };

            let outcome = evaluate_formula(body, |r| self.grid.get(r).map(|c| c.value.clone()));
            let value = match outcome {
                Evaluation::Value(value) => value,
                // A cell cannot become live without being re-saved.
                Evaluation::Live(_) => continue,
            };

            let version = self.stamp();
            if let Some(mut cell) = self.grid.get_mut(&target) {
                cell.value = value;
                cell.version = version;
            }
        }
    }
}

fn parse_id(id: &str) -> Result<CellRef> {
    CellRef::from_str(id.trim()).ok_or_else(|| TelegridError::InvalidCellRef(id.to_string()))
}
