//! Grid engine state.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use telegrid_engine::engine::CellRef;

use super::cell::Grid;
use crate::live::SubscriptionRegistry;

/// Reject absurdly large entries before they reach the parser.
pub(crate) const MAX_FORMULA_BYTES: usize = 64 * 1024;

/// Reactive cell-evaluation engine.
///
/// Owns the authoritative cell table, the reverse dependency map, and the
/// live-metric subscription registry; all three are constructed and torn
/// down together and never shared across engine instances. All mutation goes
/// through `&mut self`, so no two writes can interleave mid-computation.
pub struct GridEngine {
    /// The cell table (DashMap is internally Arc-based, clones are cheap).
    pub(crate) grid: Grid,
    /// Reverse dependency map: cell -> cells whose formulas reference it.
    pub(crate) dependents: HashMap<CellRef, HashSet<CellRef>>,
    /// Live-metric subscriptions for this engine instance.
    pub(crate) subscriptions: SubscriptionRegistry,
    /// Monotonic write counter; every cell write is stamped with it so
    /// readers can compare versions instead of copying the table.
    pub(crate) revision: u64,
    /// Set on disposal: later pushes are dropped and edits rejected.
    pub(crate) disposed: bool,
}

impl GridEngine {
    /// Create an empty engine. Side-effect free.
    pub fn new() -> Self {
        GridEngine {
            grid: Arc::new(DashMap::new()),
            dependents: HashMap::new(),
            subscriptions: SubscriptionRegistry::new(),
            revision: 0,
            disposed: false,
        }
    }

    /// Shared handle to the cell table for read-side consumers.
    pub fn cells(&self) -> Grid {
        self.grid.clone()
    }

    /// Store revision of the most recent write.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Read-only view of the subscription registry.
    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.subscriptions
    }

    /// Release the channel-handler side of the engine: all subscriptions are
    /// discarded, and any push or edit arriving afterwards is rejected. The
    /// cell table needs no further teardown.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.subscriptions.clear();
        tracing::debug!("grid engine disposed");
    }

    /// Rebuild the reverse dependency map from the grid.
    /// Call after any cell's formula changes.
    pub(crate) fn rebuild_dependents(&mut self) {
        self.dependents.clear();
        for entry in self.grid.iter() {
            let cell_ref = entry.key();
            for dep in &entry.value().depends_on {
                self.dependents
                    .entry(dep.clone())
                    .or_default()
                    .insert(cell_ref.clone());
            }
        }
    }

    pub(crate) fn stamp(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }
}

impl Default for GridEngine {
    fn default() -> Self {
        Self::new()
    }
}
