//! Live metric subscription registry.
//!
//! Maps external metric names to the set of cells bound to them. Owned by a
//! single grid engine instance and never shared across instances. Emptied
//! entries are pruned so transient bindings do not accumulate.

use std::collections::{HashMap, HashSet};

use telegrid_engine::engine::CellRef;

#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    subscribers: HashMap<String, HashSet<CellRef>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `cell` to `metric`'s subscriber set. Idempotent.
    pub fn subscribe(&mut self, metric: &str, cell: CellRef) {
        self.subscribers
            .entry(metric.to_string())
            .or_default()
            .insert(cell);
    }

    /// Remove `cell` from `metric`'s subscriber set, dropping the metric
    /// entry entirely once its set is empty.
    pub fn unsubscribe(&mut self, metric: &str, cell: &CellRef) {
        if let Some(set) = self.subscribers.get_mut(metric) {
            set.remove(cell);
            if set.is_empty() {
                self.subscribers.remove(metric);
            }
        }
    }

    /// Cells currently bound to `metric`.
    pub fn subscribers(&self, metric: &str) -> Vec<CellRef> {
        self.subscribers
            .get(metric)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of metrics with at least one subscriber.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn contains(&self, metric: &str) -> bool {
        self.subscribers.contains_key(metric)
    }

    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}
