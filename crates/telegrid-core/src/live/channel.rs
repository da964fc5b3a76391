//! Streaming channel message contract.
//!
//! The transport is external; only the envelope shape is consumed here. A
//! metric update arrives as `{"type": "metrics:update", "payload": {"name":
//! string, "value": number}}`; every other type or malformed payload is
//! ignored without raising. Delivery is at-least-once and ordered per metric
//! only, so the store applies "last write observed wins" per cell.

use serde::Deserialize;
use telegrid_engine::engine::CellValue;

use crate::grid::GridEngine;

/// Envelope type tag carrying metric updates.
pub const METRICS_UPDATE: &str = "metrics:update";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

/// A decoded metric update.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetricUpdate {
    pub name: String,
    pub value: f64,
}

/// Decode a raw channel message. Returns None for any other envelope type or
/// a malformed payload.
pub fn decode_envelope(raw: &str) -> Option<MetricUpdate> {
    let envelope: Envelope = match serde_json::from_str(raw) {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::debug!(%err, "ignoring undecodable channel message");
            return None;
        }
    };
    if envelope.kind != METRICS_UPDATE {
        tracing::debug!(kind = %envelope.kind, "ignoring channel message of foreign type");
        return None;
    }
    match serde_json::from_value(envelope.payload) {
        Ok(update) => Some(update),
        Err(err) => {
            tracing::debug!(%err, "ignoring malformed metrics payload");
            None
        }
    }
}

impl GridEngine {
    /// Entry point the streaming channel adapter drives; the engine holds
    /// exactly one such handler for its lifetime. Anything undecodable is
    /// dropped silently; after [`GridEngine::dispose`] every message is.
    pub fn handle_channel_message(&mut self, raw: &str) {
        if let Some(update) = decode_envelope(raw) {
            self.handle_metric_push(&update.name, update.value);
        }
    }

    /// Fan a metric value out to its subscribed cells.
    ///
    /// A subscriber that is no longer live (reassigned between subscription
    /// and delivery) is left untouched. Dependents of a live cell are not
    /// recomputed by a push; they refresh the next time they are re-saved.
    pub fn handle_metric_push(&mut self, metric: &str, value: f64) {
        if self.disposed {
            tracing::debug!(metric, "push dropped after disposal");
            return;
        }
        for cell_ref in self.subscriptions.subscribers(metric) {
            let Some(live) = self.grid.get(&cell_ref).map(|c| c.is_live()) else {
                continue;
            };
            if !live {
                tracing::debug!(cell = %cell_ref, metric, "stale subscriber left untouched");
                continue;
            }
            let version = self.stamp();
            if let Some(mut cell) = self.grid.get_mut(&cell_ref) {
                cell.value = CellValue::Number(value);
                cell.version = version;
            }
        }
    }
}
