//! Live metric bindings: subscription registry and channel contract.

mod channel;
mod registry;

pub use channel::{METRICS_UPDATE, MetricUpdate, decode_envelope};
pub use registry::SubscriptionRegistry;
