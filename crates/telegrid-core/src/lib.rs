//! telegrid_core - reactive cell store, live subscriptions, channel contract.

pub mod error;
pub mod grid;
pub mod live;

pub use error::{Result, TelegridError};
pub use grid::{Cell, Grid, GridEngine};
pub use live::{MetricUpdate, SubscriptionRegistry};

pub use telegrid_engine::engine::{CellRef, CellValue};
