//! Observability: tracing initialization and metric recording.
//!
//! The cleanup worker records counters through the [`metrics`] facade;
//! whether anything collects them is up to the embedding process (e.g. a
//! Prometheus exporter installed by the server).

pub mod metrics;
mod tracing_init;

pub use tracing_init::{init_tracing, TracingError};
