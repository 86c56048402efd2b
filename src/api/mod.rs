//! API layer
//!
//! HTTP handlers for:
//! - The JSON API under `/v1`
//! - Metrics (Prometheus)

mod converters;
mod dto;
pub mod metrics;
mod v1;

pub use converters::*;
pub use dto::*;

pub use metrics::metrics_router;
pub use v1::v1_router;
