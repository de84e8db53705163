//! # api-adapters
//!
//! The web routing layer for the complaint desk. Handlers translate HTTP
//! into service calls; everything else lives in `services`.

pub mod metrics;
#[cfg(feature = "web-axum")]
pub mod http;

pub use metrics::Metrics;
#[cfg(feature = "web-axum")]
pub use http::{router, AppState};
