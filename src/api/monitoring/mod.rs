// Monitoring Module
//
// Comprehensive metrics collection, monitoring, and observability API

pub mod alerts;
pub mod dashboard_api;
pub mod dashboard_types;
pub mod health;
pub mod metrics_core;
pub mod metrics_registry;
pub mod prometheus;
pub mod websocket_metrics;

// Re-export main types and functions
pub use alerts::*;
pub use dashboard_api::*;
pub use dashboard_types::*;
pub use health::*;
pub use metrics_core::*;
pub use metrics_registry::*;
pub use prometheus::*;
pub use websocket_metrics::*;
