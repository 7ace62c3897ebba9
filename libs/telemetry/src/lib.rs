//! Logging and metrics bootstrap shared by streamhook binaries.

mod config;
mod metrics;
mod tracing_init;

pub use config::{TelemetryConfig, TelemetryProtocol};
pub use metrics::{EVENTS_COUNTER, record_event};
pub use tracing_init::init_telemetry;
