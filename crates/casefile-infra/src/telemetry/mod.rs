//! Telemetry initialization
//!
//! A `tracing-subscriber` registry with an `EnvFilter` and a fmt layer, either
//! human-readable or JSON.

mod init_basic;

pub use init_basic::{init_telemetry, shutdown_telemetry, TelemetryFormat};
