//! Casefile Infrastructure Library
//!
//! Shared infrastructure for Casefile binaries:
//! - Telemetry initialization (tracing subscriber)
//! - Tracing-backed audit sink
//! - Client-facing error responses

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "audit")]
pub mod audit;

pub mod error;

// Re-export commonly used types
#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry, TelemetryFormat};

#[cfg(feature = "audit")]
pub use audit::{TracingAuditSink, AUDIT_TARGET};

pub use error::ErrorResponse;
