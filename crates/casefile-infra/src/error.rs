//! Client-facing error responses
//!
//! Built from anything implementing [`ErrorMetadata`]. In production, or for
//! sensitive errors, the detailed message is withheld.

use serde::Serialize;
use std::fmt::Display;

use casefile_core::ErrorMetadata;

/// Standard error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub code: String,
    pub status: u16,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    pub fn from_error<E>(error: &E, is_production: bool) -> Self
    where
        E: ErrorMetadata + Display,
    {
        let details = if is_production || error.is_sensitive() {
            None
        } else {
            Some(error.to_string())
        };

        Self {
            error: error.client_message(),
            details,
            code: error.error_code().to_string(),
            status: error.http_status_code(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
        }
    }
}
