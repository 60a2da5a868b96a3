//! Error types for the ServiceNow adapter
//!
//! Transport failures are kept apart from adapter-level classification so a
//! hibernating instance or an unreadable payload is never confused with a
//! network problem.

use serde::Serialize;
use thiserror::Error;

/// Failures reported by a transport connector
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportError {
    /// Connection, DNS, TLS or timeout failure
    #[error("Network error: {message}")]
    Network { message: String },

    /// Remote answered with a non-success status
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// HTTP client could not be built
    #[error("Client error: {message}")]
    Client { message: String },
}

impl TransportError {
    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        TransportError::Network {
            message: message.into(),
        }
    }

    /// Create a client construction error
    pub fn client(message: impl Into<String>) -> Self {
        TransportError::Client {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => TransportError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            },
            None => TransportError::network(err.to_string()),
        }
    }
}

/// Main error type for adapter operations
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AdapterError {
    /// Transport connector reported a failure
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Instance answered with its hibernation page
    #[error("ServiceNow instance is hibernating")]
    Hibernating,

    /// Response was not the expected record set envelope
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Probe did not complete in time
    #[error("Probe {probe} timed out after {timeout_ms}ms")]
    Timeout { probe: String, timeout_ms: u64 },

    /// Incomplete or unreadable adapter configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AdapterError {
    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        AdapterError::MalformedResponse(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        AdapterError::Config(msg.into())
    }

    /// Whether the remote instance should be reported as unavailable
    pub fn marks_offline(&self) -> bool {
        !matches!(self, AdapterError::Config(_))
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        AdapterError::MalformedResponse(format!("JSON error: {}", err))
    }
}

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, AdapterError>;
