//! Transport connector seam
//!
//! The adapter never builds HTTP requests itself. It talks to a [`Connector`]
//! which delivers raw responses or transport errors and knows how to spot a
//! hibernating instance.

mod servicenow;

pub use servicenow::{ConnectorConfig, ServiceNowConnector};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Marker text of the page served by a hibernating developer instance
pub const HIBERNATION_MARKER: &str = "Instance Hibernating page";

/// Raw response delivered by a connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResponse {
    /// HTTP status code
    pub status_code: u16,

    /// Response body, absent when the transport delivered no payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl RawResponse {
    /// Create a response with a body
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: Some(body.into()),
        }
    }

    /// Create a 200 response
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// Create a response without a body
    pub fn empty(status_code: u16) -> Self {
        Self {
            status_code,
            body: None,
        }
    }
}

/// Check a raw response for the hibernation page.
///
/// A hibernating instance still answers 200, with an HTML page instead of the
/// table API payload.
pub fn is_hibernation_page(response: &RawResponse) -> bool {
    match response.body.as_deref() {
        Some(body) => {
            response.status_code == 200 && body.contains(HIBERNATION_MARKER) && body.contains("<html>")
        }
        None => false,
    }
}

/// Transport to a single ServiceNow table
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connector: Send + Sync {
    /// Read records from the table
    async fn get(&self) -> Result<RawResponse, TransportError>;

    /// Create a record in the table
    async fn post(&self) -> Result<RawResponse, TransportError>;

    /// Whether the response is the hibernation page
    fn is_hibernating(&self, response: &RawResponse) -> bool {
        is_hibernation_page(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HIBERNATION_PAGE: &str =
        "<html><head><title>Instance Hibernating page</title></head><body></body></html>";

    #[test]
    fn test_detects_hibernation_page() {
        assert!(is_hibernation_page(&RawResponse::ok(HIBERNATION_PAGE)));
    }

    #[test]
    fn test_ignores_other_responses() {
        assert!(!is_hibernation_page(&RawResponse::ok(r#"{"result":[]}"#)));
        assert!(!is_hibernation_page(&RawResponse::new(503, HIBERNATION_PAGE)));
        assert!(!is_hibernation_page(&RawResponse::ok("Instance Hibernating page")));
        assert!(!is_hibernation_page(&RawResponse::empty(200)));
    }

    #[tokio::test]
    async fn test_mock_connector_reports_hibernation() {
        let mut connector = MockConnector::new();
        connector
            .expect_is_hibernating()
            .returning(is_hibernation_page);
        connector
            .expect_get()
            .returning(|| Ok(RawResponse::ok(HIBERNATION_PAGE)));

        let response = connector.get().await.unwrap();
        assert!(connector.is_hibernating(&response));
    }
}
