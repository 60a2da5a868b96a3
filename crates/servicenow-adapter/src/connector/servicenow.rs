//! ServiceNow table API connector
//!
//! - GET  `{url}/api/now/table/{table}?sysparm_limit=1`
//! - POST `{url}/api/now/table/{table}`
//!
//! Both requests use HTTP basic auth and ask for JSON.

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder};
use std::fmt;
use std::time::Duration;
use zeroize::Zeroizing;

use super::{Connector, RawResponse};
use crate::config::AdapterProperties;
use crate::error::TransportError;

/// Resolved connector settings
#[derive(Clone)]
pub struct ConnectorConfig {
    /// Instance base URL, without trailing slash
    pub url: String,

    /// Basic auth user
    pub username: String,

    /// Basic auth password
    pub password: Zeroizing<String>,

    /// Table name
    pub service_now_table: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,

    /// Body sent when creating a record
    pub create_payload: serde_json::Value,
}

impl ConnectorConfig {
    /// Resolve connector settings from adapter properties
    pub fn from_properties(props: &AdapterProperties) -> Self {
        Self {
            url: props.url.trim_end_matches('/').to_string(),
            username: props.auth.username.clone(),
            password: Zeroizing::new(props.auth.password.clone()),
            service_now_table: props.service_now_table.clone(),
            timeout_ms: 10_000,
            create_payload: serde_json::json!({}),
        }
    }

    /// Table API endpoint
    pub fn table_url(&self) -> String {
        format!("{}/api/now/table/{}", self.url, self.service_now_table)
    }
}

impl fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("service_now_table", &self.service_now_table)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// `reqwest` backed connector for one ServiceNow table
#[derive(Debug, Clone)]
pub struct ServiceNowConnector {
    client: Client,
    config: ConnectorConfig,
}

impl ServiceNowConnector {
    /// Create a new connector
    pub fn new(config: ConnectorConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TransportError::client(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Connector configuration
    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .basic_auth(&self.config.username, Some(self.config.password.as_str()))
            .header(header::ACCEPT, "application/json")
    }

    async fn send(&self, builder: RequestBuilder) -> Result<RawResponse, TransportError> {
        let response = self.request(builder).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(RawResponse::new(status.as_u16(), body))
        } else {
            tracing::debug!(
                status = status.as_u16(),
                table = %self.config.service_now_table,
                "ServiceNow returned non-success status"
            );
            Err(TransportError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl Connector for ServiceNowConnector {
    async fn get(&self) -> Result<RawResponse, TransportError> {
        let builder = self
            .client
            .get(self.config.table_url())
            .query(&[("sysparm_limit", "1")]);
        self.send(builder).await
    }

    async fn post(&self) -> Result<RawResponse, TransportError> {
        let builder = self
            .client
            .post(self.config.table_url())
            .json(&self.config.create_payload);
        self.send(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;

    fn properties(url: &str) -> AdapterProperties {
        AdapterProperties::new(url, Credentials::new("admin", "pw"), "change_request")
    }

    #[test]
    fn test_table_url() {
        let config = ConnectorConfig::from_properties(&properties("https://dev12345.service-now.com/"));
        assert_eq!(
            config.table_url(),
            "https://dev12345.service-now.com/api/now/table/change_request"
        );
    }

    #[test]
    fn test_config_debug_redacts_password() {
        let config = ConnectorConfig::from_properties(&properties("https://dev12345.service-now.com"));
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("\"pw\""));
    }

    #[test]
    fn test_connector_builds() {
        let config = ConnectorConfig::from_properties(&properties("https://dev12345.service-now.com"));
        let connector = ServiceNowConnector::new(config).unwrap();
        assert_eq!(connector.config().username, "admin");
    }
}
