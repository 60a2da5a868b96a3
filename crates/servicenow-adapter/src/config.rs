//! Adapter configuration
//!
//! Properties are handed over by the host as `{url, auth:{username,password},
//! serviceNowTable}`. They can also be read from a JSON/YAML file or from the
//! process environment.
//!
//! Environment variables:
//! - `SERVICENOW_URL`: instance base URL
//! - `SERVICENOW_USERNAME` / `SERVICENOW_PASSWORD`: basic auth credentials
//! - `SERVICENOW_TABLE`: table name (default `change_request`)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{AdapterError, Result};

/// Default table the adapter is scoped to
pub const DEFAULT_TABLE: &str = "change_request";

/// Basic auth credentials for the ServiceNow instance
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Adapter instance properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterProperties {
    /// ServiceNow instance URL
    pub url: String,

    /// Instance credentials
    pub auth: Credentials,

    /// Change request table name
    #[serde(rename = "serviceNowTable", alias = "service_now_table", default = "default_table")]
    pub service_now_table: String,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl AdapterProperties {
    pub fn new(url: impl Into<String>, auth: Credentials, table: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth,
            service_now_table: table.into(),
        }
    }

    /// Load properties from the process environment
    pub fn from_env() -> Result<Self> {
        let url = require_env("SERVICENOW_URL")?;
        let username = require_env("SERVICENOW_USERNAME")?;
        let password = std::env::var("SERVICENOW_PASSWORD").unwrap_or_default();
        let table = std::env::var("SERVICENOW_TABLE").unwrap_or_else(|_| default_table());

        let props = Self::new(url, Credentials::new(username, password), table);
        props.validate()?;
        Ok(props)
    }

    /// Load properties from a JSON or YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AdapterError::config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        let props: Self = if is_yaml {
            serde_yaml::from_str(&content)
                .map_err(|e| AdapterError::config(format!("YAML error: {}", e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| AdapterError::config(format!("JSON error: {}", e)))?
        };

        props.validate()?;
        Ok(props)
    }

    /// Reject properties the connector cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(AdapterError::config("url must not be empty"));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(AdapterError::config(format!(
                "url must start with http:// or https://, got '{}'",
                self.url
            )));
        }
        if self.auth.username.trim().is_empty() {
            return Err(AdapterError::config("auth.username must not be empty"));
        }
        if self.service_now_table.trim().is_empty() {
            return Err(AdapterError::config("serviceNowTable must not be empty"));
        }
        Ok(())
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| AdapterError::config(format!("{} is not set", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn props(url: &str, username: &str, table: &str) -> AdapterProperties {
        AdapterProperties::new(url, Credentials::new(username, "secret"), table)
    }

    #[test]
    fn test_deserialize_host_shape() {
        let props: AdapterProperties = serde_json::from_str(
            r#"{
                "url": "https://dev12345.service-now.com",
                "auth": {"username": "admin", "password": "pw"},
                "serviceNowTable": "change_request"
            }"#,
        )
        .unwrap();

        assert_eq!(props.url, "https://dev12345.service-now.com");
        assert_eq!(props.auth.username, "admin");
        assert_eq!(props.auth.password, "pw");
        assert_eq!(props.service_now_table, "change_request");
    }

    #[test]
    fn test_table_defaults() {
        let props: AdapterProperties = serde_json::from_str(
            r#"{"url": "https://x.service-now.com", "auth": {"username": "a", "password": "b"}}"#,
        )
        .unwrap();
        assert_eq!(props.service_now_table, DEFAULT_TABLE);
    }

    #[test]
    fn test_password_is_redacted() {
        let props = props("https://x.service-now.com", "admin", "change_request");
        let debug = format!("{:?}", props);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));

        let json = serde_json::to_string(&props).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_validate() {
        assert!(props("https://x.service-now.com", "admin", "change_request")
            .validate()
            .is_ok());
        assert!(props("", "admin", "change_request").validate().is_err());
        assert!(props("x.service-now.com", "admin", "change_request")
            .validate()
            .is_err());
        assert!(props("https://x.service-now.com", "", "change_request")
            .validate()
            .is_err());
        assert!(props("https://x.service-now.com", "admin", " ")
            .validate()
            .is_err());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "url: https://dev12345.service-now.com\nauth:\n  username: admin\n  password: pw\nserviceNowTable: change_request"
        )
        .unwrap();

        let props = AdapterProperties::from_file(file.path()).unwrap();
        assert_eq!(props.auth.username, "admin");
    }

    #[test]
    fn test_from_file_rejects_incomplete() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"url": "", "auth": {{"username": "admin", "password": "pw"}}}}"#
        )
        .unwrap();

        let err = AdapterProperties::from_file(file.path()).unwrap_err();
        assert!(matches!(err, AdapterError::Config(_)));
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("SERVICENOW_URL", "https://dev12345.service-now.com");
        std::env::set_var("SERVICENOW_USERNAME", "admin");
        std::env::set_var("SERVICENOW_PASSWORD", "pw");
        std::env::remove_var("SERVICENOW_TABLE");

        let props = AdapterProperties::from_env().unwrap();
        assert_eq!(props.url, "https://dev12345.service-now.com");
        assert_eq!(props.service_now_table, DEFAULT_TABLE);

        std::env::remove_var("SERVICENOW_URL");
        std::env::remove_var("SERVICENOW_USERNAME");
        std::env::remove_var("SERVICENOW_PASSWORD");
    }
}
