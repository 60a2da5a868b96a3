//! ServiceNow Adapter Contracts
//!
//! Status events, probe results and health reports shared by the adapter,
//! its listeners and the CLI.

mod records;

pub use records::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::AdapterError;

/// Availability of the remote instance as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdapterStatus {
    /// Remote instance answered a probe
    Online,
    /// Remote instance is unreachable, hibernating or answered garbage
    Offline,
}

impl AdapterStatus {
    /// Event name broadcast to listeners
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterStatus::Online => "ONLINE",
            AdapterStatus::Offline => "OFFLINE",
        }
    }
}

impl fmt::Display for AdapterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event delivered to status listeners.
///
/// Serializes to the host payload `{ "id": ... }`; the status travels as the
/// event name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEvent {
    /// Event name
    #[serde(skip)]
    pub status: AdapterStatus,

    /// Emitting adapter instance
    pub id: String,
}

impl StatusEvent {
    pub fn new(status: AdapterStatus, id: impl Into<String>) -> Self {
        Self {
            status,
            id: id.into(),
        }
    }
}

/// Remote operation used as a proxy for availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    /// Read one record from the table
    Read,
    /// Create one record in the table
    Create,
}

impl ProbeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeKind::Read => "read",
            ProbeKind::Create => "create",
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How status events are emitted for one health check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionMode {
    /// Every probe emits its own event as soon as it completes
    #[default]
    PerProbe,
    /// One event per health check, ONLINE only if every probe succeeded
    Consolidated,
}

/// Health check options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckOptions {
    /// Probes to run, concurrently
    #[serde(default = "default_probes")]
    pub probes: Vec<ProbeKind>,

    /// Timeout per probe in milliseconds
    #[serde(default = "default_timeout")]
    pub probe_timeout_ms: u64,

    /// Event emission mode
    #[serde(default)]
    pub emission: EmissionMode,
}

impl Default for HealthCheckOptions {
    fn default() -> Self {
        Self {
            probes: default_probes(),
            probe_timeout_ms: default_timeout(),
            emission: EmissionMode::default(),
        }
    }
}

impl HealthCheckOptions {
    /// Only probe with a read
    pub fn read_only() -> Self {
        Self {
            probes: vec![ProbeKind::Read],
            ..Default::default()
        }
    }
}

fn default_probes() -> Vec<ProbeKind> {
    vec![ProbeKind::Read, ProbeKind::Create]
}

fn default_timeout() -> u64 {
    10_000
}

/// Outcome of a single probe
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    /// Probe that produced this result
    pub probe: ProbeKind,

    /// Status derived from the outcome
    pub status: AdapterStatus,

    /// Round trip latency in milliseconds
    pub latency_ms: u64,

    /// Normalized payload on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Failure on error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AdapterError>,

    /// Completion timestamp
    pub checked_at: DateTime<Utc>,
}

impl ProbeResult {
    /// Create online result
    pub fn online(probe: ProbeKind, latency_ms: u64, data: serde_json::Value) -> Self {
        Self {
            probe,
            status: AdapterStatus::Online,
            latency_ms,
            data: Some(data),
            error: None,
            checked_at: Utc::now(),
        }
    }

    /// Create offline result
    pub fn offline(probe: ProbeKind, latency_ms: u64, error: AdapterError) -> Self {
        Self {
            probe,
            status: AdapterStatus::Offline,
            latency_ms,
            data: None,
            error: Some(error),
            checked_at: Utc::now(),
        }
    }

    pub fn is_online(&self) -> bool {
        self.status == AdapterStatus::Online
    }
}

/// Aggregate outcome of one health check
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Unique check identifier
    pub check_id: Uuid,

    /// Adapter instance that ran the check
    pub adapter_id: String,

    /// ONLINE only if every probe succeeded
    pub status: AdapterStatus,

    /// Individual probe results, in configured order
    pub probes: Vec<ProbeResult>,

    /// Completion timestamp
    pub checked_at: DateTime<Utc>,

    /// Total duration in milliseconds
    pub duration_ms: u64,
}

impl HealthReport {
    /// Build a report from probe results
    pub fn from_probes(adapter_id: impl Into<String>, probes: Vec<ProbeResult>) -> Self {
        let status = if !probes.is_empty() && probes.iter().all(ProbeResult::is_online) {
            AdapterStatus::Online
        } else {
            AdapterStatus::Offline
        };

        Self {
            check_id: Uuid::new_v4(),
            adapter_id: adapter_id.into(),
            status,
            probes,
            checked_at: Utc::now(),
            duration_ms: 0,
        }
    }

    /// Set duration
    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }

    pub fn is_online(&self) -> bool {
        self.status == AdapterStatus::Online
    }

    /// Result of a specific probe
    pub fn probe(&self, kind: ProbeKind) -> Option<&ProbeResult> {
        self.probes.iter().find(|p| p.probe == kind)
    }

    /// First failure across probes
    pub fn error(&self) -> Option<&AdapterError> {
        self.probes.iter().find_map(|p| p.error.as_ref())
    }

    /// First successful payload across probes
    pub fn data(&self) -> Option<&serde_json::Value> {
        self.probes.iter().find_map(|p| p.data.as_ref())
    }
}
