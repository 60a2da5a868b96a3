//! ServiceNow adapter engine
//!
//! Owns health semantics, response normalization and status emission for one
//! adapter instance. All remote traffic goes through a [`Connector`].

mod normalize;

pub use normalize::{normalize_create, normalize_read};

use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, instrument, warn};

use crate::config::AdapterProperties;
use crate::connector::{Connector, ConnectorConfig, ServiceNowConnector};
use crate::contracts::*;
use crate::error::{AdapterError, Result};
use crate::events::EventBus;

/// Health-checked adapter for a ServiceNow change request table
pub struct ServiceNowAdapter<C = ServiceNowConnector> {
    id: String,
    props: AdapterProperties,
    connector: C,
    options: HealthCheckOptions,
    events: EventBus,
}

impl ServiceNowAdapter<ServiceNowConnector> {
    /// Create an adapter backed by the HTTP connector.
    ///
    /// Performs no I/O; fails only when the properties are incomplete.
    pub fn new(id: impl Into<String>, props: AdapterProperties) -> Result<Self> {
        props.validate()?;
        let connector = ServiceNowConnector::new(ConnectorConfig::from_properties(&props))?;
        Ok(Self::with_connector(id, props, connector))
    }
}

impl<C: Connector> ServiceNowAdapter<C> {
    /// Create an adapter around an existing connector
    pub fn with_connector(id: impl Into<String>, props: AdapterProperties, connector: C) -> Self {
        Self {
            id: id.into(),
            props,
            connector,
            options: HealthCheckOptions::default(),
            events: EventBus::new(),
        }
    }

    /// Set health check options
    pub fn with_options(mut self, options: HealthCheckOptions) -> Self {
        self.options = options;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn properties(&self) -> &AdapterProperties {
        &self.props
    }

    pub fn options(&self) -> &HealthCheckOptions {
        &self.options
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Register a status listener
    pub fn on<F>(&self, status: AdapterStatus, listener: F)
    where
        F: Fn(&StatusEvent) + Send + Sync + 'static,
    {
        self.events.on(status, listener);
    }

    /// Start a background health check and return immediately.
    ///
    /// Every call issues a fresh check; the handle may be dropped.
    pub fn connect(self: &Arc<Self>) -> JoinHandle<HealthReport>
    where
        C: 'static,
    {
        info!(adapter_id = %self.id, table = %self.props.service_now_table, "Connecting to ServiceNow");
        let adapter = Arc::clone(self);
        tokio::spawn(async move { adapter.healthcheck().await })
    }

    /// Run every configured probe and resolve once all of them finished
    pub async fn healthcheck(&self) -> HealthReport {
        let start = Instant::now();

        let probes = self.options.probes.iter().map(|probe| self.run_probe(*probe));
        let results = join_all(probes).await;

        let report = HealthReport::from_probes(&self.id, results)
            .with_duration(start.elapsed().as_millis() as u64);

        if self.options.emission == EmissionMode::Consolidated {
            self.announce(report.status);
        }

        debug!(
            adapter_id = %self.id,
            check_id = %report.check_id,
            status = %report.status,
            duration_ms = report.duration_ms,
            "Health check completed"
        );
        report
    }

    /// Run a health check and hand the report to `callback` exactly once
    pub async fn healthcheck_with<F>(&self, callback: F) -> HealthReport
    where
        F: FnOnce(&HealthReport),
    {
        let report = self.healthcheck().await;
        callback(&report);
        report
    }

    /// Read and normalize records from the table
    #[instrument(skip(self), fields(adapter_id = %self.id))]
    pub async fn get_record(&self) -> Result<Vec<ChangeRecord>> {
        let response = self.connector.get().await?;
        if self.connector.is_hibernating(&response) {
            return Err(AdapterError::Hibernating);
        }
        normalize_read(&response)
    }

    /// Create a record and normalize the result.
    ///
    /// No hibernation check here: the hibernation page does not parse as a
    /// record envelope and surfaces as a malformed response.
    #[instrument(skip(self), fields(adapter_id = %self.id))]
    pub async fn post_record(&self) -> Result<ChangeRecord> {
        let response = self.connector.post().await?;
        normalize_create(&response)
    }

    /// Emit ONLINE
    pub fn emit_online(&self) {
        self.emit_status(AdapterStatus::Online);
        info!(adapter_id = %self.id, "ServiceNow instance is available");
    }

    /// Emit OFFLINE
    pub fn emit_offline(&self) {
        self.emit_status(AdapterStatus::Offline);
        warn!(adapter_id = %self.id, "ServiceNow instance is unavailable");
    }

    /// Broadcast `{id}` under the status name
    pub fn emit_status(&self, status: AdapterStatus) {
        let notified = self.events.emit(&StatusEvent::new(status, &self.id));
        debug!(adapter_id = %self.id, status = %status, listeners = notified, "Status emitted");
    }

    fn announce(&self, status: AdapterStatus) {
        match status {
            AdapterStatus::Online => self.emit_online(),
            AdapterStatus::Offline => self.emit_offline(),
        }
    }

    async fn execute(&self, probe: ProbeKind) -> Result<serde_json::Value> {
        match probe {
            ProbeKind::Read => Ok(serde_json::to_value(self.get_record().await?)?),
            ProbeKind::Create => Ok(serde_json::to_value(self.post_record().await?)?),
        }
    }

    async fn run_probe(&self, probe: ProbeKind) -> ProbeResult {
        let start = Instant::now();
        let timeout_ms = self.options.probe_timeout_ms;

        let outcome = match timeout(Duration::from_millis(timeout_ms), self.execute(probe)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(AdapterError::Timeout {
                probe: probe.to_string(),
                timeout_ms,
            }),
        };
        let latency_ms = start.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(data) => {
                debug!(
                    adapter_id = %self.id,
                    probe = %probe,
                    latency_ms,
                    "ServiceNow instance is available and running"
                );
                ProbeResult::online(probe, latency_ms, data)
            }
            Err(AdapterError::Hibernating) => {
                debug!(adapter_id = %self.id, probe = %probe, "ServiceNow instance is hibernating");
                ProbeResult::offline(probe, latency_ms, AdapterError::Hibernating)
            }
            Err(e) => {
                error!(
                    adapter_id = %self.id,
                    probe = %probe,
                    error = %e,
                    "ServiceNow instance is offline"
                );
                ProbeResult::offline(probe, latency_ms, e)
            }
        };

        if self.options.emission == EmissionMode::PerProbe {
            self.announce(result.status);
        }
        result
    }
}

impl<C> std::fmt::Debug for ServiceNowAdapter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceNowAdapter")
            .field("id", &self.id)
            .field("props", &self.props)
            .field("options", &self.options)
            .field("events", &self.events)
            .finish()
    }
}
