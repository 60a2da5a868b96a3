//! ServiceNow adapter entry point
//!
//! Runs health checks and record operations against one change request table.

use clap::{Parser, Subcommand};
use servicenow_adapter::config::AdapterProperties;
use servicenow_adapter::contracts::*;
use servicenow_adapter::engine::ServiceNowAdapter;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "servicenow-adapter")]
#[command(about = "ServiceNow change request adapter - health checks and record access")]
#[command(version)]
struct Cli {
    /// Adapter instance id
    #[arg(long, default_value = "servicenow", env = "SERVICENOW_ADAPTER_ID", global = true)]
    id: String,

    /// Properties file (JSON/YAML); falls back to SERVICENOW_* variables
    #[arg(short, long, env = "SERVICENOW_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the instance and print the health report
    Check {
        /// Timeout per probe in milliseconds
        #[arg(long, default_value = "10000")]
        timeout: u64,

        /// Only run the read probe
        #[arg(long)]
        read_only: bool,

        /// Emit a single status event per check
        #[arg(long)]
        consolidated: bool,
    },

    /// Read one normalized change request
    Get,

    /// Create a change request and print the normalized result
    Post,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let cli = Cli::parse();

    let props = match &cli.config {
        Some(path) => AdapterProperties::from_file(path)?,
        None => AdapterProperties::from_env()?,
    };

    match cli.command {
        Commands::Check {
            timeout,
            read_only,
            consolidated,
        } => {
            let mut options = if read_only {
                HealthCheckOptions::read_only()
            } else {
                HealthCheckOptions::default()
            };
            options.probe_timeout_ms = timeout;
            if consolidated {
                options.emission = EmissionMode::Consolidated;
            }

            let adapter = ServiceNowAdapter::new(cli.id, props)?.with_options(options);
            for status in [AdapterStatus::Online, AdapterStatus::Offline] {
                adapter.on(status, |event| {
                    tracing::info!(status = %event.status, id = %event.id, "Status event");
                });
            }

            let report = adapter.healthcheck().await;
            println!("{}", serde_json::to_string_pretty(&report)?);

            if !report.is_online() {
                std::process::exit(1);
            }
        }

        Commands::Get => {
            let adapter = ServiceNowAdapter::new(cli.id, props)?;
            let records = adapter.get_record().await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }

        Commands::Post => {
            let adapter = ServiceNowAdapter::new(cli.id, props)?;
            let record = adapter.post_record().await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    Ok(())
}
