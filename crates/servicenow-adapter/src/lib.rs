//! ServiceNow Change Request Adapter
//!
//! Health-checked REST bridge between an orchestration host and a single
//! ServiceNow change request table.
//!
//! # Responsibilities
//! - Probe the remote instance and emit `ONLINE` / `OFFLINE` status events
//! - Classify transport errors, hibernating instances and malformed payloads
//! - Remap raw change request records into a small stable schema
//!
//! # Layout
//! - [`connector`]: transport seam and the `reqwest` backed ServiceNow connector
//! - [`engine`]: the adapter itself and record normalization
//! - [`events`]: status event bus
//! - [`contracts`]: shared data types

pub mod config;
pub mod connector;
pub mod engine;
pub mod error;
pub mod events;

// Re-export contracts
#[path = "../contracts/mod.rs"]
pub mod contracts;

pub use contracts::*;
pub use error::{AdapterError, Result, TransportError};
