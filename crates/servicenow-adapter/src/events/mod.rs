//! Status event bus
//!
//! Maps each status to an ordered list of listeners. Listeners are called
//! synchronously, in registration order, outside the registry lock so a
//! listener may register further listeners.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::contracts::{AdapterStatus, StatusEvent};

/// Status listener
pub type StatusListener = Arc<dyn Fn(&StatusEvent) + Send + Sync>;

/// Publish/subscribe registry for status events
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<HashMap<AdapterStatus, Vec<StatusListener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one status
    pub fn on<F>(&self, status: AdapterStatus, listener: F)
    where
        F: Fn(&StatusEvent) + Send + Sync + 'static,
    {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        listeners.entry(status).or_default().push(Arc::new(listener));
    }

    /// Deliver an event to every listener of its status.
    ///
    /// Returns the number of listeners notified.
    pub fn emit(&self, event: &StatusEvent) -> usize {
        let targets: Vec<StatusListener> = {
            let listeners = self
                .listeners
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            listeners.get(&event.status).cloned().unwrap_or_default()
        };

        for listener in &targets {
            listener(event);
        }
        targets.len()
    }

    /// Number of listeners registered for a status
    pub fn listener_count(&self, status: AdapterStatus) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&status)
            .map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("online_listeners", &self.listener_count(AdapterStatus::Online))
            .field("offline_listeners", &self.listener_count(AdapterStatus::Offline))
            .finish()
    }
}
