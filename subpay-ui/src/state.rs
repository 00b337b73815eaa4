//! Shared application state for the UI server.
//!
//! The server is the composition root: it owns the one `Store` for the
//! session and hands it to handlers through axum state.

use std::sync::Arc;

use subpay::flows::FlowContext;
use subpay::store::Store;
use tokio::sync::{RwLock, broadcast};
use tracing::debug;

/// Events broadcast to SSE clients when the store changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// Flags or user changed (demo mode, network, connections).
    SessionChanged,
    PlanAdded {
        plan_id: String,
    },
    PlanUpdated {
        plan_id: String,
    },
    /// A timeline entry was prepended.
    TimelineAppended {
        plan_id: Option<String>,
    },
}

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session store. Each mutation holds the write lock for its whole update.
    pub store: Arc<RwLock<Store>>,
    /// Config and clock for the flows.
    pub flows: Arc<FlowContext>,
    /// Broadcast sender for store change events.
    pub event_tx: Arc<broadcast::Sender<ChangeEvent>>,
}

impl AppState {
    pub fn new(store: Store, flows: FlowContext) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            store: Arc::new(RwLock::new(store)),
            flows: Arc::new(flows),
            event_tx: Arc::new(event_tx),
        }
    }

    /// Broadcast change events. Having no subscribers is fine.
    pub fn notify(&self, events: impl IntoIterator<Item = ChangeEvent>) {
        for event in events {
            debug!(event = ?event, "broadcasting change");
            let _ = self.event_tx.send(event);
        }
    }
}
