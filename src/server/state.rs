//! Shared application state for the HTTP server.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::server::hub::Hub;
use crate::store::CounterStore;

/// Application state shared across all handlers.
#[derive(Debug)]
pub struct AppState {
    /// Subscriber registry and fan-out; owns a handle to the scoreboard.
    pub hub: Hub,

    /// When the server came up, for `/health`.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Creates app state broadcasting the given store.
    pub fn new(store: Arc<CounterStore>) -> Self {
        Self {
            hub: Hub::new(store),
            started_at: Utc::now(),
        }
    }

    pub fn store(&self) -> &CounterStore {
        self.hub.store()
    }
}
