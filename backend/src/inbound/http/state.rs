//! Shared HTTP adapter state.
//!
//! Handlers take this through `web::Data` so they depend only on the store
//! port and the poller's status channel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;

use crate::domain::PollStatus;
use crate::domain::ports::InventoryStore;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub store: Arc<dyn InventoryStore>,
    pub poll_status: Arc<PollStatus>,
    pub clock: Arc<dyn Clock>,
    pub started_at: DateTime<Utc>,
}

impl HttpState {
    /// Build state, recording the process start from `clock`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use hostwatch::domain::PollStatus;
    /// use hostwatch::inbound::http::state::HttpState;
    /// use hostwatch::outbound::memory::MemoryInventoryStore;
    /// use mockable::DefaultClock;
    ///
    /// let clock = Arc::new(DefaultClock);
    /// let store = Arc::new(MemoryInventoryStore::new(clock.clone()));
    /// let state = HttpState::new(store, Arc::new(PollStatus::new()), clock);
    /// assert_eq!(state.store.backend_name(), "memory");
    /// ```
    pub fn new(
        store: Arc<dyn InventoryStore>,
        poll_status: Arc<PollStatus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let started_at = clock.utc();
        Self {
            store,
            poll_status,
            clock,
            started_at,
        }
    }
}
