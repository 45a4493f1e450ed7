//! Inputs for [`super::create_server`].

use std::net::SocketAddr;
use std::sync::Arc;

use hostwatch::domain::PollStatus;
use hostwatch::domain::ports::InventoryStore;
use mockable::Clock;

/// Listener address plus the shared handles the handlers read from.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) store: Arc<dyn InventoryStore>,
    pub(crate) poll_status: Arc<PollStatus>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl ServerConfig {
    pub fn new(
        bind_addr: SocketAddr,
        store: Arc<dyn InventoryStore>,
        poll_status: Arc<PollStatus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bind_addr,
            store,
            poll_status,
            clock,
        }
    }
}
