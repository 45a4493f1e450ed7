//! Port for persisting inventory snapshots and reading the current state.

use async_trait::async_trait;

use crate::domain::inventory::{InventorySnapshot, LatestInventory, ReconcileOutcome};

use super::define_port_error;

define_port_error! {
    /// Errors raised by inventory store adapters.
    pub enum InventoryStoreError {
        /// The store could not be reached or a transaction could not begin or commit.
        StoreUnavailable { message: String } =>
            "inventory store unavailable: {message}",
        /// A statement failed mid-transaction; every write was rolled back.
        TransactionFailed { message: String } =>
            "inventory transaction rolled back: {message}",
        /// A read failed or returned data that could not be decoded.
        Query { message: String } =>
            "inventory query failed: {message}",
    }
}

/// Connection counts reported by pooled stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStats {
    pub connections: u32,
    pub idle_connections: u32,
}

/// Durable, generation-versioned inventory store.
///
/// `reconcile` is atomic: a concurrent `latest` observes either the state
/// before the call or the state after it. Callers must not run two
/// `reconcile` calls at once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Fold one observation into the store.
    async fn reconcile(
        &self,
        snapshot: &InventorySnapshot,
    ) -> Result<ReconcileOutcome, InventoryStoreError>;

    /// The most recently updated generation with its active set.
    async fn latest(&self) -> Result<LatestInventory, InventoryStoreError>;

    /// Short adapter name reported by the status endpoint.
    fn backend_name(&self) -> &'static str;

    /// Pool usage, for stores that hold connections.
    fn connection_stats(&self) -> Option<ConnectionStats> {
        None
    }
}
