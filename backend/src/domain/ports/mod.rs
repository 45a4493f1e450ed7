//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod fact_source;
mod inventory_store;

#[cfg(test)]
pub use fact_source::MockFactSource;
pub use fact_source::{FactRow, FactSource, FactSourceError, FixtureFactSource, RawFacts};
#[cfg(test)]
pub use inventory_store::MockInventoryStore;
pub use inventory_store::{ConnectionStats, InventoryStore, InventoryStoreError};
