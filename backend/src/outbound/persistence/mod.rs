//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete [`InventoryStore`](crate::domain::ports::InventoryStore) backed by
//! PostgreSQL via Diesel, with async support through `diesel-async` and `bb8`
//! connection pooling.
//!
//! - Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//!   private to this module.
//! - The reconcile algorithm lives in the domain; this adapter supplies the
//!   transaction it runs in.
//! - Database errors are mapped to
//!   [`InventoryStoreError`](crate::domain::ports::InventoryStoreError).
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hostwatch::outbound::persistence::{DbPool, DieselInventoryStore, PoolConfig, apply_schema};
//!
//! apply_schema("postgres://localhost/hostwatch").await?;
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/hostwatch")).await?;
//! let store = DieselInventoryStore::new(pool, Arc::new(mockable::DefaultClock));
//! ```

mod diesel_error_mapping;
mod diesel_inventory_store;
mod models;
mod pool;
mod schema;
mod schema_bootstrap;

pub use diesel_inventory_store::DieselInventoryStore;
pub use pool::{DbPool, PoolConfig, PoolError};
pub use schema_bootstrap::{
    MIGRATIONS, SchemaBootstrapError, apply_schema, apply_schema_blocking,
};
