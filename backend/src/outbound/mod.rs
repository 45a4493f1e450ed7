//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: process-local inventory store used when no database is
//!   configured and by tests
//! - **osquery**: fact source that shells out to `osqueryi`
//! - **persistence**: PostgreSQL-backed inventory store using Diesel
//!
//! Adapters translate between domain types and infrastructure
//! representations. The reconcile algorithm itself lives in the domain.

pub mod memory;
pub mod osquery;
pub mod persistence;
