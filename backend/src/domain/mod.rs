//! Domain model and services.
//!
//! Purpose: hold the inventory types, the reconciliation algorithm, and the
//! services that move facts from a source into a store. Adapters depend on
//! this module through the traits in [`ports`]; nothing here depends on an
//! adapter.
//!
//! Public surface:
//! - [`inventory`]: snapshot, generation and membership types plus the
//!   reconcile algorithm.
//! - [`assembler`]: raw fact rows to snapshot conversion.
//! - [`poller`]: the scheduled collect, assemble and reconcile loop.
//! - [`Error`] and [`ErrorCode`]: the transport-agnostic error envelope.
//! - [`TraceId`]: request correlation identifier.

pub mod assembler;
pub mod error;
pub mod inventory;
pub mod poller;
pub mod ports;
pub mod trace_id;

pub use self::assembler::{AssembleError, assemble};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::poller::{
    InventoryPoller, PollError, PollReport, PollResult, PollStatus, PollerConfig,
};
pub use self::trace_id::TraceId;
