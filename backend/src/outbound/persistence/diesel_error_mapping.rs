//! Diesel and pool error mapping for the inventory store.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::InventoryStoreError;

use super::pool::PoolError;

/// Pool failures mean the store cannot be reached.
pub(crate) fn map_pool_error(error: PoolError) -> InventoryStoreError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    InventoryStoreError::store_unavailable(message)
}

/// Map a failed read. Closed connections surface as unavailability.
pub(crate) fn map_read_error(error: DieselError) -> InventoryStoreError {
    if is_connection_loss(&error) {
        return InventoryStoreError::store_unavailable(describe(&error));
    }
    InventoryStoreError::query(describe(&error))
}

/// Map a failure raised while beginning, committing or rolling back.
pub(crate) fn map_boundary_error(error: DieselError) -> InventoryStoreError {
    InventoryStoreError::store_unavailable(describe(&error))
}

/// Map a statement failure inside a reconcile transaction.
pub(crate) fn map_statement_error(error: DieselError) -> InventoryStoreError {
    if is_connection_loss(&error) {
        return InventoryStoreError::store_unavailable(describe(&error));
    }
    InventoryStoreError::transaction_failed(describe(&error))
}

fn is_connection_loss(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
            | DieselError::BrokenTransactionManager
    )
}

fn describe(error: &DieselError) -> String {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
            info.message().to_owned()
        }
        DieselError::NotFound => "record not found".to_owned(),
        other => {
            debug!(error = %other, "diesel operation failed");
            other.to_string()
        }
    }
}
