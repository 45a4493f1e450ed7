//! Generation and membership reconciliation.
//!
//! Stores supply an [`InventoryTransaction`] scoped to one atomic unit of
//! work and run [`reconcile_in`] inside it. The store decides how atomicity
//! is achieved; this module decides what gets written.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

use super::{
    Generation, GenerationId, HostIdentity, InstalledApp, InventorySnapshot, distinct_by_key,
    inventory_changed,
};

/// Store operations available inside a single reconcile transaction.
///
/// Implementations must not commit anything themselves. Returning an error
/// from any method aborts the surrounding transaction.
#[cfg_attr(test, mockall::automock(type Error = String;))]
#[async_trait]
pub trait InventoryTransaction: Send {
    /// Adapter-specific failure type.
    type Error: Send;

    /// Most recently created generation, regardless of identity.
    async fn latest_created_generation(&mut self) -> Result<Option<Generation>, Self::Error>;

    /// Create a generation whose `created_at` and `updated_at` equal `now`.
    async fn insert_generation(
        &mut self,
        identity: &HostIdentity,
        now: DateTime<Utc>,
    ) -> Result<Generation, Self::Error>;

    /// Applications in the generation's active set.
    async fn active_apps(
        &mut self,
        generation: GenerationId,
    ) -> Result<Vec<InstalledApp>, Self::Error>;

    /// Set the generation's `updated_at` to `now`.
    async fn touch_generation(
        &mut self,
        generation: GenerationId,
        now: DateTime<Utc>,
    ) -> Result<(), Self::Error>;

    /// Stamp `end_time = now` on every active row; returns the row count.
    async fn archive_active(
        &mut self,
        generation: GenerationId,
        now: DateTime<Utc>,
    ) -> Result<usize, Self::Error>;

    /// Insert `apps` as fresh active rows; returns the row count.
    async fn insert_apps(
        &mut self,
        generation: GenerationId,
        apps: &[InstalledApp],
        now: DateTime<Utc>,
    ) -> Result<usize, Self::Error>;
}

/// What a reconcile call did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A new generation was created with its initial active set.
    Bootstrapped {
        generation: GenerationId,
        inserted: usize,
    },
    /// The observation matched the active set; nothing was written.
    Unchanged { generation: GenerationId },
    /// The active set was archived and replaced in full.
    Replaced {
        generation: GenerationId,
        archived: usize,
        inserted: usize,
    },
}

impl ReconcileOutcome {
    /// Generation the observation was attributed to.
    #[must_use]
    pub const fn generation(&self) -> GenerationId {
        match self {
            Self::Bootstrapped { generation, .. }
            | Self::Unchanged { generation }
            | Self::Replaced { generation, .. } => *generation,
        }
    }

    /// Short label for logs and status reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Bootstrapped { .. } => "bootstrapped",
            Self::Unchanged { .. } => "unchanged",
            Self::Replaced { .. } => "replaced",
        }
    }
}

/// Apply `snapshot` through `tx`, using `now` for every timestamp written.
///
/// A generation is reused only when it is the most recently created one and
/// its identity matches exactly. An identity that drifts away and later
/// returns therefore starts a new generation.
///
/// # Errors
///
/// Propagates the first error returned by `tx`; the caller is expected to
/// roll the transaction back.
pub async fn reconcile_in<T>(
    tx: &mut T,
    snapshot: &InventorySnapshot,
    now: DateTime<Utc>,
) -> Result<ReconcileOutcome, T::Error>
where
    T: InventoryTransaction,
{
    let observed = distinct_by_key(&snapshot.apps);
    if observed.len() != snapshot.apps.len() {
        warn!(
            reported = snapshot.apps.len(),
            kept = observed.len(),
            "dropped applications with repeated identity keys"
        );
    }

    let reusable = tx
        .latest_created_generation()
        .await?
        .filter(|generation| generation.identity == snapshot.identity);

    let Some(generation) = reusable else {
        let created = tx.insert_generation(&snapshot.identity, now).await?;
        let inserted = tx.insert_apps(created.id, &observed, now).await?;
        return Ok(ReconcileOutcome::Bootstrapped {
            generation: created.id,
            inserted,
        });
    };

    let active = tx.active_apps(generation.id).await?;
    if !inventory_changed(&active, &observed) {
        return Ok(ReconcileOutcome::Unchanged {
            generation: generation.id,
        });
    }

    tx.touch_generation(generation.id, now).await?;
    let archived = tx.archive_active(generation.id, now).await?;
    let inserted = tx.insert_apps(generation.id, &observed, now).await?;
    Ok(ReconcileOutcome::Replaced {
        generation: generation.id,
        archived,
        inserted,
    })
}
