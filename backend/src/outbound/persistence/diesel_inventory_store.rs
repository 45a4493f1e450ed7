//! PostgreSQL-backed inventory store.
//!
//! Every reconcile runs in one Diesel transaction. Reads of the current
//! inventory run in a read-only repeatable-read transaction so the generation
//! and its active set come from the same snapshot.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::OptionalExtension;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use mockable::Clock;

use crate::domain::inventory::{
    CurrentInventory, Generation, GenerationId, HostIdentity, InstalledApp, InventorySnapshot,
    InventoryTransaction, LatestInventory, MembershipRecord, ReconcileOutcome, reconcile_in,
    sort_for_display,
};
use crate::domain::ports::{ConnectionStats, InventoryStore, InventoryStoreError};

use super::diesel_error_mapping::{
    map_boundary_error, map_pool_error, map_read_error, map_statement_error,
};
use super::models::{GenerationRow, InstalledAppRow, NewGenerationRow, NewInstalledAppRow};
use super::pool::DbPool;
use super::schema::{installed_apps, inventory_generations};

/// Rows per multi-row insert; keeps bind parameters well under the
/// PostgreSQL limit.
const INSERT_CHUNK: usize = 500;

/// Diesel-backed implementation of [`InventoryStore`].
#[derive(Clone)]
pub struct DieselInventoryStore {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselInventoryStore {
    /// Create a store over `pool`, stamping writes with `clock`.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

/// Failure inside `AsyncConnection::transaction`.
///
/// Diesel converts begin, commit and rollback failures through `From`, so
/// those land in `Boundary`; statement failures are wrapped explicitly.
#[derive(Debug)]
enum TransactionFailure {
    Boundary(diesel::result::Error),
    Statement(diesel::result::Error),
}

impl From<diesel::result::Error> for TransactionFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Boundary(error)
    }
}

impl From<TransactionFailure> for InventoryStoreError {
    fn from(failure: TransactionFailure) -> Self {
        match failure {
            TransactionFailure::Boundary(error) => map_boundary_error(error),
            TransactionFailure::Statement(error) => map_statement_error(error),
        }
    }
}

struct PgInventoryTransaction<'a> {
    conn: &'a mut AsyncPgConnection,
}

#[async_trait]
impl InventoryTransaction for PgInventoryTransaction<'_> {
    type Error = diesel::result::Error;

    async fn latest_created_generation(&mut self) -> Result<Option<Generation>, Self::Error> {
        let row = inventory_generations::table
            .order((
                inventory_generations::created_at.desc(),
                inventory_generations::id.desc(),
            ))
            .select(GenerationRow::as_select())
            .first(&mut *self.conn)
            .await
            .optional()?;
        Ok(row.map(Generation::from))
    }

    async fn insert_generation(
        &mut self,
        identity: &HostIdentity,
        now: DateTime<Utc>,
    ) -> Result<Generation, Self::Error> {
        let row = diesel::insert_into(inventory_generations::table)
            .values(NewGenerationRow::new(identity, now))
            .returning(GenerationRow::as_returning())
            .get_result(&mut *self.conn)
            .await?;
        Ok(row.into())
    }

    async fn active_apps(
        &mut self,
        generation: GenerationId,
    ) -> Result<Vec<InstalledApp>, Self::Error> {
        let rows: Vec<InstalledAppRow> = installed_apps::table
            .filter(installed_apps::generation_id.eq(generation.get()))
            .filter(installed_apps::end_time.is_null())
            .select(InstalledAppRow::as_select())
            .load(&mut *self.conn)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| MembershipRecord::from(row).app)
            .collect())
    }

    async fn touch_generation(
        &mut self,
        generation: GenerationId,
        now: DateTime<Utc>,
    ) -> Result<(), Self::Error> {
        let updated = diesel::update(inventory_generations::table.find(generation.get()))
            .set(inventory_generations::updated_at.eq(now))
            .execute(&mut *self.conn)
            .await?;
        if updated == 0 {
            return Err(diesel::result::Error::NotFound);
        }
        Ok(())
    }

    async fn archive_active(
        &mut self,
        generation: GenerationId,
        now: DateTime<Utc>,
    ) -> Result<usize, Self::Error> {
        diesel::update(
            installed_apps::table
                .filter(installed_apps::generation_id.eq(generation.get()))
                .filter(installed_apps::end_time.is_null()),
        )
        .set(installed_apps::end_time.eq(Some(now)))
        .execute(&mut *self.conn)
        .await
    }

    async fn insert_apps(
        &mut self,
        generation: GenerationId,
        apps: &[InstalledApp],
        now: DateTime<Utc>,
    ) -> Result<usize, Self::Error> {
        let mut inserted = 0;
        for chunk in apps.chunks(INSERT_CHUNK) {
            let rows: Vec<_> = chunk
                .iter()
                .map(|app| NewInstalledAppRow::new(generation, app, now))
                .collect();
            inserted += diesel::insert_into(installed_apps::table)
                .values(&rows)
                .execute(&mut *self.conn)
                .await?;
        }
        Ok(inserted)
    }
}

#[async_trait]
impl InventoryStore for DieselInventoryStore {
    async fn reconcile(
        &self,
        snapshot: &InventorySnapshot,
    ) -> Result<ReconcileOutcome, InventoryStoreError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let now = self.clock.utc();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome = conn
            .transaction(|conn| {
                async move {
                    let mut tx = PgInventoryTransaction { conn };
                    reconcile_in(&mut tx, snapshot, now)
                        .await
                        .map_err(TransactionFailure::Statement)
                }
                .scope_boxed()
            })
            .await?;

        Ok(outcome)
    }

    async fn latest(&self) -> Result<LatestInventory, InventoryStoreError> {
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.build_transaction()
            .read_only()
            .repeatable_read()
            .run(|conn| {
                async move {
                    let generation = inventory_generations::table
                        .order((
                            inventory_generations::updated_at.desc(),
                            inventory_generations::created_at.desc(),
                            inventory_generations::id.desc(),
                        ))
                        .select(GenerationRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;
                    let latest = match generation.map(Generation::from) {
                        None => LatestInventory::NotReady,
                        Some(generation) => {
                            let rows: Vec<InstalledAppRow> = installed_apps::table
                                .filter(installed_apps::generation_id.eq(generation.id.get()))
                                .filter(installed_apps::end_time.is_null())
                                .select(InstalledAppRow::as_select())
                                .load(conn)
                                .await?;
                            let mut apps: Vec<MembershipRecord> =
                                rows.into_iter().map(MembershipRecord::from).collect();
                            sort_for_display(&mut apps);
                            LatestInventory::Ready(CurrentInventory { generation, apps })
                        }
                    };
                    Ok::<_, diesel::result::Error>(latest)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_read_error)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    fn connection_stats(&self) -> Option<ConnectionStats> {
        Some(self.pool.stats())
    }
}
