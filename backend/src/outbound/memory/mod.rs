//! In-process inventory store.
//!
//! Used when no database URL is configured and throughout the test suite.
//! A reconcile runs against a private copy of the state; the copy replaces
//! the shared state only when every step succeeded, so readers never see a
//! half-applied reconcile.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tokio::sync::Mutex;

use crate::domain::inventory::{
    CurrentInventory, Generation, GenerationId, HostIdentity, InstalledApp, InventorySnapshot,
    InventoryTransaction, LatestInventory, MembershipRecord, ReconcileOutcome, reconcile_in,
    sort_for_display,
};
use crate::domain::ports::{InventoryStore, InventoryStoreError};

#[derive(Debug, Clone, Default)]
struct InventoryState {
    generations: Vec<Generation>,
    members: Vec<MembershipRecord>,
    last_generation_id: i64,
    last_member_id: i64,
}

impl InventoryState {
    fn latest_updated(&self) -> Option<&Generation> {
        self.generations.iter().max_by(|left, right| {
            left.updated_at
                .cmp(&right.updated_at)
                .then_with(|| left.created_at.cmp(&right.created_at))
                .then_with(|| left.id.cmp(&right.id))
        })
    }
}

/// Memory-backed [`InventoryStore`].
pub struct MemoryInventoryStore {
    state: Mutex<InventoryState>,
    clock: Arc<dyn Clock>,
    fail_next_insert: AtomicBool,
}

impl MemoryInventoryStore {
    /// Empty store stamping writes with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(InventoryState::default()),
            clock,
            fail_next_insert: AtomicBool::new(false),
        }
    }

    /// Every generation ever created, oldest first.
    pub async fn generations(&self) -> Vec<Generation> {
        self.state.lock().await.generations.clone()
    }

    /// Every membership row, active and archived, in insertion order.
    pub async fn memberships(&self) -> Vec<MembershipRecord> {
        self.state.lock().await.members.clone()
    }

    /// Make the next membership insert fail, simulating a write error after
    /// the active set has been archived.
    #[cfg(any(test, feature = "test-support"))]
    pub fn fail_next_member_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }
}

struct MemoryTransaction<'a> {
    state: &'a mut InventoryState,
    fail_insert: bool,
}

#[async_trait]
impl InventoryTransaction for MemoryTransaction<'_> {
    type Error = InventoryStoreError;

    async fn latest_created_generation(&mut self) -> Result<Option<Generation>, Self::Error> {
        Ok(self
            .state
            .generations
            .iter()
            .max_by(|left, right| {
                left.created_at
                    .cmp(&right.created_at)
                    .then_with(|| left.id.cmp(&right.id))
            })
            .cloned())
    }

    async fn insert_generation(
        &mut self,
        identity: &HostIdentity,
        now: DateTime<Utc>,
    ) -> Result<Generation, Self::Error> {
        self.state.last_generation_id += 1;
        let generation = Generation {
            id: GenerationId::new(self.state.last_generation_id),
            identity: identity.clone(),
            created_at: now,
            updated_at: now,
        };
        self.state.generations.push(generation.clone());
        Ok(generation)
    }

    async fn active_apps(
        &mut self,
        generation: GenerationId,
    ) -> Result<Vec<InstalledApp>, Self::Error> {
        Ok(self
            .state
            .members
            .iter()
            .filter(|row| row.generation_id == generation && row.is_active())
            .map(|row| row.app.clone())
            .collect())
    }

    async fn touch_generation(
        &mut self,
        generation: GenerationId,
        now: DateTime<Utc>,
    ) -> Result<(), Self::Error> {
        let row = self
            .state
            .generations
            .iter_mut()
            .find(|row| row.id == generation)
            .ok_or_else(|| {
                InventoryStoreError::transaction_failed(format!(
                    "generation {generation} does not exist"
                ))
            })?;
        row.updated_at = now;
        Ok(())
    }

    async fn archive_active(
        &mut self,
        generation: GenerationId,
        now: DateTime<Utc>,
    ) -> Result<usize, Self::Error> {
        let mut archived = 0;
        for row in self
            .state
            .members
            .iter_mut()
            .filter(|row| row.generation_id == generation && row.is_active())
        {
            row.end_time = Some(now);
            archived += 1;
        }
        Ok(archived)
    }

    async fn insert_apps(
        &mut self,
        generation: GenerationId,
        apps: &[InstalledApp],
        now: DateTime<Utc>,
    ) -> Result<usize, Self::Error> {
        if self.fail_insert {
            return Err(InventoryStoreError::transaction_failed(
                "injected membership insert failure",
            ));
        }
        for app in apps {
            self.state.last_member_id += 1;
            self.state.members.push(MembershipRecord {
                id: self.state.last_member_id,
                generation_id: generation,
                app: app.clone(),
                created_at: now,
                end_time: None,
            });
        }
        Ok(apps.len())
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn reconcile(
        &self,
        snapshot: &InventorySnapshot,
    ) -> Result<ReconcileOutcome, InventoryStoreError> {
        let now = self.clock.utc();
        let mut shared = self.state.lock().await;
        let mut draft = shared.clone();
        let mut tx = MemoryTransaction {
            state: &mut draft,
            fail_insert: self.fail_next_insert.swap(false, Ordering::SeqCst),
        };
        let outcome = reconcile_in(&mut tx, snapshot, now).await?;
        *shared = draft;
        Ok(outcome)
    }

    async fn latest(&self) -> Result<LatestInventory, InventoryStoreError> {
        let state = self.state.lock().await;
        let Some(generation) = state.latest_updated() else {
            return Ok(LatestInventory::NotReady);
        };
        let mut apps: Vec<_> = state
            .members
            .iter()
            .filter(|row| row.generation_id == generation.id && row.is_active())
            .cloned()
            .collect();
        sort_for_display(&mut apps);
        Ok(LatestInventory::Ready(CurrentInventory {
            generation: generation.clone(),
            apps,
        }))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
