//! Host inventory domain model.
//!
//! Purpose: describe what the poller observes on a host and how observations
//! are versioned once persisted.
//!
//! - [`InventorySnapshot`] is one observation: the host identity plus the
//!   installed applications in source order.
//! - [`Generation`] is a persisted identity tuple with creation and update
//!   timestamps.
//! - [`MembershipRecord`] is one application row owned by a generation. Rows
//!   with no `end_time` form the generation's active set.
//!
//! Reconciliation logic lives in [`reconcile`] and the change rule in
//! [`diff`].

mod diff;
mod reconcile;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use diff::{AppKey, distinct_by_key, inventory_changed};
pub use reconcile::{InventoryTransaction, ReconcileOutcome, reconcile_in};

/// Opaque, monotonically assigned generation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationId(i64);

impl GenerationId {
    /// Wrap a raw identifier produced by a store.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier for persistence adapters.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for GenerationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// OS and agent identity of an observed host.
///
/// Two observations belong to the same generation only when all four fields
/// are byte-for-byte equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HostIdentity {
    /// Operating system name, for example `macOS`.
    pub os_name: String,
    /// Operating system version string.
    pub os_version: String,
    /// Operating system platform, for example `darwin`.
    pub os_platform: String,
    /// Version of the fact-collection agent.
    pub agent_version: String,
}

/// One installed application as reported by the fact source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstalledApp {
    pub name: String,
    pub path: String,
    pub bundle_identifier: String,
    pub bundle_name: String,
    pub bundle_short_version: String,
    pub display_name: String,
    pub minimum_system_version: String,
    /// Seconds since the Unix epoch; zero when the source had no usable value.
    pub last_opened_time: f64,
}

impl InstalledApp {
    /// Identity key used to match applications across observations.
    #[must_use]
    pub fn key(&self) -> AppKey<'_> {
        AppKey {
            name: &self.name,
            path: &self.path,
            bundle_identifier: &self.bundle_identifier,
        }
    }
}

/// A single observation of a host, ready for reconciliation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InventorySnapshot {
    pub identity: HostIdentity,
    /// Applications in the order the source returned them.
    pub apps: Vec<InstalledApp>,
}

/// A persisted identity generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub id: GenerationId,
    pub identity: HostIdentity,
    pub created_at: DateTime<Utc>,
    /// Bumped whenever the active membership set is replaced.
    pub updated_at: DateTime<Utc>,
}

/// An application row owned by a generation.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipRecord {
    /// Store-assigned row identifier.
    pub id: i64,
    pub generation_id: GenerationId,
    pub app: InstalledApp,
    pub created_at: DateTime<Utc>,
    /// `None` while the row belongs to the active set.
    pub end_time: Option<DateTime<Utc>>,
}

impl MembershipRecord {
    /// Whether the row is part of its generation's active set.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.end_time.is_none()
    }
}

/// The most recently updated generation and its active set.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentInventory {
    pub generation: Generation,
    /// Active rows ordered by last-opened time, most recent first.
    pub apps: Vec<MembershipRecord>,
}

impl CurrentInventory {
    /// Timestamp reported to readers as the last data update.
    #[must_use]
    pub const fn last_updated(&self) -> DateTime<Utc> {
        self.generation.updated_at
    }
}

/// Result of reading the current inventory.
#[derive(Debug, Clone, PartialEq)]
pub enum LatestInventory {
    /// No generation has been persisted yet.
    NotReady,
    Ready(CurrentInventory),
}

/// Order active rows the way readers expect them: most recently opened first,
/// then by name so equal timestamps render deterministically.
pub fn sort_for_display(apps: &mut [MembershipRecord]) {
    apps.sort_by(|left, right| {
        right
            .app
            .last_opened_time
            .total_cmp(&left.app.last_opened_time)
            .then_with(|| left.app.name.cmp(&right.app.name))
    });
}
