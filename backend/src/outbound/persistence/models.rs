//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::inventory::{
    Generation, GenerationId, HostIdentity, InstalledApp, MembershipRecord,
};

use super::schema::{installed_apps, inventory_generations};

/// Row struct for reading from the generations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = inventory_generations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GenerationRow {
    pub id: i64,
    pub os_name: String,
    pub os_version: String,
    pub os_platform: String,
    pub agent_version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GenerationRow> for Generation {
    fn from(row: GenerationRow) -> Self {
        Self {
            id: GenerationId::new(row.id),
            identity: HostIdentity {
                os_name: row.os_name,
                os_version: row.os_version,
                os_platform: row.os_platform,
                agent_version: row.agent_version,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable struct for new generations.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = inventory_generations)]
pub(crate) struct NewGenerationRow<'a> {
    pub os_name: &'a str,
    pub os_version: &'a str,
    pub os_platform: &'a str,
    pub agent_version: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewGenerationRow<'a> {
    pub fn new(identity: &'a HostIdentity, now: DateTime<Utc>) -> Self {
        Self {
            os_name: &identity.os_name,
            os_version: &identity.os_version,
            os_platform: &identity.os_platform,
            agent_version: &identity.agent_version,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Row struct for reading membership records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = installed_apps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InstalledAppRow {
    pub id: i64,
    pub generation_id: i64,
    pub name: String,
    pub path: String,
    pub bundle_identifier: String,
    pub bundle_name: String,
    pub bundle_short_version: String,
    pub display_name: String,
    pub minimum_system_version: String,
    pub last_opened_time: f64,
    pub created_at: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl From<InstalledAppRow> for MembershipRecord {
    fn from(row: InstalledAppRow) -> Self {
        Self {
            id: row.id,
            generation_id: GenerationId::new(row.generation_id),
            app: InstalledApp {
                name: row.name,
                path: row.path,
                bundle_identifier: row.bundle_identifier,
                bundle_name: row.bundle_name,
                bundle_short_version: row.bundle_short_version,
                display_name: row.display_name,
                minimum_system_version: row.minimum_system_version,
                last_opened_time: row.last_opened_time,
            },
            created_at: row.created_at,
            end_time: row.end_time,
        }
    }
}

/// Insertable struct for new active membership rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = installed_apps)]
pub(crate) struct NewInstalledAppRow<'a> {
    pub generation_id: i64,
    pub name: &'a str,
    pub path: &'a str,
    pub bundle_identifier: &'a str,
    pub bundle_name: &'a str,
    pub bundle_short_version: &'a str,
    pub display_name: &'a str,
    pub minimum_system_version: &'a str,
    pub last_opened_time: f64,
    pub created_at: DateTime<Utc>,
}

impl<'a> NewInstalledAppRow<'a> {
    pub fn new(generation: GenerationId, app: &'a InstalledApp, now: DateTime<Utc>) -> Self {
        Self {
            generation_id: generation.get(),
            name: &app.name,
            path: &app.path,
            bundle_identifier: &app.bundle_identifier,
            bundle_name: &app.bundle_name,
            bundle_short_version: &app.bundle_short_version,
            display_name: &app.display_name,
            minimum_system_version: &app.minimum_system_version,
            last_opened_time: app.last_opened_time,
            created_at: now,
        }
    }
}
