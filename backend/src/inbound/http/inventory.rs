//! Current inventory read endpoint.
//!
//! ```text
//! GET /api/latest_data
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::inventory::{CurrentInventory, LatestInventory, MembershipRecord};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::{
    INITIALIZING_RETRY_AFTER_SECS, initializing_cache_header, no_cache_header,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

const INITIALIZING_MESSAGE: &str =
    "System information is being collected. Please try again in a few seconds.";

fn is_blank(value: &str) -> bool {
    value.is_empty()
}

fn is_unset(value: &f64) -> bool {
    *value == 0.0
}

/// Operating system block of the inventory response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OsVersionResponse {
    #[schema(example = "macOS")]
    pub name: String,
    #[schema(example = "14.5")]
    pub version: String,
    #[schema(example = "darwin")]
    pub platform: String,
}

/// One active application.
///
/// Empty attributes and a zero last-opened time are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InstalledAppResponse {
    #[schema(example = "Safari.app")]
    pub name: String,
    #[schema(example = "/Applications/Safari.app")]
    pub path: String,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub bundle_identifier: String,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub bundle_name: String,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub bundle_short_version: String,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub minimum_system_version: String,
    /// Seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "is_unset")]
    pub last_opened_time: f64,
}

impl From<MembershipRecord> for InstalledAppResponse {
    fn from(record: MembershipRecord) -> Self {
        let app = record.app;
        Self {
            name: app.name,
            path: app.path,
            bundle_identifier: app.bundle_identifier,
            bundle_name: app.bundle_name,
            bundle_short_version: app.bundle_short_version,
            display_name: app.display_name,
            minimum_system_version: app.minimum_system_version,
            last_opened_time: app.last_opened_time,
        }
    }
}

/// Response payload for the current inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LatestDataResponse {
    pub os_version: OsVersionResponse,
    #[schema(example = "5.12.1")]
    pub osquery_version: String,
    pub installed_apps: Vec<InstalledAppResponse>,
    /// RFC 3339 timestamp of the last change to this generation.
    #[schema(example = "2026-03-01T09:00:00+00:00")]
    pub last_updated: String,
}

impl From<CurrentInventory> for LatestDataResponse {
    fn from(current: CurrentInventory) -> Self {
        let last_updated = current.last_updated().to_rfc3339();
        let identity = current.generation.identity;
        Self {
            os_version: OsVersionResponse {
                name: identity.os_name,
                version: identity.os_version,
                platform: identity.os_platform,
            },
            osquery_version: identity.agent_version,
            installed_apps: current
                .apps
                .into_iter()
                .map(InstalledAppResponse::from)
                .collect(),
            last_updated,
        }
    }
}

/// Body returned while no generation has been recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InitializingResponse {
    #[schema(example = "initializing")]
    pub status: String,
    pub message: String,
}

impl InitializingResponse {
    fn new() -> Self {
        Self {
            status: "initializing".to_owned(),
            message: INITIALIZING_MESSAGE.to_owned(),
        }
    }
}

/// Return the current host inventory.
#[utoipa::path(
    get,
    path = "/api/latest_data",
    description = "Most recently updated generation and its active applications, ordered by last-opened time.",
    responses(
        (
            status = 200,
            description = "Current inventory",
            headers(("Cache-Control" = String, description = "Always no-cache")),
            body = LatestDataResponse
        ),
        (
            status = 503,
            description = "No inventory collected yet, or the store is unavailable",
            headers(("Retry-After" = String, description = "Seconds to wait while initialising")),
            body = InitializingResponse
        ),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "getLatestData"
)]
#[get("/api/latest_data")]
pub async fn latest_data(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    match state.store.latest().await? {
        LatestInventory::NotReady => Ok(HttpResponse::ServiceUnavailable()
            .insert_header((header::RETRY_AFTER, INITIALIZING_RETRY_AFTER_SECS.to_string()))
            .insert_header(initializing_cache_header())
            .json(InitializingResponse::new())),
        LatestInventory::Ready(current) => Ok(HttpResponse::Ok()
            .insert_header(no_cache_header())
            .json(LatestDataResponse::from(current))),
    }
}

#[cfg(test)]
#[path = "inventory_tests.rs"]
mod tests;
