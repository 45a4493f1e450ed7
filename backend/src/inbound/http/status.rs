//! Operational status endpoint.
//!
//! ```text
//! GET /status
//! ```

use actix_web::{HttpResponse, get, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::inventory::LatestInventory;
use crate::domain::{PollReport, PollResult};
use crate::inbound::http::cache_control::no_cache_header;
use crate::inbound::http::state::HttpState;

const NO_DATA_YET: &str = "no data collected yet";

/// Process uptime and start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStatus {
    /// Whole seconds since start.
    pub uptime_seconds: i64,
    #[schema(example = "2026-03-01T09:00:00+00:00")]
    pub start_time: String,
}

/// Store reachability and freshness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    #[schema(example = "postgres")]
    pub backend: String,
    /// `connected` or `unavailable`.
    pub status: String,
    /// RFC 3339 time of the last inventory change, or a placeholder.
    pub last_data_update: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_connections: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_connections: Option<u32>,
}

/// Summary of the most recent poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LastPollStatus {
    pub started_at: String,
    pub finished_at: String,
    /// `bootstrapped`, `unchanged`, `replaced` or `failed`.
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<PollReport> for LastPollStatus {
    fn from(report: PollReport) -> Self {
        let (outcome, generation, error) = match report.result {
            PollResult::Succeeded {
                outcome,
                generation,
            } => (outcome.to_owned(), Some(generation.get()), None),
            PollResult::Failed { error } => ("failed".to_owned(), None, Some(error)),
        };
        Self {
            started_at: report.started_at.to_rfc3339(),
            finished_at: report.finished_at.to_rfc3339(),
            outcome,
            generation,
            error,
        }
    }
}

/// Response payload for `/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub process: ProcessStatus,
    pub store: StoreStatus,
    #[serde(default)]
    pub last_poll: Option<LastPollStatus>,
}

fn process_status(started_at: DateTime<Utc>, now: DateTime<Utc>) -> ProcessStatus {
    ProcessStatus {
        uptime_seconds: (now - started_at).num_seconds().max(0),
        start_time: started_at.to_rfc3339(),
    }
}

/// Report uptime, store state and the last poll result.
#[utoipa::path(
    get,
    path = "/status",
    responses(
        (
            status = 200,
            description = "Service status",
            headers(("Cache-Control" = String, description = "Always no-cache")),
            body = StatusResponse
        )
    ),
    tags = ["health"],
    operation_id = "getStatus"
)]
#[get("/status")]
pub async fn status(state: web::Data<HttpState>) -> HttpResponse {
    let (store_status, last_data_update) = match state.store.latest().await {
        Ok(LatestInventory::Ready(current)) => ("connected", current.last_updated().to_rfc3339()),
        Ok(LatestInventory::NotReady) => ("connected", NO_DATA_YET.to_owned()),
        Err(error) => {
            warn!(%error, "status check could not read the inventory store");
            ("unavailable", NO_DATA_YET.to_owned())
        }
    };
    let stats = state.store.connection_stats();

    let response = StatusResponse {
        process: process_status(state.started_at, state.clock.utc()),
        store: StoreStatus {
            backend: state.store.backend_name().to_owned(),
            status: store_status.to_owned(),
            last_data_update,
            open_connections: stats.map(|s| s.connections),
            idle_connections: stats.map(|s| s.idle_connections),
        },
        last_poll: state.poll_status.last().map(LastPollStatus::from),
    };

    HttpResponse::Ok()
        .insert_header(no_cache_header())
        .json(response)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use std::sync::Arc;

    use actix_web::{App, test as actix_test};
    use rstest::rstest;

    use super::*;
    use crate::domain::PollStatus;
    use crate::domain::ports::{
        ConnectionStats, InventoryStore, InventoryStoreError, MockInventoryStore,
    };
    use crate::outbound::memory::MemoryInventoryStore;
    use crate::test_support::clock::MutableClock;
    use crate::test_support::inventory::{epoch, snapshot};

    async fn get_status(state: HttpState) -> StatusResponse {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(status),
        )
        .await;
        let req = actix_test::TestRequest::get().uri("/status").to_request();
        actix_test::call_and_read_body_json(&app, req).await
    }

    #[rstest]
    #[actix_web::test]
    async fn fresh_memory_store_reports_no_data() {
        let clock = Arc::new(MutableClock::new(epoch()));
        let store = Arc::new(MemoryInventoryStore::new(clock.clone()));
        let state = HttpState::new(store, Arc::new(PollStatus::new()), clock.clone());
        clock.advance_seconds(90);

        let body = get_status(state).await;

        assert_eq!(body.process.uptime_seconds, 90);
        assert_eq!(body.process.start_time, epoch().to_rfc3339());
        assert_eq!(body.store.backend, "memory");
        assert_eq!(body.store.status, "connected");
        assert_eq!(body.store.last_data_update, NO_DATA_YET);
        assert_eq!(body.store.open_connections, None);
        assert!(body.last_poll.is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn reports_last_update_and_poll_outcome() {
        let clock = Arc::new(MutableClock::new(epoch()));
        let store = Arc::new(MemoryInventoryStore::new(clock.clone()));
        let outcome = store
            .reconcile(&snapshot("14.5", &["Safari"]))
            .await
            .expect("bootstrap");
        let poll_status = Arc::new(PollStatus::new());
        poll_status.record(PollReport {
            started_at: epoch(),
            finished_at: epoch(),
            result: PollResult::Succeeded {
                outcome: outcome.label(),
                generation: outcome.generation(),
            },
        });
        let state = HttpState::new(store, poll_status, clock);

        let body = get_status(state).await;

        assert_eq!(body.store.last_data_update, epoch().to_rfc3339());
        let last_poll = body.last_poll.expect("poll report");
        assert_eq!(last_poll.outcome, "bootstrapped");
        assert_eq!(last_poll.generation, Some(outcome.generation().get()));
        assert!(last_poll.error.is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn unavailable_store_still_answers() {
        let clock = Arc::new(MutableClock::new(epoch()));
        let mut store = MockInventoryStore::new();
        store
            .expect_latest()
            .returning(|| Err(InventoryStoreError::store_unavailable("refused")));
        store.expect_backend_name().return_const("postgres");
        store.expect_connection_stats().return_const(Some(ConnectionStats {
            connections: 3,
            idle_connections: 2,
        }));
        let poll_status = Arc::new(PollStatus::new());
        poll_status.record(PollReport {
            started_at: epoch(),
            finished_at: epoch(),
            result: PollResult::Failed {
                error: "fact collection timed out after 30s".to_owned(),
            },
        });
        let state = HttpState::new(Arc::new(store), poll_status, clock);

        let body = get_status(state).await;

        assert_eq!(body.store.status, "unavailable");
        assert_eq!(body.store.backend, "postgres");
        assert_eq!(body.store.open_connections, Some(3));
        assert_eq!(body.store.idle_connections, Some(2));
        let last_poll = body.last_poll.expect("poll report");
        assert_eq!(last_poll.outcome, "failed");
        assert_eq!(last_poll.generation, None);
    }

    #[rstest]
    fn failed_reports_carry_error_text() {
        let report = PollReport {
            started_at: epoch(),
            finished_at: epoch(),
            result: PollResult::Failed {
                error: "boom".to_owned(),
            },
        };

        let summary = LastPollStatus::from(report);

        assert_eq!(summary.outcome, "failed");
        assert_eq!(summary.error.as_deref(), Some("boom"));
    }
}
