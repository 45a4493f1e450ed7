//! Tests for the current inventory endpoint.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::{fixture, rstest};
use serde_json::Value;

use super::*;
use crate::domain::PollStatus;
use crate::domain::ports::{InventoryStore, InventoryStoreError, MockInventoryStore};
use crate::outbound::memory::MemoryInventoryStore;
use crate::test_support::clock::MutableClock;
use crate::test_support::inventory::{app, epoch, snapshot};

#[fixture]
fn clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::new(epoch()))
}

fn state_for(store: Arc<dyn InventoryStore>, clock: Arc<MutableClock>) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(store, Arc::new(PollStatus::new()), clock))
}

async fn get_latest(state: web::Data<HttpState>) -> actix_web::dev::ServiceResponse {
    let app = actix_test::init_service(App::new().app_data(state).service(latest_data)).await;
    let req = actix_test::TestRequest::get()
        .uri("/api/latest_data")
        .to_request();
    actix_test::call_service(&app, req).await
}

fn header_value<'a>(res: &'a actix_web::dev::ServiceResponse, name: &str) -> Option<&'a str> {
    res.headers().get(name).and_then(|value| value.to_str().ok())
}

#[rstest]
#[actix_web::test]
async fn empty_store_reports_initializing(clock: Arc<MutableClock>) {
    let store = Arc::new(MemoryInventoryStore::new(clock.clone()));

    let res = get_latest(state_for(store, clock)).await;

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(header_value(&res, "Retry-After"), Some("5"));
    assert_eq!(header_value(&res, "Cache-Control"), Some("max-age=5"));
    let body: InitializingResponse = actix_test::read_body_json(res).await;
    assert_eq!(body.status, "initializing");
    assert!(!body.message.is_empty());
}

#[rstest]
#[actix_web::test]
async fn ready_store_returns_inventory_in_display_order(clock: Arc<MutableClock>) {
    let store = Arc::new(MemoryInventoryStore::new(clock.clone()));
    let mut observed = snapshot("14.5", &[]);
    let mut notes = app("Notes");
    notes.last_opened_time = 100.0;
    let mut safari = app("Safari");
    safari.last_opened_time = 300.0;
    let mut mail = app("Mail");
    mail.last_opened_time = 100.0;
    observed.apps = vec![notes, safari, mail];
    store.reconcile(&observed).await.expect("bootstrap");

    let res = get_latest(state_for(store, clock)).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(header_value(&res, "Cache-Control"), Some("no-cache"));
    let body: LatestDataResponse = actix_test::read_body_json(res).await;
    assert_eq!(body.os_version.name, "macOS");
    assert_eq!(body.os_version.version, "14.5");
    assert_eq!(body.os_version.platform, "mac");
    assert_eq!(body.osquery_version, "5.1");
    assert_eq!(body.last_updated, epoch().to_rfc3339());
    let names: Vec<&str> = body
        .installed_apps
        .iter()
        .map(|app| app.name.as_str())
        .collect();
    assert_eq!(names, ["Safari", "Mail", "Notes"]);
}

#[rstest]
#[actix_web::test]
async fn blank_attributes_are_omitted_from_json(clock: Arc<MutableClock>) {
    let store = Arc::new(MemoryInventoryStore::new(clock.clone()));
    let mut observed = snapshot("14.5", &["Terminal"]);
    if let Some(terminal) = observed.apps.first_mut() {
        terminal.minimum_system_version.clear();
        terminal.last_opened_time = 0.0;
    }
    store.reconcile(&observed).await.expect("bootstrap");

    let res = get_latest(state_for(store, clock)).await;

    let body: Value = actix_test::read_body_json(res).await;
    let terminal = &body["installed_apps"][0];
    assert_eq!(terminal["name"], "Terminal");
    assert!(terminal.get("minimum_system_version").is_none());
    assert!(terminal.get("last_opened_time").is_none());
    assert!(terminal.get("end_time").is_none());
}

#[rstest]
#[actix_web::test]
async fn unreachable_store_maps_to_service_unavailable(clock: Arc<MutableClock>) {
    let mut store = MockInventoryStore::new();
    store
        .expect_latest()
        .times(1)
        .returning(|| Err(InventoryStoreError::store_unavailable("pool timed out")));

    let res = get_latest(state_for(Arc::new(store), clock)).await;

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: crate::domain::Error = actix_test::read_body_json(res).await;
    assert_eq!(body.code(), crate::domain::ErrorCode::ServiceUnavailable);
    assert!(!body.message().contains("pool timed out"));
}

#[rstest]
#[actix_web::test]
async fn failed_reads_are_redacted(clock: Arc<MutableClock>) {
    let mut store = MockInventoryStore::new();
    store
        .expect_latest()
        .returning(|| Err(InventoryStoreError::query("relation does not exist")));

    let res = get_latest(state_for(Arc::new(store), clock)).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: crate::domain::Error = actix_test::read_body_json(res).await;
    assert_eq!(body.message(), "Internal server error");
}
