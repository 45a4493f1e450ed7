//! Response rendering and store error translation.

use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use actix_web::http::header::{HeaderMap, RETRY_AFTER};
use rstest::rstest;
use serde_json::json;

use super::*;

const TRACE_ID: &str = "6f1c1f52-4a43-4c8e-9e3a-3d6f5c0f4b11";

async fn render(error: &Error) -> (StatusCode, HeaderMap, Error) {
    let response = error.error_response();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body())
        .await
        .expect("body is readable");
    let body = serde_json::from_slice(&bytes).expect("body is an error envelope");
    (status, headers, body)
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

#[rstest]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn each_code_has_a_status(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(error.status_code(), status);
}

#[actix_web::test]
async fn internal_message_and_details_are_hidden() {
    let error = Error::internal("relation installed_apps does not exist")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"sql": "SELECT 1"}));

    let (status, headers, body) = render(&error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.message(), "Internal server error");
    assert_eq!(body.trace_id(), Some(TRACE_ID));
    assert!(body.details().is_none());
    assert!(headers.get(RETRY_AFTER).is_none());
}

#[actix_web::test]
async fn unavailable_keeps_details_and_advises_retry() {
    let error = Error::service_unavailable("inventory store is unavailable")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"backend": "postgres"}));

    let (status, headers, body) = render(&error).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, error);
    assert_eq!(header_text(&headers, "retry-after"), Some("5"));
    assert_eq!(header_text(&headers, TRACE_ID_HEADER), Some(TRACE_ID));
}

#[actix_web::test]
async fn missing_trace_id_sets_no_header() {
    let (_, headers, body) = render(&Error::service_unavailable("inventory store is unavailable")).await;

    assert!(header_text(&headers, TRACE_ID_HEADER).is_none());
    assert_eq!(body.trace_id(), None);
}

#[rstest]
fn unreachable_store_is_unavailable() {
    let error = Error::from(InventoryStoreError::store_unavailable("pool timed out"));

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(error.message(), "inventory store is unavailable");
}

#[rstest]
#[case(InventoryStoreError::query("syntax error"))]
#[case(InventoryStoreError::transaction_failed("constraint violated"))]
fn other_store_errors_are_internal(#[case] store_error: InventoryStoreError) {
    let error = Error::from(store_error);

    assert_eq!(error.code(), ErrorCode::InternalError);
    assert_eq!(public_view(&error).message(), "Internal server error");
}

#[rstest]
fn actix_errors_become_redacted_internal_errors() {
    let error = Error::from(actix_web::error::ErrorBadRequest("boom"));

    assert_eq!(error.code(), ErrorCode::InternalError);
    assert_eq!(error.message(), "Internal server error");
}
