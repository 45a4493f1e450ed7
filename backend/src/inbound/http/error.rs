//! HTTP rendering of the domain error envelope.
//!
//! Status codes derive from [`ErrorCode`]. Internal errors are logged with
//! their full message and replaced by a generic one before leaving the
//! process. Unavailability responses advise a retry interval.

use actix_web::http::StatusCode;
use actix_web::http::header::{self, HeaderValue};
use actix_web::{HttpResponse, ResponseError};
use tracing::error;

use crate::domain::ports::InventoryStoreError;
use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

use super::cache_control::INITIALIZING_RETRY_AFTER_SECS;

/// Handler result carrying the domain error envelope.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

const fn http_status(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The envelope as clients see it.
fn public_view(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal(REDACTED_MESSAGE);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        http_status(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id));
        }
        if self.code() == ErrorCode::ServiceUnavailable {
            response.insert_header((
                header::RETRY_AFTER,
                HeaderValue::from(INITIALIZING_RETRY_AFTER_SECS),
            ));
        }
        response.json(public_view(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "unhandled actix error");
        Self::internal(REDACTED_MESSAGE)
    }
}

impl From<InventoryStoreError> for Error {
    fn from(err: InventoryStoreError) -> Self {
        if let InventoryStoreError::StoreUnavailable { message } = &err {
            error!(%message, "inventory store unavailable");
            return Self::service_unavailable("inventory store is unavailable");
        }
        error!(error = %err, "inventory read failed");
        Self::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests;
