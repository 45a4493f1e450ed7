//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint and the schema wrappers from
//! [`crate::inbound::http::schemas`]. Swagger UI serves it in debug builds and
//! the `openapi-dump` binary prints it for external tooling.

use utoipa::OpenApi;

use crate::inbound::http::health::ProbeResponse;
use crate::inbound::http::inventory::{
    InitializingResponse, InstalledAppResponse, LatestDataResponse, OsVersionResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::status::{LastPollStatus, ProcessStatus, StatusResponse, StoreStatus};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hostwatch API",
        description = "Current host inventory, service status and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::inventory::latest_data,
        crate::inbound::http::status::status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        LatestDataResponse,
        OsVersionResponse,
        InstalledAppResponse,
        InitializingResponse,
        StatusResponse,
        ProcessStatus,
        StoreStatus,
        LastPollStatus,
        ProbeResponse,
        ErrorSchema,
        ErrorCodeSchema,
    )),
    tags(
        (name = "inventory", description = "Installed applications and OS identity"),
        (name = "health", description = "Probes and operational status")
    )
)]
pub struct ApiDoc;
