//! HTTP inbound adapter exposing the inventory read surface.

pub mod cache_control;
pub mod error;
pub mod health;
pub mod inventory;
pub mod schemas;
pub mod state;
pub mod status;

pub use error::ApiResult;

use actix_web::web;

/// Register every endpoint. Handlers expect `web::Data<HttpState>` and
/// `web::Data<HealthState>` in the app data.
///
/// [`HttpState`]: state::HttpState
/// [`HealthState`]: health::HealthState
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(inventory::latest_data)
        .service(status::status)
        .service(health::ready)
        .service(health::live);
}
