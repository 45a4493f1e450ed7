//! HTTP server assembly for the binary.

mod config;

pub use config::ServerConfig;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use tracing::info;

use hostwatch::Trace;
use hostwatch::inbound::http::configure;
use hostwatch::inbound::http::health::HealthState;
use hostwatch::inbound::http::state::HttpState;

#[cfg(debug_assertions)]
fn api_docs(cfg: &mut web::ServiceConfig) {
    use hostwatch::ApiDoc;
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    cfg.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
}

#[cfg(not(debug_assertions))]
fn api_docs(_cfg: &mut web::ServiceConfig) {}

/// Bind the listener and start serving.
///
/// Signal handling stays with the caller, which stops the server through the
/// returned [`Server`]'s handle. The probe state is marked ready once bound.
///
/// # Errors
///
/// Returns the bind error when the address is unavailable.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let backend = config.store.backend_name();
    let bind_addr = config.bind_addr;
    let http_state = web::Data::new(HttpState::new(
        config.store,
        config.poll_status,
        config.clock,
    ));
    let probes = health_state.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(probes.clone())
            .app_data(http_state.clone())
            .wrap(Trace)
            .configure(configure)
            .configure(api_docs)
    })
    .disable_signals()
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, backend, "inventory API listening");
    health_state.mark_ready();
    Ok(server)
}
