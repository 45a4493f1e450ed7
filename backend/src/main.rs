//! Service entry point: loads settings, picks the inventory store, starts the
//! poller and serves HTTP until a shutdown signal arrives.

mod server;

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use hostwatch::HostwatchSettings;
use hostwatch::domain::ports::InventoryStore;
use hostwatch::domain::{InventoryPoller, PollStatus};
use hostwatch::inbound::http::health::HealthState;
use hostwatch::outbound::memory::MemoryInventoryStore;
use hostwatch::outbound::osquery::OsqueryShellSource;
use hostwatch::outbound::persistence::{DbPool, DieselInventoryStore, PoolConfig, apply_schema};
use server::{ServerConfig, create_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = HostwatchSettings::load()
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let store = build_store(&settings, clock.clone()).await?;

    let poll_status = Arc::new(PollStatus::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = InventoryPoller::new(
        Arc::new(OsqueryShellSource::new(settings.osquery_binary())),
        store.clone(),
        clock.clone(),
        poll_status.clone(),
        settings.poller_config(),
    );
    let poller_task = tokio::spawn(poller.run(shutdown_rx));

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(settings.bind_addr()?, store, poll_status, clock);
    let server = create_server(health_state.clone(), config)?;

    let handle = server.handle();
    let signal_health = health_state.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("shutdown requested");
        signal_health.mark_unhealthy();
        shutdown_tx.send_replace(true);
        handle.stop(true).await;
    });

    let result = server.await;
    health_state.mark_unhealthy();
    if let Err(error) = poller_task.await {
        warn!(%error, "poller task ended abnormally");
    }
    info!("shutdown complete");
    result
}

async fn build_store(
    settings: &HostwatchSettings,
    clock: Arc<dyn Clock>,
) -> std::io::Result<Arc<dyn InventoryStore>> {
    let Some(url) = settings.database_url() else {
        warn!("no database URL configured; inventory is kept in memory");
        return Ok(Arc::new(MemoryInventoryStore::new(clock)));
    };

    if settings.apply_schema {
        apply_schema(url).await.map_err(std::io::Error::other)?;
    }
    let pool = DbPool::new(
        PoolConfig::new(url).with_max_size(settings.database_max_connections()),
    )
    .await
    .map_err(std::io::Error::other)?;
    Ok(Arc::new(DieselInventoryStore::new(pool, clock)))
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
                return;
            }
            Err(error) => warn!(%error, "SIGTERM handler unavailable; listening for SIGINT only"),
        }
    }

    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for SIGINT");
        std::future::pending::<()>().await;
    }
}
