//! Scheduled inventory collection.
//!
//! Each cycle collects raw facts, assembles a snapshot and reconciles it into
//! the store. Cycles run once immediately and then on a fixed interval until
//! the shutdown signal flips to `true`. Only the wait for the next tick is
//! raced against shutdown, so a reconcile that has started always finishes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::domain::assembler::{AssembleError, assemble};
use crate::domain::inventory::{GenerationId, ReconcileOutcome};
use crate::domain::ports::{FactSource, FactSourceError, InventoryStore, InventoryStoreError};

/// Timing for the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Delay between the start of consecutive cycles.
    pub interval: Duration,
    /// Upper bound on a single fact collection.
    pub fetch_timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

/// Why a poll cycle produced no reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    /// Collection exceeded the configured timeout; nothing was written.
    #[error("fact collection timed out after {timeout:?}")]
    FetchTimeout { timeout: Duration },
    #[error(transparent)]
    Source(#[from] FactSourceError),
    #[error(transparent)]
    Assemble(#[from] AssembleError),
    #[error(transparent)]
    Store(#[from] InventoryStoreError),
}

/// Result summary kept for the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult {
    Succeeded {
        outcome: &'static str,
        generation: GenerationId,
    },
    Failed {
        error: String,
    },
}

/// Timing and result of the most recent cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub result: PollResult,
}

/// Shared view of the last completed cycle.
#[derive(Debug)]
pub struct PollStatus {
    last: watch::Sender<Option<PollReport>>,
}

impl Default for PollStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl PollStatus {
    /// Status with no completed cycle.
    #[must_use]
    pub fn new() -> Self {
        let (last, _) = watch::channel(None);
        Self { last }
    }

    /// Replace the stored report.
    pub fn record(&self, report: PollReport) {
        self.last.send_replace(Some(report));
    }

    /// The most recent report, if any cycle has completed.
    #[must_use]
    pub fn last(&self) -> Option<PollReport> {
        self.last.borrow().clone()
    }
}

/// Drives collect, assemble and reconcile on a schedule.
pub struct InventoryPoller {
    source: Arc<dyn FactSource>,
    store: Arc<dyn InventoryStore>,
    clock: Arc<dyn Clock>,
    status: Arc<PollStatus>,
    config: PollerConfig,
}

impl InventoryPoller {
    /// Wire a poller around its collaborators.
    pub fn new(
        source: Arc<dyn FactSource>,
        store: Arc<dyn InventoryStore>,
        clock: Arc<dyn Clock>,
        status: Arc<PollStatus>,
        config: PollerConfig,
    ) -> Self {
        Self {
            source,
            store,
            clock,
            status,
            config,
        }
    }

    /// Run a single cycle and record its report.
    ///
    /// # Errors
    ///
    /// Returns [`PollError`] when collection times out or fails, when the
    /// identity facts are missing, or when the store rejects the snapshot.
    pub async fn run_once(&self) -> Result<ReconcileOutcome, PollError> {
        let started_at = self.clock.utc();
        let result = self.cycle().await;
        let report = PollReport {
            started_at,
            finished_at: self.clock.utc(),
            result: match &result {
                Ok(outcome) => PollResult::Succeeded {
                    outcome: outcome.label(),
                    generation: outcome.generation(),
                },
                Err(err) => PollResult::Failed {
                    error: err.to_string(),
                },
            },
        };
        self.status.record(report);
        result
    }

    async fn cycle(&self) -> Result<ReconcileOutcome, PollError> {
        let timeout = self.config.fetch_timeout;
        let raw = tokio::time::timeout(timeout, self.source.collect())
            .await
            .map_err(|_| PollError::FetchTimeout { timeout })??;
        let snapshot = assemble(&raw)?;
        debug!(
            apps = snapshot.apps.len(),
            os_version = %snapshot.identity.os_version,
            "assembled inventory snapshot"
        );
        Ok(self.store.reconcile(&snapshot).await?)
    }

    /// Poll until `shutdown` becomes `true` or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            interval_secs = self.config.interval.as_secs(),
            store = self.store.backend_name(),
            "inventory poller started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }
            log_cycle(&self.run_once().await);
        }

        info!("inventory poller stopped");
    }
}

fn log_cycle(result: &Result<ReconcileOutcome, PollError>) {
    match result {
        Ok(ReconcileOutcome::Bootstrapped {
            generation,
            inserted,
        }) => info!(%generation, inserted, "recorded new inventory generation"),
        Ok(ReconcileOutcome::Replaced {
            generation,
            archived,
            inserted,
        }) => info!(
            %generation,
            archived,
            inserted,
            "replaced active inventory"
        ),
        Ok(ReconcileOutcome::Unchanged { generation }) => {
            debug!(%generation, "inventory unchanged");
        }
        Err(PollError::Assemble(err)) => warn!(error = %err, "skipping poll cycle"),
        Err(err) => error!(error = %err, "inventory poll cycle failed"),
    }
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
