//! Supervisor (C6): owns the Session; reconnects with capped exponential
//! backoff, resetting the delay on every clean `LIVE` transition. Grounded
//! in the teacher's `spawn_ws_feed` backoff loop
//! (`backoff_ms = (backoff_ms * 2).min(30_000)`), extended to the 60s cap
//! and 1s floor this protocol specifies.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;
use tracing::{error, info};

use crate::telemetry::metrics::SessionMetrics;

use super::engine::Session;

const INITIAL_BACKOFF_MS: u64 = 1_000;
const MAX_BACKOFF_MS: u64 = 60_000;

pub struct Supervisor {
    session: Session,
    metrics: SessionMetrics,
}

impl Supervisor {
    pub fn new(session: Session, metrics: SessionMetrics) -> Self {
        Self { session, metrics }
    }

    /// Runs until `shutdown` fires. Each iteration is one connection
    /// attempt; a fatal error triggers a capped-exponential sleep before
    /// the next attempt.
    pub async fn run(&self, shutdown_tx: &broadcast::Sender<()>) {
        let mut shutdown = shutdown_tx.subscribe();
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            SessionMetrics::incr(&self.metrics.connects_attempted);
            let reached_live = AtomicBool::new(false);
            match self.session.run_once(shutdown_tx, &reached_live).await {
                Ok(()) => {
                    info!("session stopped cleanly");
                    return;
                }
                Err(e) => {
                    error!(error = %e, "session ended with a fatal error");
                    SessionMetrics::incr(&self.metrics.reconnects);
                    if reached_live.load(Ordering::Relaxed) {
                        backoff_ms = INITIAL_BACKOFF_MS;
                    }
                }
            }

            info!(delay_ms = backoff_ms, "reconnecting after backoff");
            tokio::select! {
                _ = tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)) => {}
                _ = shutdown.recv() => return,
            }
            backoff_ms = next_backoff(backoff_ms);
        }
    }
}

fn next_backoff(current_ms: u64) -> u64 {
    (current_ms * 2).min(MAX_BACKOFF_MS)
}
