use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Session-lifetime counters for operational visibility.
#[derive(Clone, Default)]
pub struct SessionMetrics {
    pub connects_attempted: Arc<AtomicU64>,
    pub connects_succeeded: Arc<AtomicU64>,
    pub reconnects: Arc<AtomicU64>,
    pub quotes_requested: Arc<AtomicU64>,
    pub quotes_signed: Arc<AtomicU64>,
    pub quotes_rejected: Arc<AtomicU64>,
    pub depth_pushed: Arc<AtomicU64>,
    pub heartbeats_sent: Arc<AtomicU64>,
    pub inbound_parse_errors: Arc<AtomicU64>,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr(counter: &Arc<AtomicU64>) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_increment() {
        let metrics = SessionMetrics::new();
        assert_eq!(metrics.reconnects.load(Ordering::Relaxed), 0);
        SessionMetrics::incr(&metrics.reconnects);
        assert_eq!(metrics.reconnects.load(Ordering::Relaxed), 1);
    }
}
