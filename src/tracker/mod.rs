use crate::models::Visitor;
use crate::storage::{StoreResult, VisitorStore};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Outcome of one acknowledged ping.
#[derive(Debug, Clone, Copy)]
pub struct PingReceipt {
    pub new_visitor: bool,
    pub total_visits: u64,
}

/// Orchestrates one visit: novelty via the store, then the process-wide
/// counter.
///
/// The counter starts at zero on every boot and is never persisted, even
/// when the store itself is durable; it counts visits since process start.
pub struct VisitTracker {
    store: Arc<dyn VisitorStore>,
    visits: AtomicU64,
}

impl VisitTracker {
    pub fn new(store: Arc<dyn VisitorStore>) -> Self {
        Self {
            store,
            visits: AtomicU64::new(0),
        }
    }

    /// Record one visit from `client_id`.
    ///
    /// The counter is only incremented after the store accepts the visitor;
    /// a failed write must not count a visit that was never recorded.
    pub async fn handle_ping(&self, client_id: &str) -> StoreResult<PingReceipt> {
        let new_visitor = self.store.record_if_new(client_id, unix_now()).await?;
        let total_visits = self.visits.fetch_add(1, Ordering::Relaxed) + 1;

        Ok(PingReceipt {
            new_visitor,
            total_visits,
        })
    }

    /// Visits acknowledged since the process started.
    pub fn visits_since_start(&self) -> u64 {
        self.visits.load(Ordering::Relaxed)
    }

    pub async fn list_visitors(&self) -> StoreResult<Vec<Visitor>> {
        self.store.list_all().await
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
