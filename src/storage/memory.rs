use crate::models::Visitor;
use crate::storage::{StoreResult, VisitorStore};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

/// In-process visitor set. Contents do not survive a restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    seen: HashSet<String>,
    // Insertion order doubles as the listing order.
    visitors: Vec<Visitor>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VisitorStore for MemoryStore {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn record_if_new(&self, ip: &str, seen_at: i64) -> StoreResult<bool> {
        // One lock spans the membership check and the insert, so two
        // first-time sightings of the same ip cannot both be told "new".
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if !inner.seen.insert(ip.to_string()) {
            if let Some(visitor) = inner.visitors.iter_mut().find(|v| v.ip == ip) {
                visitor.last_seen = seen_at;
            }
            return Ok(false);
        }

        let id = inner.visitors.len() as i64 + 1;
        inner.visitors.push(Visitor {
            id,
            ip: ip.to_string(),
            first_seen: seen_at,
            last_seen: seen_at,
        });

        Ok(true)
    }

    async fn list_all(&self) -> StoreResult<Vec<Visitor>> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner.visitors.clone())
    }
}
