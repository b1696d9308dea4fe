use crate::models::Visitor;
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("visitor store unavailable")]
    Unavailable(#[source] anyhow::Error),
    #[error("failed to record visitor")]
    WriteFailed(#[source] anyhow::Error),
    #[error("failed to list visitors")]
    ReadFailed(#[source] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait VisitorStore: Send + Sync {
    /// Initialize the storage (create tables, etc.)
    async fn init(&self) -> Result<()>;

    /// Record `ip` if it has not been seen before, refreshing its last-seen
    /// timestamp otherwise. Returns `true` iff this call inserted the entry.
    ///
    /// Concurrent calls with the same `ip` must leave exactly one entry
    /// behind, with exactly one caller told it was new.
    async fn record_if_new(&self, ip: &str, seen_at: i64) -> StoreResult<bool>;

    /// All recorded visitors, in the order they were first seen.
    /// All-or-error: a failed read never yields a partial listing.
    async fn list_all(&self) -> StoreResult<Vec<Visitor>>;
}
