use crate::models::Visitor;
use crate::storage::{StoreError, StoreResult, VisitorStore};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

pub struct PostgresStore {
    pub pool: Arc<PgPool>,
}

impl PostgresStore {
    /// The pool connects lazily: an unreachable database at startup leaves
    /// the process serving, with each store call failing until it recovers.
    pub fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(database_url)?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl VisitorStore for PostgresStore {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS visitors (
                id BIGSERIAL PRIMARY KEY,
                ip TEXT NOT NULL UNIQUE,
                first_seen BIGINT NOT NULL,
                last_seen BIGINT NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn record_if_new(&self, ip: &str, seen_at: i64) -> StoreResult<bool> {
        // One idempotent upsert, never check-then-insert: the unique
        // constraint resolves concurrent first visits from the same ip.
        // xmax is 0 only on freshly inserted rows.
        let (is_new,): (bool,) = sqlx::query_as(
            r#"
            INSERT INTO visitors (ip, first_seen, last_seen)
            VALUES ($1, $2, $2)
            ON CONFLICT (ip) DO UPDATE SET last_seen = EXCLUDED.last_seen
            RETURNING (xmax = 0) AS is_new
            "#,
        )
        .bind(ip)
        .bind(seen_at)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(write_error)?;

        Ok(is_new)
    }

    async fn list_all(&self) -> StoreResult<Vec<Visitor>> {
        let visitors = sqlx::query_as::<_, Visitor>(
            r#"
            SELECT id, ip, first_seen, last_seen
            FROM visitors
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(read_error)?;

        Ok(visitors)
    }
}

fn connection_lost(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
    )
}

fn write_error(err: sqlx::Error) -> StoreError {
    if connection_lost(&err) {
        StoreError::Unavailable(err.into())
    } else {
        StoreError::WriteFailed(err.into())
    }
}

fn read_error(err: sqlx::Error) -> StoreError {
    if connection_lost(&err) {
        StoreError::Unavailable(err.into())
    } else {
        StoreError::ReadFailed(err.into())
    }
}
