use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One distinct client, keyed by its observed network address.
///
/// `first_seen`/`last_seen` are unix epoch seconds. The memory backend
/// assigns `id` in insertion order so both backends present the same shape.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Visitor {
    pub id: i64,
    pub ip: String,
    pub first_seen: i64,
    pub last_seen: i64,
}
