use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub visitors_format: VisitorsFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Connection string; only read by the postgres backend.
    pub database_url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Body shape of the `/visitors` listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitorsFormat {
    Text,
    Json,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend_str = std::env::var("STORE_BACKEND").unwrap_or_else(|_| "memory".to_string());

        let backend = match backend_str.to_lowercase().as_str() {
            "postgres" | "postgresql" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => {
                tracing::warn!(
                    "Unknown STORE_BACKEND '{other}', falling back to 'memory'. Supported values: memory, postgres"
                );
                StoreBackend::Memory
            }
        };

        let database_url = if matches!(backend, StoreBackend::Postgres) {
            std::env::var("DATABASE_URL")
                .context("DATABASE_URL must be set when STORE_BACKEND=postgres")?
        } else {
            std::env::var("DATABASE_URL").unwrap_or_default()
        };

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let format_str = std::env::var("VISITORS_FORMAT").unwrap_or_else(|_| "text".to_string());

        let visitors_format = match format_str.to_lowercase().as_str() {
            "json" => VisitorsFormat::Json,
            "text" => VisitorsFormat::Text,
            other => {
                tracing::warn!(
                    "Unknown VISITORS_FORMAT '{other}', falling back to 'text'. Supported values: text, json"
                );
                VisitorsFormat::Text
            }
        };

        Ok(Config {
            store: StoreConfig {
                backend,
                database_url,
                max_connections,
            },
            server: ServerConfig { host, port },
            visitors_format,
        })
    }
}
