use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::VisitorsFormat;
use crate::tracker::VisitTracker;

pub struct AppState {
    pub tracker: Arc<VisitTracker>,
    pub visitors_format: VisitorsFormat,
}

#[derive(Serialize)]
pub struct VisitorsResponse {
    pub users: Vec<VisitorEntry>,
}

#[derive(Serialize)]
pub struct VisitorEntry {
    pub id: i64,
    pub ip: String,
}

/// Acknowledge a visit from the connecting client
pub async fn ping(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<&'static str, (StatusCode, String)> {
    // The address is an opaque key; no normalization beyond dropping the port.
    let client_ip = addr.ip().to_string();

    match state.tracker.handle_ping(&client_ip).await {
        Ok(receipt) => {
            if receipt.new_visitor {
                tracing::info!(ip = %client_ip, "recorded new visitor");
            }
            Ok("pong")
        }
        Err(e) => {
            tracing::error!(ip = %client_ip, error = %e, "failed to record visit");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// Report the number of visits since the process started
pub async fn visits(State(state): State<Arc<AppState>>) -> String {
    state.tracker.visits_since_start().to_string()
}

/// List all recorded visitors, newline-separated or as JSON per config
pub async fn visitors(State(state): State<Arc<AppState>>) -> Response {
    let visitors = match state.tracker.list_visitors().await {
        Ok(visitors) => visitors,
        Err(e) => {
            tracing::error!(error = %e, "failed to list visitors");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    match state.visitors_format {
        VisitorsFormat::Text => {
            let mut body = visitors
                .iter()
                .map(|v| v.ip.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            if !body.is_empty() {
                body.push('\n');
            }
            body.into_response()
        }
        VisitorsFormat::Json => Json(VisitorsResponse {
            users: visitors
                .into_iter()
                .map(|v| VisitorEntry { id: v.id, ip: v.ip })
                .collect(),
        })
        .into_response(),
    }
}

/// Unrecognized paths (the root included) get an empty 404
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
