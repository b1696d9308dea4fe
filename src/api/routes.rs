use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::VisitorsFormat;
use crate::tracker::VisitTracker;

use super::handlers::{not_found, ping, visitors, visits, AppState};

pub fn create_router(tracker: Arc<VisitTracker>, visitors_format: VisitorsFormat) -> Router {
    let state = Arc::new(AppState {
        tracker,
        visitors_format,
    });

    Router::new()
        .route("/ping", get(ping))
        .route("/visits", get(visits))
        .route("/visitors", get(visitors))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
