//! HTTP endpoints.

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::summary::SummaryEntry;

pub const WELCOME_TEXT: &str = "Welcome to the Quiz Game Server!";

/// GET /
pub async fn root() -> &'static str {
    WELCOME_TEXT
}

/// Per-question correct respondents plus the final score table.
///
/// GET /summary
///
/// Always rebuilt from the stored answer log and score table.
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<Vec<SummaryEntry>> {
    let summary = state.summary();
    tracing::debug!("Serving summary with {} entries", summary.len());
    Json(summary)
}

/// All routes: WebSocket, summary and the root banner
pub fn router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/summary", get(get_summary))
        .route("/ws", get(crate::ws::ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for a single configured origin, or permissive when unset
pub fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin else {
        return CorsLayer::permissive();
    };
    match HeaderValue::from_str(origin) {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true),
        Err(e) => {
            tracing::warn!("Invalid CORS_ORIGIN {:?} ({}), allowing any origin", origin, e);
            CorsLayer::permissive()
        }
    }
}
