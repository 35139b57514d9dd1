//! Axum router construction for the observer.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the observer router.
///
/// Every route is a `GET`; the observer never mutates the store. CORS is
/// open so external dashboards can read the JSON API.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Pages
        .route("/", get(handlers::index))
        .route("/topic", get(handlers::topic_root))
        .route("/topic/", get(handlers::topic_root))
        .route("/topic/{*location}", get(handlers::topic_page))
        // JSON API
        .route("/api/topics", get(handlers::list_topics))
        .route("/api/topics/{*location}", get(handlers::get_topic))
        .route("/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
