use std::{sync::Arc, time::Duration};

use axum::{
    http::{header, Method, StatusCode},
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    db::Cache,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{Authenticator, RecommendationService},
};

pub mod recommendations;

/// Shared application state
pub struct AppState {
    pub recommendations: RecommendationService,
    pub authenticator: Arc<dyn Authenticator>,
    /// Response cache; `None` computes every request
    pub cache: Option<Cache>,
    pub cache_ttl_secs: u64,
    pub request_timeout: Duration,
}

/// Creates the application router with all routes and layers
pub fn create_router(state: Arc<AppState>) -> Router {
    let request_timeout = state.request_timeout;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        // Outermost first: the request id must exist before the trace span opens
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(cors)
                .layer(TimeoutLayer::new(request_timeout)),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recommendations/items", get(recommendations::recommend_items))
        .route(
            "/recommendations/creators",
            get(recommendations::recommend_creators),
        )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
