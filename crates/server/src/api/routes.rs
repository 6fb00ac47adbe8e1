use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{convert, handlers, middleware::auth_middleware, middleware::metrics_middleware};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.config().server.max_upload_bytes;

    // Conversion routes, behind the bearer gate
    let protected = Router::new()
        .route("/convert", post(convert::convert))
        .route("/convert-url", post(convert::convert_url))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .merge(protected)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
