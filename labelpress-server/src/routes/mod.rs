use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod health;
pub mod history;
pub mod print;

/// All routes, no middleware, no state.
pub fn build_router() -> Router<AppState> {
    Router::new()
        // Submission API
        .merge(print::router())
        // History API
        .merge(history::router())
        // Health API
        .merge(health::router())
}

/// Fully configured application with middleware and state.
pub fn build_app(state: AppState) -> Router {
    build_router()
        // CORS - the operator's browser automation runs on another origin
        .layer(CorsLayer::permissive())
        // Trace - request logging at INFO level
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
