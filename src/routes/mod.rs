pub mod calculator;
pub mod posts;
pub mod profile;
pub mod session;
pub mod uploads;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Multipart framing on top of the image itself.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Full application router with its layers.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.uploads.max_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .merge(session::router())
        .merge(profile::router())
        .merge(posts::router())
        .merge(uploads::router())
        .merge(calculator::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
