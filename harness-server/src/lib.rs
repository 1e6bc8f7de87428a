mod handlers;
mod rate_limit;
mod response;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use harness_util::{Config, HarnessResult};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Assembles the HTTP router: the `/testing` action pipeline, an opaque
/// `/doc` surface, and an unconditional `/health` check, wrapped in
/// request tracing, panic recovery, a body-size cap, and per-IP rate
/// limiting.
pub fn router(config: Arc<Config>) -> Router {
    let state = AppState::new(config.clone());

    Router::new()
        .route("/testing", post(handlers::run_testing))
        .route("/doc/*path", get(handlers::serve_doc))
        .route_layer(axum::middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit::rate_limit_middleware,
        ))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(config.http.body_cap_bytes))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Loads configuration from `cli_path` (overlaid with environment
/// variables) and initializes the global tracing subscriber. Kept
/// separate from `router` so tests can build a router without touching
/// process-global logging state.
pub fn load_config(cli_path: Option<&PathBuf>) -> HarnessResult<Arc<Config>> {
    Config::load(cli_path.map(PathBuf::as_path))
}
