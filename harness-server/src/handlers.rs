use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use harness_actions::{decode_batch, run_batch, Action};
use sandbox_client::Sandbox;
use serde::Deserialize;

use crate::response::error_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TestingRequest {
    pub protocol: Option<String>,
    pub actions: Vec<Action>,
}

/// Owns a [`Sandbox`] and guarantees its working directory is removed even
/// if the action pipeline panics: `Drop` hands teardown to a detached task,
/// since `Drop` itself cannot `.await`.
struct SandboxGuard(Option<Sandbox>);

impl SandboxGuard {
    fn new(sandbox: Sandbox) -> Self {
        Self(Some(sandbox))
    }

    fn get_mut(&mut self) -> &mut Sandbox {
        self.0.as_mut().expect("sandbox taken before guard dropped")
    }

    async fn finish(mut self) {
        if let Some(sandbox) = self.0.take() {
            sandbox.teardown().await;
        }
    }
}

impl Drop for SandboxGuard {
    fn drop(&mut self) {
        if let Some(sandbox) = self.0.take() {
            tokio::spawn(async move { sandbox.teardown().await });
        }
    }
}

/// `POST /testing`: decodes and validates the whole action batch atomically,
/// then spins up a sandbox, runs the batch in order, and tears the sandbox
/// down unconditionally before responding. A panic anywhere in the pipeline
/// is caught by the `catch_panic` middleware at the router level; this
/// guard still runs teardown on that path via its `Drop` impl.
pub async fn run_testing(State(state): State<AppState>, Json(request): Json<TestingRequest>) -> Response {
    let decoded = match decode_batch(request.actions) {
        Ok(decoded) => decoded,
        Err(err) => return error_response(&err),
    };

    let sandbox = match Sandbox::new(state.config.clone(), request.protocol) {
        Ok(sandbox) => sandbox,
        Err(err) => return error_response(&err),
    };
    let mut guard = SandboxGuard::new(sandbox);

    if let Err(err) = guard.get_mut().bootstrap().await {
        guard.finish().await;
        return error_response(&err);
    }

    let results = run_batch(guard.get_mut(), decoded).await;
    guard.finish().await;

    Json(results).into_response()
}

/// Placeholder for the harness's own documentation surface. Content is
/// intentionally out of scope here.
pub async fn serve_doc() -> Response {
    (
        axum::http::StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain")],
        "documentation is served separately",
    )
        .into_response()
}

pub async fn health() -> Response {
    Json(serde_json::json!({ "status": "ok" })).into_response()
}
