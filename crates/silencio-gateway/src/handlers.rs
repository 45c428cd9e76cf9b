use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use crate::handler::QuestionHandler;

#[derive(Clone)]
pub(crate) struct AppState {
    pub handler: Arc<dyn QuestionHandler>,
    pub started_at: Instant,
}

impl AppState {
    pub(crate) fn new(handler: Arc<dyn QuestionHandler>) -> Self {
        Self {
            handler,
            started_at: Instant::now(),
        }
    }
}

/// Upper bound on `top_k` accepted from clients.
pub(crate) const MAX_TOP_K: usize = 50;

#[derive(serde::Deserialize)]
pub(crate) struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    records: usize,
}

pub(crate) async fn ask_handler(
    State(state): State<AppState>,
    Json(payload): Json<AskRequest>,
) -> impl IntoResponse {
    let top_k = payload.top_k.map(|k| k.min(MAX_TOP_K));
    let reply = state.handler.ask(&payload.question, top_k).await;
    tracing::debug!(outcome = %reply.outcome, "gateway answered");
    Json(reply)
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
        records: state.handler.records(),
    })
}
