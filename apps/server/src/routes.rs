//! HTTP routes: query answering, health, and static frontend serving.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info};

use bookdesk_completion::CompletionClient;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Shared request-handler state. The book context is loaded once at startup
/// and never mutated afterwards.
#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<StateInner>,
}

struct StateInner {
    context: String,
    completion: CompletionClient,
}

impl AppState {
    pub(crate) fn new(context: String, completion: CompletionClient) -> Self {
        Self {
            inner: Arc::new(StateInner {
                context,
                completion,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the application router.
pub(crate) fn router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/query", post(query))
        .fallback_service(ServeDir::new(static_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct QueryRequest {
    #[serde(default)]
    query: String,
}

#[derive(Serialize)]
struct QueryResponse {
    success: bool,
    result: String,
    query: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    context_loaded: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        context_loaded: !state.inner.context.is_empty(),
    })
}

async fn query(State(state): State<AppState>, Json(request): Json<QueryRequest>) -> Response {
    if request.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                success: false,
                error: "empty query".into(),
            }),
        )
            .into_response();
    }

    info!(query = %request.query, "processing query");

    match state
        .inner
        .completion
        .ask(&state.inner.context, &request.query)
        .await
    {
        Ok(result) => Json(QueryResponse {
            success: true,
            result,
            query: request.query,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    success: false,
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
