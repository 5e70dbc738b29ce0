// Web server: Axum-based inference API.
//
// Routes under /api/v1/inference serve JSON. /predict and /graph require the
// shared API key in the X-API-Key header; both health checks are public.
//
// The analyzer (preprocessor + classifier) is built once before the server
// starts and shared by every request through AppState.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::SentimentError;
use crate::graph::SentimentAnalyzer;

pub mod auth;
pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<SentimentAnalyzer>,
    pub config: Arc<Config>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(
    config: Config,
    analyzer: Arc<SentimentAnalyzer>,
    port: u16,
    bind: &str,
) -> Result<()> {
    let state = AppState {
        analyzer,
        config: Arc::new(config),
    };

    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("moodgraph inference API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    // Inference routes (require X-API-Key)
    let protected_api = Router::new()
        .route("/api/v1/inference/predict", post(handlers::predict::predict))
        .route("/api/v1/inference/graph", post(handlers::graph::analyze_graph))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    // Public routes (no auth)
    let public_api = Router::new()
        .route("/health", get(health))
        .route("/api/v1/inference/health", get(handlers::health::model_health));

    Router::new()
        .merge(protected_api)
        .merge(public_api)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    HeaderName::from_static(auth::API_KEY_HEADER),
                ]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness check: always returns 200 OK, never touches the model.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}

impl IntoResponse for SentimentError {
    fn into_response(self) -> Response {
        let status = match &self {
            SentimentError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SentimentError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SentimentError::ModelLoad(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        if status.is_server_error() {
            error!(error = %self, "Inference request failed");
        } else {
            warn!(error = %self, "Rejected inference request");
        }
        api_error(status, &self.to_string())
    }
}
