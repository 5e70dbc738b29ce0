// GET /api/v1/inference/health: model health check.
//
// Runs one real inference so a loaded-but-broken model shows up as 503
// instead of failing the first user request.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::web::{api_error, AppState};

const HEALTH_CHECK_TEXT: &str = "Test health check";

pub async fn model_health(State(state): State<AppState>) -> Response {
    match state.analyzer.analyze_text(Some(HEALTH_CHECK_TEXT)).await {
        Ok(result) => Json(serde_json::json!({
            "status": "healthy",
            "model": state.analyzer.model_name(),
            "test_inference": result,
        }))
        .into_response(),
        Err(e) => {
            error!(error = %e, "Model health check failed");
            api_error(StatusCode::SERVICE_UNAVAILABLE, "Model not healthy")
        }
    }
}
