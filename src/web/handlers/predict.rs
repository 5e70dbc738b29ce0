// POST /api/v1/inference/predict: sentiment of a single text.
//
// The response is always graph-shaped: one node, no edges. With a node_id the
// node keeps that id and is tagged inference_type=node_sentiment; without one
// it is "temp_node" tagged text_sentiment.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::graph::{validate_text, Metadata};
use crate::output::truncate_chars;
use crate::web::{api_error, AppState};

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub text: String,
    pub node_id: Option<String>,
    pub context: Option<String>,
    pub metadata: Option<Metadata>,
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            return api_error(StatusCode::UNPROCESSABLE_ENTITY, &rejection.body_text())
        }
    };

    if let Err(e) = validate_text(&body.text, state.config.max_text_length) {
        return e.into_response();
    }

    info!(
        text_preview = %truncate_chars(&body.text, 50),
        node_id = body.node_id.as_deref().unwrap_or("-"),
        "Inference requested"
    );

    match state
        .analyzer
        .analyze_single(
            &body.text,
            body.node_id.as_deref(),
            body.context.as_deref(),
            body.metadata,
        )
        .await
    {
        Ok(analysis) => Json(analysis).into_response(),
        Err(e) => e.into_response(),
    }
}
