// POST /api/v1/inference/graph: sentiment for every node and edge of a graph.
//
// Node ids must be unique and node texts within the configured length. Edges
// pointing at unknown nodes are not an error; they are left out of the result.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::graph::{validate_graph, Edge, Node};
use crate::web::{api_error, AppState};

#[derive(Debug, Deserialize)]
pub struct GraphRequest {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

pub async fn analyze_graph(
    State(state): State<AppState>,
    payload: Result<Json<GraphRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            return api_error(StatusCode::UNPROCESSABLE_ENTITY, &rejection.body_text())
        }
    };

    if let Err(e) = validate_graph(&body.nodes, state.config.max_text_length) {
        return e.into_response();
    }

    match state.analyzer.analyze_graph(&body.nodes, &body.edges).await {
        Ok(analysis) => Json(analysis).into_response(),
        Err(e) => e.into_response(),
    }
}
