// Auth middleware: shared API key in the X-API-Key header.
//
// A single key (MOODGRAPH_API_KEY) guards the inference routes. A missing or
// wrong key is rejected with 403 before the handler runs. `serve` refuses to
// start without a key, so an empty configured key never matches.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use super::AppState;

/// Request header carrying the API key (header names are case-insensitive).
pub const API_KEY_HEADER: &str = "x-api-key";

/// Axum middleware: reject requests without the configured API key with 403.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !has_valid_key(&request, &state.config.api_key) {
        warn!(path = %request.uri().path(), "Rejected request with missing or invalid API key");
        return super::api_error(StatusCode::FORBIDDEN, "Invalid API key");
    }
    next.run(request).await
}

fn has_valid_key(request: &Request, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    match request.headers().get(API_KEY_HEADER).map(|v| v.to_str()) {
        Some(Ok(provided)) => constant_time_eq(provided, expected),
        _ => false,
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
