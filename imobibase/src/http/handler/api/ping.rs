use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct PingResponse {
    pong: bool,
}

/// Mutating probe endpoint, mostly useful to exercise the CSRF guard
pub async fn post() -> Json<PingResponse> {
    Json(PingResponse { pong: true })
}
