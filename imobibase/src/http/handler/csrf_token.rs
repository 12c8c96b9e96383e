use axum::Json;
use doppel::CsrfHandle;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfTokenResponse {
    csrf_token: String,
}

/// Hand out the session's token so clients can set their request header
///
/// Issuing happens lazily; the first call on a fresh session mints the
/// token this returns.
pub async fn get(handle: CsrfHandle) -> Json<CsrfTokenResponse> {
    Json(CsrfTokenResponse {
        csrf_token: handle.token().to_string(),
    })
}
