use crate::service::session::Sessions;
use axum::extract::State;
use axum_extra::extract::CookieJar;
use cookie::Cookie;
use doppel::CsrfHandle;
use http::StatusCode;

/// Destroy the session outright
///
/// The CSRF token dies with the session; there is deliberately no rotation
/// here, the next session starts from a clean slate anyway.
#[instrument(skip_all)]
pub async fn post(
    State(sessions): State<Sessions>,
    csrf_handle: CsrfHandle,
    cookies: CookieJar,
) -> (CookieJar, StatusCode) {
    sessions.destroy(csrf_handle.session_id());

    let removal = Cookie::build((sessions.cookie_name().to_string(), ""))
        .path("/")
        .build();

    (cookies.remove(removal), StatusCode::NO_CONTENT)
}
