use crate::service::session::Sessions;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use cookie::{Cookie, SameSite};
use doppel::session_id_from_headers;
use http::{header, HeaderValue};

/// Guarantee that every request runs under a live session
///
/// A cookie pointing at a dead or unknown session is replaced instead of
/// adopted, so clients cannot pick their own session identifiers.
pub async fn ensure_session(
    State(sessions): State<Sessions>,
    mut request: Request,
    next: Next,
) -> Response {
    let presented = session_id_from_headers(request.headers(), sessions.cookie_name());

    let (session_id, is_fresh) = match presented {
        Some(session_id) if sessions.contains(&session_id) => (session_id, false),
        _ => (sessions.create(), true),
    };

    if is_fresh {
        // Rewrite the cookie header so everything downstream, the CSRF
        // layer included, sees the session that actually exists.
        let value = format!("{}={}", sessions.cookie_name(), session_id);
        request
            .headers_mut()
            .insert(header::COOKIE, HeaderValue::from_str(&value).unwrap());
    }

    let mut response = next.run(request).await;

    if is_fresh {
        let cookie = Cookie::build((sessions.cookie_name().to_string(), session_id.to_string()))
            .http_only(true)
            .path("/")
            .same_site(SameSite::Lax)
            .secure(sessions.secure_cookies())
            .build();

        response.headers_mut().append(
            header::SET_COOKIE,
            HeaderValue::from_str(&cookie.encoded().to_string()).unwrap(),
        );
    }

    response
}
