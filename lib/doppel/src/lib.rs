#![doc = include_str!("../README.md")]

use http::{HeaderMap, HeaderName, header};
use rand::RngCore;

pub use self::{
    future::ResponseFuture,
    handle::CsrfHandle,
    layer::CsrfLayer,
    newtypes::*,
    service::CsrfService,
    store::TokenStore,
};

mod future;
mod handle;
mod layer;
mod service;
mod store;

/// Request header the client echoes the token back through
pub static CSRF_HEADER_NAME: HeaderName = HeaderName::from_static("x-csrf-token");

/// Response header carrying a [`RejectionCode`] on `403` answers
pub static CSRF_ERROR_HEADER_NAME: HeaderName = HeaderName::from_static("x-csrf-error");

const DEFAULT_SESSION_COOKIE: &str = "SESSION_ID";
const TOKEN_LEN: usize = 32;

pub(crate) type SharedStore = std::sync::Arc<dyn TokenStore + Send + Sync>;

mod newtypes {
    /// Per-session anti-forgery token in its URL-safe Base64 form
    #[aliri_braid::braid]
    pub struct Token;

    /// Opaque session identifier read from the session cookie
    #[aliri_braid::braid]
    pub struct SessionId;
}

/// Machine-readable rejection identifiers
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::AsRefStr, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionCode {
    /// Token header absent on a request that required one
    CsrfTokenMissing,
    /// Token header present but not matching the session's token
    CsrfTokenInvalid,
}

pub(crate) fn generate_token() -> Token {
    let mut buf = [0_u8; TOKEN_LEN];
    rand::thread_rng().fill_bytes(&mut buf);

    base64_simd::URL_SAFE_NO_PAD.encode_to_string(buf).into()
}

/// Walk the `Cookie` headers for the named session cookie
///
/// Unparseable headers and cookies are skipped rather than bubbled up;
/// a request with a mangled cookie jar is simply anonymous.
pub fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<SessionId> {
    for header in headers.get_all(header::COOKIE) {
        let Ok(value_str) = header.to_str() else {
            continue;
        };

        for cookie in cookie::Cookie::split_parse_encoded(value_str) {
            let Ok(cookie) = cookie else {
                continue;
            };

            if cookie.name() == cookie_name && !cookie.value_trimmed().is_empty() {
                return Some(cookie.value_trimmed().into());
            }
        }
    }

    None
}
