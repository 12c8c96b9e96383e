use crate::{SessionId, SessionIdRef, SharedStore, Token, generate_token};

/// Per-request handle to the session's anti-forgery token
///
/// Inserted into the request extensions by [`crate::CsrfService`] whenever
/// the request carries a session.
#[derive(Clone)]
pub struct CsrfHandle {
    pub(crate) store: SharedStore,
    pub(crate) session_id: SessionId,
}

impl CsrfHandle {
    /// Token bound to this session, minting one on first use
    pub fn token(&self) -> Token {
        self.store.get_or_insert(&self.session_id, generate_token())
    }

    /// Swap the session's token for a fresh one
    ///
    /// Call this on privilege changes, login success being the prime
    /// example, so a token leaked from the anonymous session is worthless
    /// afterwards.
    pub fn rotate(&self) -> Token {
        self.store.replace(&self.session_id, generate_token())
    }

    /// Compare a client-presented token against the stored one
    #[must_use]
    pub fn matches(&self, presented: &str) -> bool {
        self.store
            .get(&self.session_id)
            .is_some_and(|current| current.as_str() == presented)
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionIdRef {
        &self.session_id
    }
}

#[cfg(feature = "axum")]
mod axum_impl {
    use super::CsrfHandle;
    use axum_core::extract::FromRequestParts;
    use http::request::Parts;
    use std::convert::Infallible;

    impl<S> FromRequestParts<S> for CsrfHandle
    where
        S: Sync,
    {
        type Rejection = Infallible;

        async fn from_request_parts(
            parts: &mut Parts,
            _state: &S,
        ) -> Result<Self, Self::Rejection> {
            let handle = parts
                .extensions
                .get::<Self>()
                .expect("Service not wrapped by CSRF middleware")
                .clone();

            Ok(handle)
        }
    }
}
