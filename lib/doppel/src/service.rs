use crate::{
    CsrfHandle, RejectionCode, ResponseFuture, SharedStore, layer::Config, session_id_from_headers,
};
use http::{Method, Request, Response};
use std::task::{self, Poll};
use tower::Service;
use triomphe::Arc;

#[derive(Clone)]
pub struct CsrfService<S> {
    inner: S,
    store: SharedStore,
    config: Arc<Config>,
}

impl<S> CsrfService<S> {
    pub(crate) fn new(inner: S, store: SharedStore, config: Arc<Config>) -> Self {
        Self {
            inner,
            store,
            config,
        }
    }
}

fn is_safe_method(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CsrfService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    ResBody: Default,
{
    type Error = S::Error;
    type Future = ResponseFuture<S::Future>;
    type Response = S::Response;

    fn poll_ready(&mut self, cx: &mut task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let handle = session_id_from_headers(req.headers(), &self.config.session_cookie).map(
            |session_id| CsrfHandle {
                store: SharedStore::clone(&self.store),
                session_id,
            },
        );

        if let Some(ref handle) = handle {
            // Touching the token here issues one on the very first request
            // of a session, so even a plain GET primes the client.
            let _ = handle.token();
            req.extensions_mut().insert(handle.clone());
        }

        if is_safe_method(req.method()) || self.config.is_exempt(req.uri().path()) {
            return ResponseFuture::Inner {
                future: self.inner.call(req),
            };
        }

        let Some(presented) = req.headers().get(&self.config.header_name) else {
            return ResponseFuture::Reject {
                code: RejectionCode::CsrfTokenMissing,
            };
        };

        let verified = handle.as_ref().is_some_and(|handle| {
            presented
                .to_str()
                .is_ok_and(|presented| handle.matches(presented))
        });

        if verified {
            ResponseFuture::Inner {
                future: self.inner.call(req),
            }
        } else {
            ResponseFuture::Reject {
                code: RejectionCode::CsrfTokenInvalid,
            }
        }
    }
}
