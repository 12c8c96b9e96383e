use crate::{CSRF_HEADER_NAME, CsrfService, DEFAULT_SESSION_COOKIE, SharedStore, TokenStore};
use http::HeaderName;
use tower::Layer;
use triomphe::Arc;

/// Middleware configuration, shared by every service a layer produces
#[derive(Clone)]
pub(crate) struct Config {
    pub(crate) header_name: HeaderName,
    pub(crate) session_cookie: String,
    pub(crate) exempt_paths: Vec<String>,
}

impl Config {
    /// Exempt paths match exactly or as `/`-delimited prefixes, so
    /// `/webhooks` also covers `/webhooks/stripe` but not `/webhooksever`.
    pub(crate) fn is_exempt(&self, path: &str) -> bool {
        self.exempt_paths.iter().any(|prefix| {
            path == prefix.as_str()
                || path
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            header_name: CSRF_HEADER_NAME.clone(),
            session_cookie: DEFAULT_SESSION_COOKIE.into(),
            exempt_paths: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct CsrfLayer {
    store: SharedStore,
    config: Config,
}

impl CsrfLayer {
    pub fn new<T>(store: T) -> Self
    where
        T: TokenStore + Send + Sync + 'static,
    {
        Self {
            store: std::sync::Arc::new(store),
            config: Config::default(),
        }
    }

    /// Request header the client token is read from
    #[must_use]
    pub fn header_name(mut self, name: HeaderName) -> Self {
        self.config.header_name = name;
        self
    }

    /// Cookie the session identifier is read from
    #[must_use]
    pub fn session_cookie<N>(mut self, name: N) -> Self
    where
        N: Into<String>,
    {
        self.config.session_cookie = name.into();
        self
    }

    /// Paths excused from token checks
    #[must_use]
    pub fn exempt_paths<I>(mut self, paths: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.config.exempt_paths = paths.into_iter().map(Into::into).collect();
        self
    }
}

impl<S> Layer<S> for CsrfLayer {
    type Service = CsrfService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CsrfService::new(
            inner,
            SharedStore::clone(&self.store),
            Arc::new(self.config.clone()),
        )
    }
}
