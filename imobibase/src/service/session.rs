use dashmap::{mapref::one::RefMut, DashMap};
use doppel::{SessionId, SessionIdRef, Token, TokenStore};
use imobibase_config::csrf;
use rand::{distributions::Alphanumeric, Rng};
use smol_str::SmolStr;
use std::time::{Duration, Instant};
use triomphe::Arc;

const SESSION_ID_LENGTH: usize = 32;

struct Session {
    created_at: Instant,
    csrf_token: Option<Token>,
    username: Option<SmolStr>,
}

impl Session {
    fn new() -> Self {
        Self {
            created_at: Instant::now(),
            csrf_token: None,
            username: None,
        }
    }
}

/// In-memory session registry
///
/// Sessions expire a fixed TTL after creation and are reaped lazily,
/// whenever an access runs into one that is past its expiry.
#[derive(Clone)]
pub struct Sessions {
    inner: Arc<Inner>,
}

struct Inner {
    store: DashMap<SessionId, Session>,
    ttl: Duration,
    cookie_name: SmolStr,
    secure_cookies: bool,
}

impl Sessions {
    #[must_use]
    pub fn from_config(config: &csrf::Configuration) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: DashMap::new(),
                ttl: Duration::from_secs(config.session_ttl_secs),
                cookie_name: config.cookie_name.clone(),
                secure_cookies: config.secure_cookies,
            }),
        }
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.inner.cookie_name
    }

    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.inner.secure_cookies
    }

    /// Mint a fresh anonymous session and hand out its identifier
    #[must_use]
    pub fn create(&self) -> SessionId {
        let session_id: SessionId = rand::thread_rng()
            .sample_iter(Alphanumeric)
            .map(char::from)
            .take(SESSION_ID_LENGTH)
            .collect::<String>()
            .into();

        self.inner.store.insert(session_id.clone(), Session::new());

        session_id
    }

    /// Whether the session exists and is not past its expiry
    #[must_use]
    pub fn contains(&self, session_id: &SessionIdRef) -> bool {
        self.with_live_session(session_id, |_| ()).is_some()
    }

    /// Attach an authenticated principal to the session
    pub fn authenticate(&self, session_id: &SessionIdRef, username: SmolStr) {
        if let Some(mut entry) = self.inner.store.get_mut(session_id) {
            entry.username = Some(username);
        }
    }

    #[must_use]
    pub fn current_user(&self, session_id: &SessionIdRef) -> Option<SmolStr> {
        self.with_live_session(session_id, |session| session.username.clone())
            .flatten()
    }

    /// Drop the session and everything bound to it, CSRF token included
    pub fn destroy(&self, session_id: &SessionIdRef) {
        self.inner.store.remove(session_id);
    }

    fn with_live_session<F, T>(&self, session_id: &SessionIdRef, f: F) -> Option<T>
    where
        F: FnOnce(&Session) -> T,
    {
        if let Some(session) = self.inner.store.get(session_id) {
            if session.created_at.elapsed() > self.inner.ttl {
                drop(session); // Load bearing drop. Otherwise the remove will deadlock.
                self.inner.store.remove(session_id);
                return None;
            }

            return Some(f(&session));
        }

        None
    }

    fn live_entry(&self, session_id: &SessionIdRef) -> RefMut<'_, SessionId, Session> {
        let mut entry = self
            .inner
            .store
            .entry(session_id.to_owned())
            .or_insert_with(Session::new);

        if entry.created_at.elapsed() > self.inner.ttl {
            *entry = Session::new();
        }

        entry
    }
}

impl TokenStore for Sessions {
    fn get(&self, session_id: &SessionIdRef) -> Option<Token> {
        self.with_live_session(session_id, |session| session.csrf_token.clone())
            .flatten()
    }

    fn get_or_insert(&self, session_id: &SessionIdRef, fresh: Token) -> Token {
        self.live_entry(session_id)
            .csrf_token
            .get_or_insert(fresh)
            .clone()
    }

    fn replace(&self, session_id: &SessionIdRef, fresh: Token) -> Token {
        self.live_entry(session_id).csrf_token = Some(fresh.clone());
        fresh
    }
}
