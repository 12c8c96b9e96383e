use crate::{SessionIdRef, Token};

/// Session-scoped token storage
///
/// Implementations live next to whatever session store the application
/// already has, so tokens share their session's lifetime: destroying the
/// session destroys the token with it.
pub trait TokenStore {
    /// Token currently bound to the session, if any
    fn get(&self, session_id: &SessionIdRef) -> Option<Token>;

    /// Bind `fresh` to the session unless one is already bound
    ///
    /// Returns whichever token ends up bound.
    fn get_or_insert(&self, session_id: &SessionIdRef, fresh: Token) -> Token;

    /// Unconditionally bind `fresh`, discarding any previous token
    fn replace(&self, session_id: &SessionIdRef, fresh: Token) -> Token;
}
