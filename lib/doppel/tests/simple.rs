use doppel::{
    CSRF_ERROR_HEADER_NAME, CsrfHandle, CsrfLayer, SessionId, SessionIdRef, Token, TokenStore,
};
use futures::{executor, future};
use http::{Method, Request, Response, StatusCode, header};
use std::{
    collections::HashMap,
    convert::Infallible,
    sync::{Arc, Mutex},
};
use tower::{Layer, Service, ServiceExt, service_fn};

#[derive(Clone, Default)]
struct MapStore {
    inner: Arc<Mutex<HashMap<SessionId, Token>>>,
}

impl TokenStore for MapStore {
    fn get(&self, session_id: &SessionIdRef) -> Option<Token> {
        self.inner.lock().unwrap().get(session_id).cloned()
    }

    fn get_or_insert(&self, session_id: &SessionIdRef, fresh: Token) -> Token {
        self.inner
            .lock()
            .unwrap()
            .entry(session_id.to_owned())
            .or_insert(fresh)
            .clone()
    }

    fn replace(&self, session_id: &SessionIdRef, fresh: Token) -> Token {
        self.inner
            .lock()
            .unwrap()
            .insert(session_id.to_owned(), fresh.clone());

        fresh
    }
}

fn token_for(store: &MapStore, session_id: &str) -> Option<Token> {
    store
        .inner
        .lock()
        .unwrap()
        .get(&SessionId::from(session_id))
        .cloned()
}

fn common(store: MapStore) -> impl Service<Request<()>, Response = Response<()>, Error = Infallible>
{
    let service = service_fn(|req: Request<()>| {
        if req.uri().path() == "/login" {
            let handle = req.extensions().get::<CsrfHandle>().unwrap();
            handle.rotate();
        }

        future::ok::<_, Infallible>(Response::new(()))
    });

    CsrfLayer::new(store)
        .exempt_paths(["/login", "/webhooks"])
        .layer(service)
}

fn call<S>(service: &mut S, req: Request<()>) -> Response<()>
where
    S: Service<Request<()>, Response = Response<()>, Error = Infallible>,
{
    executor::block_on(async { service.ready().await.unwrap().call(req).await.unwrap() })
}

fn request(method: Method, path: &str, session: Option<&str>) -> http::request::Builder {
    let builder = Request::builder().method(method).uri(path);
    match session {
        Some(session_id) => builder.header(header::COOKIE, format!("SESSION_ID={session_id}")),
        None => builder,
    }
}

#[test]
fn safe_methods_pass_and_prime_a_token() {
    let store = MapStore::default();
    let mut service = common(store.clone());

    let response = call(
        &mut service,
        request(Method::GET, "/dashboard", Some("alpha"))
            .body(())
            .unwrap(),
    );

    assert_eq!(response.status(), StatusCode::OK);

    let token = token_for(&store, "alpha").expect("first request should prime a token");
    assert_eq!(token.as_str().len(), 43);
}

#[test]
fn token_is_stable_across_requests() {
    let store = MapStore::default();
    let mut service = common(store.clone());

    for _ in 0..2 {
        call(
            &mut service,
            request(Method::GET, "/", Some("alpha")).body(()).unwrap(),
        );
    }

    let first = token_for(&store, "alpha").unwrap();

    call(
        &mut service,
        request(Method::GET, "/", Some("alpha")).body(()).unwrap(),
    );

    assert_eq!(token_for(&store, "alpha").unwrap(), first);
}

#[test]
fn post_without_header_is_rejected_as_missing() {
    let store = MapStore::default();
    let mut service = common(store.clone());

    let response = call(
        &mut service,
        request(Method::POST, "/contacts", Some("alpha"))
            .body(())
            .unwrap(),
    );

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        response.headers().get(&CSRF_ERROR_HEADER_NAME).unwrap(),
        "CSRF_TOKEN_MISSING"
    );

    // The rejection still primes a token so the client can retry properly.
    assert!(token_for(&store, "alpha").is_some());
}

#[test]
fn post_with_the_session_token_passes() {
    let store = MapStore::default();
    let mut service = common(store.clone());

    call(
        &mut service,
        request(Method::GET, "/", Some("alpha")).body(()).unwrap(),
    );
    let token = token_for(&store, "alpha").unwrap();

    let response = call(
        &mut service,
        request(Method::POST, "/contacts", Some("alpha"))
            .header("x-csrf-token", token.as_str())
            .body(())
            .unwrap(),
    );

    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn foreign_tokens_are_rejected_as_invalid() {
    let store = MapStore::default();
    let mut service = common(store.clone());

    for session in ["alpha", "beta"] {
        call(
            &mut service,
            request(Method::GET, "/", Some(session)).body(()).unwrap(),
        );
    }
    let beta_token = token_for(&store, "beta").unwrap();

    let response = call(
        &mut service,
        request(Method::POST, "/contacts", Some("alpha"))
            .header("x-csrf-token", beta_token.as_str())
            .body(())
            .unwrap(),
    );

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        response.headers().get(&CSRF_ERROR_HEADER_NAME).unwrap(),
        "CSRF_TOKEN_INVALID"
    );
}

#[test]
fn anonymous_posts_never_verify() {
    let store = MapStore::default();
    let mut service = common(store);

    let response = call(
        &mut service,
        request(Method::POST, "/contacts", None)
            .header("x-csrf-token", "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA")
            .body(())
            .unwrap(),
    );

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        response.headers().get(&CSRF_ERROR_HEADER_NAME).unwrap(),
        "CSRF_TOKEN_INVALID"
    );
}

#[test]
fn exempt_prefix_covers_subpaths() {
    let store = MapStore::default();
    let mut service = common(store);

    let response = call(
        &mut service,
        request(Method::POST, "/webhooks/stripe", None)
            .body(())
            .unwrap(),
    );

    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn login_rotation_invalidates_the_old_token() {
    let store = MapStore::default();
    let mut service = common(store.clone());

    call(
        &mut service,
        request(Method::GET, "/", Some("alpha")).body(()).unwrap(),
    );
    let old_token = token_for(&store, "alpha").unwrap();

    // `/login` is exempt; its handler rotates the token.
    let response = call(
        &mut service,
        request(Method::POST, "/login", Some("alpha"))
            .body(())
            .unwrap(),
    );
    assert_eq!(response.status(), StatusCode::OK);

    let new_token = token_for(&store, "alpha").unwrap();
    assert_ne!(new_token, old_token);

    let stale = call(
        &mut service,
        request(Method::POST, "/contacts", Some("alpha"))
            .header("x-csrf-token", old_token.as_str())
            .body(())
            .unwrap(),
    );
    assert_eq!(stale.status(), StatusCode::FORBIDDEN);

    let fresh = call(
        &mut service,
        request(Method::POST, "/contacts", Some("alpha"))
            .header("x-csrf-token", new_token.as_str())
            .body(())
            .unwrap(),
    );
    assert_eq!(fresh.status(), StatusCode::OK);
}
