use super::{handler, middleware, trace_layer, X_REQUEST_ID};
use crate::state::Zustand;
use axum::{routing, Router};
use color_eyre::eyre;
use doppel::CsrfLayer;
use http::HeaderName;
use imobibase_config::Configuration;
use std::time::Duration;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

pub fn create(state: Zustand, config: &Configuration) -> eyre::Result<Router> {
    let csrf_layer = CsrfLayer::new(state.sessions.clone())
        .header_name(HeaderName::try_from(config.csrf.header_name.as_str())?)
        .session_cookie(config.csrf.cookie_name.as_str())
        .exempt_paths(config.csrf.exempt_paths.iter().cloned());

    let router = Router::new()
        .nest(
            "/auth",
            Router::new()
                .route("/callback", routing::get(handler::auth::callback::get))
                .route("/login", routing::post(handler::auth::login::post))
                .route("/logout", routing::post(handler::auth::logout::post)),
        )
        .route("/api/ping", routing::post(handler::api::ping::post))
        .route("/csrf-token", routing::get(handler::csrf_token::get))
        .route("/health", routing::get(handler::health::get))
        .route("/webhooks/{vendor}", routing::post(handler::webhooks::post));

    let router = router
        .layer(CatchPanicLayer::new())
        .layer(csrf_layer)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::ensure_session,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(trace_layer())
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
        .layer(SetRequestIdLayer::new(
            X_REQUEST_ID.clone(),
            MakeRequestUuid,
        ))
        .with_state(state);

    Ok(router)
}
