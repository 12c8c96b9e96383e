use crate::service::{
    auth::AuthService, redirect::RedirectService, session::Sessions, webhook::WebhookVendors,
};
use axum::extract::FromRef;
use imobibase_config::Configuration;

macro_rules! impl_from_ref {
    ($source:path; [ $($target:path => $extract_impl:expr),+ ]) => {
        $(
            impl ::axum::extract::FromRef<$source> for $target {
                fn from_ref(input: &$source) -> Self {
                    #[allow(clippy::redundant_closure_call)]
                    ($extract_impl)(input)
                }
            }
        )+
    };
}

impl_from_ref! {
    Zustand;
    [
        AuthService => |input: &Zustand| input.service.auth.clone(),
        RedirectService => |input: &Zustand| input.service.redirect.clone(),
        WebhookVendors => |input: &Zustand| input.service.webhook.clone()
    ]
}

/// Service collection
///
/// This contains all the "services" the guard layer consists of.
/// Things like credential checking, redirect validation, etc.
#[derive(Clone)]
pub struct Service {
    pub auth: AuthService,
    pub redirect: RedirectService,
    pub webhook: WebhookVendors,
}

/// Application state
///
/// Called it "Zustand" to avoid a name collision with `axum::extract::State`.
/// "Zustand" is just the german word for state.
#[derive(Clone, FromRef)]
pub struct Zustand {
    pub config: Configuration,
    pub sessions: Sessions,
    pub service: Service,
}
