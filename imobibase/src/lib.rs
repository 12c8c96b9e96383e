#![forbid(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    forbidden_lint_groups
)]

#[macro_use]
extern crate tracing;

pub mod consts;
pub mod http;
pub mod observability;
pub mod service;
pub mod state;

use self::{
    service::{
        auth::AuthService, redirect::RedirectService, session::Sessions, webhook::WebhookVendors,
    },
    state::{Service, Zustand},
};
use imobibase_config::Configuration;
use wegweiser::{RedirectConfig, RedirectValidator};

pub fn initialise_state(config: &Configuration) -> eyre::Result<Zustand> {
    if !config.redirect.fallback_path.starts_with('/') {
        eyre::bail!("redirect fallback path has to be an internal path starting with '/'");
    }

    // The session middleware builds cookie headers straight from this name.
    let cookie_name_ok = !config.csrf.cookie_name.is_empty()
        && config
            .csrf
            .cookie_name
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_'));
    if !cookie_name_ok {
        eyre::bail!("session cookie name has to be ASCII alphanumeric (plus '-' and '_')");
    }

    let validator = RedirectValidator::new(RedirectConfig {
        allowed_domains: config.redirect.allowed_domains.clone(),
        allowed_paths: config.redirect.allowed_paths.clone(),
        enforce_https: config.redirect.enforce_https,
    });

    let service = Service {
        auth: AuthService::from_config(&config.auth)?,
        redirect: RedirectService::builder()
            .fallback_path(config.redirect.fallback_path.clone())
            .validator(validator)
            .build(),
        webhook: WebhookVendors::from_config(&config.webhooks)?,
    };

    Ok(Zustand {
        config: config.clone(),
        sessions: Sessions::from_config(&config.csrf),
        service,
    })
}
