#![forbid(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, forbidden_lint_groups)]

pub mod auth;
pub mod csrf;
pub mod redirect;
pub mod server;
pub mod webhook;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    pub auth: auth::Configuration,
    pub csrf: csrf::Configuration,
    pub redirect: redirect::Configuration,
    pub server: server::Configuration,
    #[serde(default)]
    pub webhooks: Vec<webhook::VendorConfiguration>,
}

impl Configuration {
    pub async fn load<P>(path: P) -> eyre::Result<Self>
    where
        P: AsRef<Path>,
    {
        let content = fs::read_to_string(path).await?;
        toml::from_str(&content).map_err(eyre::Report::from)
    }
}
