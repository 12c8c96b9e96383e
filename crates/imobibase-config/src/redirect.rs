use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    #[serde(default)]
    pub allowed_domains: Vec<SmolStr>,
    #[serde(default)]
    pub allowed_paths: Vec<SmolStr>,
    pub enforce_https: bool,
    pub fallback_path: SmolStr,
}
