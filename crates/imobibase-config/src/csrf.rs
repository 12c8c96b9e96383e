use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    pub cookie_name: SmolStr,
    pub header_name: SmolStr,
    #[serde(default)]
    pub exempt_paths: Vec<SmolStr>,
    pub session_ttl_secs: u64,
    pub secure_cookies: bool,
}
