use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// One inbound webhook vendor
///
/// `scheme` names the signature convention and is validated at boot.
#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct VendorConfiguration {
    pub name: SmolStr,
    pub scheme: SmolStr,
    pub signature_header: SmolStr,
    pub secret: SmolStr,
}
