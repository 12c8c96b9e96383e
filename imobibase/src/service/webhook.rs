use eyre::Context;
use http::HeaderName;
use imobibase_config::webhook;
use siegel::{Scheme, VerifyError};
use smol_str::SmolStr;
use std::{collections::HashMap, str::FromStr};
use triomphe::Arc;

/// One registered webhook vendor with its verification parameters
pub struct Vendor {
    scheme: Scheme,
    signature_header: HeaderName,
    secret: SmolStr,
}

impl Vendor {
    #[must_use]
    pub fn signature_header(&self) -> &HeaderName {
        &self.signature_header
    }

    /// Verify the raw request body against this vendor's shared secret
    pub fn verify(&self, raw_body: &[u8], header: Option<&str>) -> Result<(), VerifyError> {
        siegel::verify(self.scheme, raw_body, header, self.secret.as_bytes())
    }
}

/// Vendor registry keyed by the URL path segment vendors deliver to
#[derive(Clone)]
pub struct WebhookVendors {
    inner: Arc<HashMap<SmolStr, Vendor>>,
}

impl WebhookVendors {
    /// Fails on empty secrets, unknown schemes and unusable header names
    pub fn from_config(config: &[webhook::VendorConfiguration]) -> eyre::Result<Self> {
        let mut vendors = HashMap::with_capacity(config.len());

        for vendor in config {
            if vendor.secret.trim().is_empty() {
                eyre::bail!("Webhook vendor {} has an empty secret", vendor.name);
            }

            let scheme = Scheme::from_str(&vendor.scheme).context(format!(
                "Webhook vendor {} references the unknown signature scheme {}",
                vendor.name, vendor.scheme
            ))?;

            let signature_header = HeaderName::try_from(vendor.signature_header.as_str())
                .context(format!(
                    "Webhook vendor {} has an unusable signature header name",
                    vendor.name
                ))?;

            vendors.insert(
                vendor.name.clone(),
                Vendor {
                    scheme,
                    signature_header,
                    secret: vendor.secret.clone(),
                },
            );
        }

        Ok(Self {
            inner: Arc::new(vendors),
        })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Vendor> {
        self.inner.get(name)
    }
}
