//! Validation of user-controllable redirect targets.
//!
//! Redirect targets come in from query parameters and deep links, so every
//! target passes through [`RedirectValidator::validate`] before a `Location`
//! header is ever built from it. Accepted targets are either internal paths
//! matched against an allow-list, or absolute `http(s)` URLs whose hostname
//! belongs to an allowed domain (or one of its subdomains).
//!
//! Known limitations, on purpose:
//!
//! * Trusting a domain trusts **all** of its subdomains. Do not allow-list
//!   domains that hand out subdomains to third parties.
//! * No IDN/punycode handling. A homograph of an allowed domain is a
//!   different string and will be rejected, but no normalization or
//!   confusable detection is attempted.

use arc_swap::ArcSwap;
use smol_str::SmolStr;
use triomphe::Arc;
use url::Url;

mod scan;

/// Initial allow-lists and policy knobs for a [`RedirectValidator`].
///
/// This is an owned snapshot handed in by the caller; the validator never
/// reads process-global state.
#[derive(Clone, Default)]
pub struct RedirectConfig {
    pub allowed_domains: Vec<SmolStr>,
    pub allowed_paths: Vec<SmolStr>,
    /// Reject plain `http` targets. Turn this on outside local development.
    pub enforce_https: bool,
}

/// Why a redirect target was refused.
///
/// `Display` is the human-readable reason, [`Rejection::code`] the stable
/// machine code. Rejections are ordinary values; attacker-controlled input
/// never panics.
#[derive(Debug, thiserror::Error, strum::AsRefStr, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Rejection {
    #[error("URL is required")]
    Missing,

    #[error("URL contains suspicious patterns")]
    SuspiciousPattern,

    #[error("Protocol-relative URLs are not allowed")]
    ProtocolRelative,

    #[error("Path '{0}' is not an allowed redirect target")]
    PathNotAllowed(String),

    #[error("Domain '{0}' is not an allowed redirect target")]
    DomainNotAllowed(String),

    #[error("Redirects must use HTTPS")]
    InsecureScheme,

    #[error("URL could not be parsed: {0}")]
    Malformed(#[from] url::ParseError),

    #[error("Unrecognized URL format")]
    UnrecognizedFormat,
}

impl Rejection {
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.into()
    }
}

struct Inner {
    domains: ArcSwap<Vec<SmolStr>>,
    paths: ArcSwap<Vec<SmolStr>>,
    enforce_https: bool,
}

/// Cheaply cloneable validator handle.
///
/// The allow-lists are swapped atomically on append, so concurrent readers
/// observe either the old or the new list, never a partially updated one.
#[derive(Clone)]
pub struct RedirectValidator {
    inner: Arc<Inner>,
}

impl RedirectValidator {
    #[must_use]
    pub fn new(config: RedirectConfig) -> Self {
        let domains = config
            .allowed_domains
            .iter()
            .map(|domain| normalize_domain(domain))
            .filter(|domain| !domain.is_empty())
            .collect::<Vec<_>>();

        Self {
            inner: Arc::new(Inner {
                domains: ArcSwap::from_pointee(domains),
                paths: ArcSwap::from_pointee(config.allowed_paths),
                enforce_https: config.enforce_https,
            }),
        }
    }

    /// Run the full validation pipeline over a raw redirect target.
    ///
    /// On success the returned string is the sanitized form of the input:
    /// trimmed, with NUL/CR/LF/TAB characters removed, query and fragment
    /// preserved.
    pub fn validate(&self, raw: &str) -> Result<String, Rejection> {
        if raw.trim().is_empty() {
            return Err(Rejection::Missing);
        }

        // The scan runs over the raw input. Stripping happens afterwards so
        // that control characters cannot splice a denylisted pattern apart.
        if scan::is_suspicious(raw) {
            return Err(Rejection::SuspiciousPattern);
        }

        let cleaned = sanitize(raw);

        if cleaned.starts_with("//") {
            return Err(Rejection::ProtocolRelative);
        }
        if cleaned.starts_with('/') {
            return self.validate_internal_path(cleaned);
        }
        if cleaned.starts_with("http://") || cleaned.starts_with("https://") {
            return self.validate_absolute(cleaned);
        }

        Err(Rejection::UnrecognizedFormat)
    }

    /// Boolean convenience over [`RedirectValidator::validate`].
    #[must_use]
    pub fn is_valid(&self, raw: &str) -> bool {
        self.validate(raw).is_ok()
    }

    /// Append a domain to the allow-list. Idempotent; the updated list is
    /// published atomically.
    pub fn add_allowed_domain(&self, domain: &str) {
        let normalized = normalize_domain(domain);
        if normalized.is_empty() {
            return;
        }
        if self.inner.domains.load().contains(&normalized) {
            return;
        }

        self.inner.domains.rcu(|current| {
            let mut next = Vec::clone(current);
            if !next.contains(&normalized) {
                next.push(normalized.clone());
            }
            next
        });
    }

    /// Append an internal path to the allow-list. Idempotent, atomic.
    pub fn add_allowed_path(&self, path: &str) {
        let path = SmolStr::new(path.trim());
        if path.is_empty() || !path.starts_with('/') {
            return;
        }
        if self.inner.paths.load().contains(&path) {
            return;
        }

        self.inner.paths.rcu(|current| {
            let mut next = Vec::clone(current);
            if !next.contains(&path) {
                next.push(path.clone());
            }
            next
        });
    }

    /// Snapshot of the currently allowed domains.
    #[must_use]
    pub fn allowed_domains(&self) -> Vec<SmolStr> {
        Vec::clone(&self.inner.domains.load_full())
    }

    /// Snapshot of the currently allowed internal paths.
    #[must_use]
    pub fn allowed_paths(&self) -> Vec<SmolStr> {
        Vec::clone(&self.inner.paths.load_full())
    }

    fn validate_internal_path(&self, cleaned: String) -> Result<String, Rejection> {
        let bare = cleaned
            .find(['?', '#'])
            .map_or(cleaned.as_str(), |idx| &cleaned[..idx]);

        let paths = self.inner.paths.load();
        let allowed = paths.iter().any(|path| {
            bare == path.as_str()
                || bare
                    .strip_prefix(path.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        });

        if allowed {
            Ok(cleaned)
        } else {
            Err(Rejection::PathNotAllowed(bare.to_owned()))
        }
    }

    fn validate_absolute(&self, cleaned: String) -> Result<String, Rejection> {
        let parsed = Url::parse(&cleaned)?;

        if parsed.scheme() == "http" && self.inner.enforce_https {
            return Err(Rejection::InsecureScheme);
        }

        // `http(s)` URLs without a host fail to parse, so this only guards
        // against oddities like `http://` with an empty authority.
        let Some(host) = parsed.host_str() else {
            return Err(Rejection::UnrecognizedFormat);
        };

        let domains = self.inner.domains.load();
        let matched = domains.iter().any(|domain| host_matches(host, domain));

        if matched {
            Ok(cleaned)
        } else {
            Err(Rejection::DomainNotAllowed(host.to_owned()))
        }
    }
}

/// Exact domain match, or a subdomain of it. The suffix check is anchored on
/// a dot so `notimobibase.com` never matches `imobibase.com`.
fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|lead| lead.ends_with('.'))
}

fn normalize_domain(domain: &str) -> SmolStr {
    SmolStr::new(domain.trim().to_ascii_lowercase())
}

fn sanitize(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|ch| !matches!(ch, '\0' | '\r' | '\n' | '\t'))
        .collect()
}

#[cfg(test)]
mod test {
    use super::{RedirectConfig, RedirectValidator, Rejection};
    use smol_str::SmolStr;

    fn validator() -> RedirectValidator {
        RedirectValidator::new(RedirectConfig {
            allowed_domains: vec![SmolStr::new_static("imobibase.com")],
            allowed_paths: vec![
                SmolStr::new_static("/dashboard"),
                SmolStr::new_static("/listings"),
                SmolStr::new_static("/profile"),
            ],
            enforce_https: true,
        })
    }

    #[test]
    fn accepts_allowed_domain() {
        let sanitized = validator()
            .validate("https://imobibase.com/deals?id=42")
            .unwrap();
        assert_eq!(sanitized, "https://imobibase.com/deals?id=42");
    }

    #[test]
    fn accepts_subdomains_of_allowed_domain() {
        assert!(validator().is_valid("https://app.imobibase.com/"));
        assert!(validator().is_valid("https://deep.nested.imobibase.com/x"));
    }

    #[test]
    fn rejects_unlisted_domain() {
        let rejection = validator().validate("https://evil.com/").unwrap_err();
        assert!(matches!(rejection, Rejection::DomainNotAllowed(_)));
        assert_eq!(rejection.code(), "DOMAIN_NOT_ALLOWED");
    }

    #[test]
    fn rejects_suffix_colliding_domain() {
        let rejection = validator()
            .validate("https://notimobibase.com/")
            .unwrap_err();
        assert!(matches!(rejection, Rejection::DomainNotAllowed(_)));
    }

    #[test]
    fn accepts_allowed_path_exact_and_nested() {
        let validator = validator();
        assert!(validator.is_valid("/dashboard"));
        assert!(validator.is_valid("/dashboard/leads/7"));
    }

    #[test]
    fn keeps_query_and_fragment_on_accepted_paths() {
        let sanitized = validator().validate("/dashboard?tab=leads#top").unwrap();
        assert!(sanitized.starts_with("/dashboard"));
        assert_eq!(sanitized, "/dashboard?tab=leads#top");
    }

    #[test]
    fn rejects_sibling_path() {
        let rejection = validator().validate("/dashboards").unwrap_err();
        assert!(matches!(rejection, Rejection::PathNotAllowed(_)));
    }

    #[test]
    fn rejects_protocol_relative() {
        let rejection = validator().validate("//evil.com/phish").unwrap_err();
        assert!(matches!(rejection, Rejection::ProtocolRelative));
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        for input in ["", "   ", "\t\n"] {
            let rejection = validator().validate(input).unwrap_err();
            assert!(matches!(rejection, Rejection::Missing));
            assert_eq!(rejection.to_string(), "URL is required");
        }
    }

    #[test]
    fn rejects_dangerous_schemes() {
        let validator = validator();
        for input in [
            "javascript:alert(1)",
            "JaVaScRiPt:alert(1)",
            "data:text/html,<script>alert(1)</script>",
            "vbscript:msgbox(1)",
            "file:///etc/passwd",
        ] {
            let rejection = validator.validate(input).unwrap_err();
            assert!(
                matches!(rejection, Rejection::SuspiciousPattern),
                "{input} must be flagged as suspicious"
            );
            assert_eq!(rejection.to_string(), "URL contains suspicious patterns");
        }
    }

    #[test]
    fn rejects_encoded_javascript_spellings() {
        let validator = validator();
        for input in [
            "%6a%61vascript:alert(1)",
            "%6A%61%76%61%73%63%72%69%70%74:alert(1)",
            "&#x6A;avascript:alert(1)",
            "&#106;avascript:alert(1)",
            "%256a%2561vascript:alert(1)",
        ] {
            assert!(
                matches!(
                    validator.validate(input),
                    Err(Rejection::SuspiciousPattern)
                ),
                "{input} must be flagged as suspicious"
            );
        }
    }

    #[test]
    fn rejects_null_bytes_backslashes_and_slash_runs() {
        let validator = validator();
        for input in [
            "/dashboard%00.html",
            "/dash\0board",
            "https:\\\\evil.com",
            "/dashboard\\..\\secret",
            "https:///evil.com",
            "////evil.com",
        ] {
            assert!(
                matches!(
                    validator.validate(input),
                    Err(Rejection::SuspiciousPattern)
                ),
                "{input} must be flagged as suspicious"
            );
        }
    }

    #[test]
    fn strips_control_characters_from_accepted_targets() {
        let sanitized = validator()
            .validate("https://imobibase.com/a\tb\rc\nd")
            .unwrap();
        assert_eq!(sanitized, "https://imobibase.com/abcd");
        assert!(!sanitized.contains(['\t', '\r', '\n', '\0']));
    }

    #[test]
    fn enforces_https_when_configured() {
        let rejection = validator().validate("http://imobibase.com/").unwrap_err();
        assert!(matches!(rejection, Rejection::InsecureScheme));

        let lax = RedirectValidator::new(RedirectConfig {
            allowed_domains: vec![SmolStr::new_static("imobibase.com")],
            allowed_paths: Vec::new(),
            enforce_https: false,
        });
        assert!(lax.is_valid("http://imobibase.com/"));
    }

    #[test]
    fn rejects_unrecognized_shapes() {
        let validator = validator();
        for input in ["ftp://imobibase.com", "mailto:sales@imobibase.com", "dashboard"] {
            assert!(
                matches!(
                    validator.validate(input),
                    Err(Rejection::UnrecognizedFormat)
                ),
                "{input} must be rejected as unrecognized"
            );
        }
    }

    #[test]
    fn does_not_reject_long_urls_for_length() {
        let long = format!("https://imobibase.com/listings?q={}", "a".repeat(10_000));
        assert!(validator().is_valid(&long));
    }

    #[test]
    fn add_allowed_domain_is_idempotent() {
        let validator = validator();
        assert!(!validator.is_valid("https://partner.example/"));

        validator.add_allowed_domain("Partner.Example");
        validator.add_allowed_domain("partner.example");

        assert!(validator.is_valid("https://partner.example/"));
        assert_eq!(
            validator
                .allowed_domains()
                .iter()
                .filter(|domain| *domain == "partner.example")
                .count(),
            1
        );
    }

    #[test]
    fn add_allowed_path_is_idempotent() {
        let validator = validator();
        assert!(!validator.is_valid("/reports"));

        validator.add_allowed_path("/reports");
        validator.add_allowed_path("/reports");

        assert!(validator.is_valid("/reports/weekly"));
        assert_eq!(
            validator
                .allowed_paths()
                .iter()
                .filter(|path| *path == "/reports")
                .count(),
            1
        );
    }
}
