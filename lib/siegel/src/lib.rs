//! Shared-secret webhook signature verification.
//!
//! Two header conventions are supported: the timestamped `t=...,v1=...`
//! format where the MAC covers `<timestamp>.<body>`, and the prefixed
//! `sha256=...` format where the MAC covers the body alone.
//!
//! Verification never panics on attacker-controlled input. Every failure
//! maps to a [`VerifyError`] carrying a stable machine-readable code.

use miette::Diagnostic;
use ring::hmac;
use std::time::{Duration, SystemTime};
use thiserror::Error;

pub use self::header::TimestampedSignature;

mod header;

/// 5 minutes
pub const MAX_ACCEPTED_TIMESTAMP_DRIFT: Duration = Duration::from_secs(5 * 60);

/// Wire format of the signature header
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::AsRefStr, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Scheme {
    /// `t=<unix seconds>,v1=<hex mac>` with the MAC over `<timestamp>.<body>`
    Timestamped,
    /// `sha256=<hex mac>` with the MAC over the raw body
    Prefixed,
}

/// Verification error
///
/// [`VerifyError::code`] yields the stable identifier handed to API clients.
#[derive(Debug, Diagnostic, Error, strum::AsRefStr, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum VerifyError {
    /// Signature header absent or empty
    #[error("Signature header is missing")]
    MissingSignature,

    /// Header present but not in the expected shape
    #[error("Signature header is malformed")]
    InvalidSignatureFormat,

    /// Timestamp outside the accepted drift window
    #[error("Signature timestamp is outside the accepted window")]
    TimestampTooOld,

    /// MAC mismatch
    #[error("Signature does not match the payload")]
    InvalidSignature,
}

impl VerifyError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.into()
    }
}

/// Verify a raw request body against its signature header
///
/// The timestamp freshness check runs before any MAC comparison, so a
/// stale-but-valid signature reports [`VerifyError::TimestampTooOld`]
/// instead of leaking whether its MAC would have matched.
pub fn verify(
    scheme: Scheme,
    raw_body: &[u8],
    header: Option<&str>,
    secret: &[u8],
) -> Result<(), VerifyError> {
    let header = match header {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Err(VerifyError::MissingSignature),
    };

    match scheme {
        Scheme::Timestamped => verify_timestamped(raw_body, header, secret),
        Scheme::Prefixed => verify_prefixed(raw_body, header, secret),
    }
}

fn verify_timestamped(raw_body: &[u8], header: &str, secret: &[u8]) -> Result<(), VerifyError> {
    let parsed = TimestampedSignature::parse(header)?;

    if unix_now().abs_diff(parsed.seconds) > MAX_ACCEPTED_TIMESTAMP_DRIFT.as_secs() {
        return Err(VerifyError::TimestampTooOld);
    }

    let key = hmac::Key::new(hmac::HMAC_SHA256, secret);
    let mut ctx = hmac::Context::with_key(&key);
    ctx.update(parsed.timestamp.as_bytes());
    ctx.update(b".");
    ctx.update(raw_body);
    let expected = hex_simd::encode_to_string(ctx.sign(), hex_simd::AsciiCase::Lower);

    constant_time_eq(expected.as_bytes(), parsed.signature.as_bytes())
}

fn verify_prefixed(raw_body: &[u8], header: &str, secret: &[u8]) -> Result<(), VerifyError> {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret);
    let tag = hmac::sign(&key, raw_body);
    let expected = format!(
        "sha256={}",
        hex_simd::encode_to_string(tag, hex_simd::AsciiCase::Lower)
    );

    constant_time_eq(expected.as_bytes(), header.as_bytes())
}

/// Equal-length comparison runs in constant time. A length mismatch reports
/// immediately; the length of a valid MAC is public knowledge anyway.
fn constant_time_eq(expected: &[u8], presented: &[u8]) -> Result<(), VerifyError> {
    ring::constant_time::verify_slices_are_equal(expected, presented)
        .map_err(|_| VerifyError::InvalidSignature)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
