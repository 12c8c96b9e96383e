use crate::VerifyError;

/// Parsed `t=<unix seconds>,v1=<hex mac>` signature header.
///
/// The raw timestamp slice is kept around because the signed payload is
/// built from the digits exactly as they appeared on the wire.
#[derive(Debug, Eq, PartialEq)]
pub struct TimestampedSignature<'a> {
    pub timestamp: &'a str,
    pub seconds: u64,
    pub signature: &'a str,
}

impl<'a> TimestampedSignature<'a> {
    /// Parse a timestamped signature header into its components
    ///
    /// Unknown keys are ignored, duplicate keys keep the last value, and
    /// segments without a `=` are skipped.
    pub fn parse(input: &'a str) -> Result<Self, VerifyError> {
        let mut timestamp = None;
        let mut signature = None;

        for segment in input.split(',') {
            let Some((key, value)) = segment.split_once('=') else {
                continue;
            };

            match key.trim() {
                "t" => timestamp = Some(value.trim()),
                "v1" => signature = Some(value.trim()),
                _ => {
                    // Vendors ship extra keys (`v0`, test-mode signatures).
                    // They hold no meaning for us.
                }
            }
        }

        let (Some(timestamp), Some(signature)) = (timestamp, signature) else {
            return Err(VerifyError::InvalidSignatureFormat);
        };

        let seconds = atoi_radix10::parse_from_str(timestamp)
            .map_err(|_| VerifyError::InvalidSignatureFormat)?;

        Ok(Self {
            timestamp,
            seconds,
            signature,
        })
    }
}
