//! Denylist scan over raw redirect targets.
//!
//! This is a first line of defense, not the gate itself; anything that
//! sneaks past it still has to clear the shape checks and the allow-lists.
//! The scan is deliberately eager and will flag denylisted patterns anywhere
//! in the string, query included.

const DANGEROUS_SCHEMES: [&str; 4] = ["javascript:", "data:", "vbscript:", "file:"];

/// Percent-decoding passes applied before re-scanning. Two passes catch the
/// usual double-encoding tricks (`%256a` -> `%6a` -> `j`).
const DECODE_PASSES: usize = 2;

pub(crate) fn is_suspicious(raw: &str) -> bool {
    // Backslashes also cover the `j`/`\x6a` escape spellings, since any
    // such sequence contains one.
    if raw.contains('\0') || raw.contains('\\') {
        return true;
    }
    if raw.as_bytes().windows(3).any(|window| window == b"///") {
        return true;
    }

    let lowered = raw.to_ascii_lowercase();
    if has_dangerous_pattern(&lowered) {
        return true;
    }

    let mut decoded = lowered.clone();
    for _ in 0..DECODE_PASSES {
        decoded = percent_decoded(&decoded);
        if has_dangerous_pattern(&decoded) {
            return true;
        }
    }

    has_dangerous_pattern(&entity_decoded(&lowered))
}

fn has_dangerous_pattern(candidate: &str) -> bool {
    candidate.contains('\0')
        || candidate.contains("%00")
        || DANGEROUS_SCHEMES
            .iter()
            .any(|scheme| candidate.contains(scheme))
}

/// Single-pass percent decoding. Invalid escapes are passed through
/// untouched, and decoded bytes that do not form valid UTF-8 are replaced.
fn percent_decoded(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut idx = 0;

    while idx < bytes.len() {
        if bytes[idx] == b'%' && idx + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[idx + 1]), hex_value(bytes[idx + 2])) {
                out.push((hi << 4) | lo);
                idx += 3;
                continue;
            }
        }

        out.push(bytes[idx]);
        idx += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Decodes numeric HTML entities (`&#x6a;` / `&#106;`). Named entities are
/// left alone; targets relying on them fail the shape checks anyway.
fn entity_decoded(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("&#") {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 2..];

        let (digits, radix) = match tail.strip_prefix(['x', 'X']) {
            Some(hex_tail) => (hex_tail, 16),
            None => (tail, 10),
        };

        let digit_len = digits
            .bytes()
            .take_while(|byte| {
                if radix == 16 {
                    byte.is_ascii_hexdigit()
                } else {
                    byte.is_ascii_digit()
                }
            })
            .count();

        if digit_len == 0 || !digits[digit_len..].starts_with(';') {
            out.push_str("&#");
            rest = tail;
            continue;
        }

        let decoded = u32::from_str_radix(&digits[..digit_len], radix)
            .ok()
            .and_then(char::from_u32);
        out.push(decoded.unwrap_or('\u{FFFD}'));

        rest = &digits[digit_len + 1..];
    }

    out.push_str(rest);
    out
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::{entity_decoded, is_suspicious, percent_decoded};
    use proptest::{prop_assert, prop_assume, proptest};

    #[test]
    fn flags_the_denylisted_schemes() {
        for input in [
            "javascript:alert(1)",
            "some/path?next=javascript:alert(1)",
            "data:text/html;base64,PHNjcmlwdD4=",
            "vbscript:msgbox(1)",
            "file:///etc/shadow",
        ] {
            assert!(is_suspicious(input), "{input}");
        }
    }

    #[test]
    fn flags_percent_and_entity_spellings() {
        for input in [
            "%6a%61%76%61%73%63%72%69%70%74:alert(1)",
            "%256a%2561vascript:alert(1)",
            "&#x6a;avascript:alert(1)",
            "&#X6A;avascript:alert(1)",
            "&#106;avascript:alert(1)",
        ] {
            assert!(is_suspicious(input), "{input}");
        }
    }

    #[test]
    fn flags_nulls_backslashes_and_slash_runs() {
        for input in ["a\0b", "%00", "a%2500b", "a\\b", "///", "a////b"] {
            assert!(is_suspicious(input), "{input:?}");
        }
    }

    #[test]
    fn leaves_ordinary_targets_alone() {
        for input in [
            "/dashboard",
            "/dashboard?tab=leads#top",
            "https://imobibase.com/listings",
            "https://app.imobibase.com/x?y=z",
        ] {
            assert!(!is_suspicious(input), "{input}");
        }
    }

    #[test]
    fn percent_decoding_passes_broken_escapes_through() {
        assert_eq!(percent_decoded("a%zzb"), "a%zzb");
        assert_eq!(percent_decoded("a%2"), "a%2");
        assert_eq!(percent_decoded("%6a"), "j");
    }

    #[test]
    fn entity_decoding_handles_malformed_entities() {
        assert_eq!(entity_decoded("&#"), "&#");
        assert_eq!(entity_decoded("&#x;"), "&#x;");
        assert_eq!(entity_decoded("&#xZZ;"), "&#xZZ;");
        assert_eq!(entity_decoded("&#x6a;"), "j");
        assert_eq!(entity_decoded("&#99999999999999;"), "\u{FFFD}");
    }

    proptest! {
        #[test]
        fn never_panics(input in ".*") {
            let _ = is_suspicious(&input);
        }

        #[test]
        fn embedded_scheme_is_always_flagged(
            prefix in "[a-z0-9/._-]{0,16}",
            suffix in "[a-z0-9/._-]{0,16}",
        ) {
            let input = format!("{prefix}javascript:{suffix}");
            prop_assert!(is_suspicious(&input));
        }

        #[test]
        fn colon_free_targets_are_never_flagged(input in "[a-z0-9/?=&._-]{0,64}") {
            prop_assume!(!input.contains("///"));
            prop_assert!(!is_suspicious(&input));
        }
    }
}
