//! Query-component escaping as applied to callback parameters.
//!
//! Unreserved bytes (`A-Z a-z 0-9 - _ . ~`) pass through, a space becomes
//! `+`, everything else is `%XX` with upper-case hex.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnescapeError {
    #[error("invalid URL escape {0:?}")]
    InvalidEscape(String),

    #[error("unescaped value is not valid UTF-8")]
    InvalidUtf8,
}

/// Escape `s` so it can be placed in a URL query component.
pub fn query_escape(s: &str) -> String {
    // `%` itself is escaped to `%25`, so `%20` can only come from a space.
    urlencoding::encode(s).replace("%20", "+")
}

/// Reverse [`query_escape`]. A `%` must be followed by two hex digits.
pub fn query_unescape(s: &str) -> Result<String, UnescapeError> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let decoded = bytes
                    .get(i + 1..i + 3)
                    .and_then(|hex| Some(hex_val(hex[0])? << 4 | hex_val(hex[1])?));
                let Some(byte) = decoded else {
                    let bad: String = s[i..].chars().take(3).collect();
                    return Err(UnescapeError::InvalidEscape(bad));
                };
                out.push(byte);
                i += 3;
            },
            b'+' => {
                out.push(b' ');
                i += 1;
            },
            b => {
                out.push(b);
                i += 1;
            },
        }
    }

    String::from_utf8(out).map_err(|_| UnescapeError::InvalidUtf8)
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_leaves_unreserved_alone() {
        assert_eq!(query_escape("AZaz09-_.~"), "AZaz09-_.~");
    }

    #[test]
    fn escape_reserved_and_space() {
        assert_eq!(query_escape("a+b/c=d e"), "a%2Bb%2Fc%3Dd+e");
    }

    #[test]
    fn unescape_plus_and_hex() {
        assert_eq!(query_unescape("a%2Bb%2fc+d").unwrap(), "a+b/c d");
    }

    #[test]
    fn unescape_rejects_lone_percent() {
        assert_eq!(
            query_unescape("abc%"),
            Err(UnescapeError::InvalidEscape("%".into()))
        );
        assert_eq!(
            query_unescape("abc%4"),
            Err(UnescapeError::InvalidEscape("%4".into()))
        );
    }

    #[test]
    fn unescape_rejects_non_hex() {
        assert_eq!(
            query_unescape("%zz-tail"),
            Err(UnescapeError::InvalidEscape("%zz".into()))
        );
    }

    #[test]
    fn unescape_rejects_invalid_utf8() {
        assert_eq!(query_unescape("%ff%fe"), Err(UnescapeError::InvalidUtf8));
    }

    #[test]
    fn escape_round_trips() {
        let raw = "ey+J/h==  x";
        assert_eq!(query_unescape(&query_escape(raw)).unwrap(), raw);
    }
}
