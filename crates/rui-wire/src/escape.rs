#![forbid(unsafe_code)]

//! Quoting rules for text values.
//!
//! Quoted values escape backslash, both quote characters, and the three
//! line-control characters so that every encoded record fits on one line.
//! [`unescape`] is the exact inverse of [`escape`] and additionally accepts
//! the `\xHH` and `\uHHHH` forms the server may emit.

use std::borrow::Cow;

use crate::error::WireError;

/// Characters that end a bare (unquoted) token.
pub(crate) const STOP_SYMBOLS: [char; 13] = [
    '=', '{', '}', '[', ']', ',', ' ', '\t', '\n', '\'', '"', '`', '/',
];

/// Whether `symbol` terminates a bare token.
#[inline]
pub(crate) fn is_stop_symbol(symbol: char) -> bool {
    symbol.is_whitespace() || STOP_SYMBOLS.contains(&symbol)
}

/// Whether `token` can be written without quotes and read back unchanged.
#[must_use]
pub fn is_bare_token(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(is_stop_symbol)
}

#[inline]
fn needs_escape(ch: char) -> bool {
    matches!(ch, '\\' | '"' | '\'' | '\n' | '\r' | '\t')
}

/// Escape `text` for use inside a double-quoted value.
///
/// Returns the input unchanged (borrowed) when nothing needs escaping.
#[must_use]
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.chars().any(needs_escape) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Reverse [`escape`].
///
/// Errors report the 1-based column of the offending backslash.
pub fn unescape(text: &str) -> Result<String, WireError> {
    if !text.contains('\\') {
        return Ok(text.to_owned());
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while pos < chars.len() {
        let ch = chars[pos];
        if ch != '\\' {
            out.push(ch);
            pos += 1;
            continue;
        }

        let start = pos;
        let invalid = |end: usize| WireError::InvalidEscape {
            sequence: chars[start..end.min(chars.len())].iter().collect(),
            line: 1,
            column: start + 1,
        };

        let Some(&kind) = chars.get(pos + 1) else {
            return Err(invalid(pos + 1));
        };
        pos += 2;
        match kind {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '\\' => out.push('\\'),
            'x' | 'X' => {
                let ch = hex_char(&chars, pos, 2).ok_or_else(|| invalid(pos + 2))?;
                out.push(ch);
                pos += 2;
            }
            'u' | 'U' => {
                let ch = hex_char(&chars, pos, 4).ok_or_else(|| invalid(pos + 4))?;
                out.push(ch);
                pos += 4;
            }
            _ => return Err(invalid(pos)),
        }
    }
    Ok(out)
}

fn hex_char(chars: &[char], start: usize, digits: usize) -> Option<char> {
    let slice = chars.get(start..start + digits)?;
    let mut value = 0_u32;
    for ch in slice {
        value = value * 16 + ch.to_digit(16)?;
    }
    char::from_u32(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(escape("hello world"), Cow::Borrowed("hello world")));
    }

    #[test]
    fn escapes_quotes_and_backslash() {
        assert_eq!(escape(r#"a"b\c'd"#), r#"a\"b\\c\'d"#);
    }

    #[test]
    fn escapes_line_controls() {
        assert_eq!(escape("one\ntwo\r\tthree"), "one\\ntwo\\r\\tthree");
    }

    #[test]
    fn unescape_inverts_escape() {
        let original = "quote \" slash \\ tick ' nl \n tab \t";
        assert_eq!(unescape(&escape(original)).unwrap(), original);
    }

    #[test]
    fn unescape_hex_and_unicode() {
        assert_eq!(unescape(r"\x41\u00e9").unwrap(), "Aé");
    }

    #[test]
    fn unescape_rejects_unknown_sequence() {
        let err = unescape(r"ab\qcd").unwrap_err();
        assert_eq!(
            err,
            WireError::InvalidEscape {
                sequence: r"\q".to_owned(),
                line: 1,
                column: 3,
            }
        );
    }

    #[test]
    fn unescape_rejects_truncated_hex() {
        assert!(unescape(r"\x4").is_err());
        assert!(unescape(r"\u12").is_err());
        assert!(unescape("\\").is_err());
    }

    #[test]
    fn bare_token_rules() {
        assert!(is_bare_token("key-down-event"));
        assert!(is_bare_token("1.5"));
        assert!(!is_bare_token(""));
        assert!(!is_bare_token("a b"));
        assert!(!is_bare_token("a/b"));
        assert!(!is_bare_token("x=1"));
    }
}
