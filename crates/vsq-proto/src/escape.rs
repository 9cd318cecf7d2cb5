//! Property-value escaping.
//!
//! Values travel inside space-separated `key=value` tokens, so spaces,
//! pipes, and control characters are escaped with a backslash notation.

/// Escape a raw value for transmission.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            ' ' => out.push_str("\\s"),
            '|' => out.push_str("\\p"),
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\x0c' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0b' => out.push_str("\\v"),
            other => out.push(other),
        }
    }
    out
}

/// Decode an escaped wire value.
///
/// Unknown escape sequences decode to the escaped character itself, so a
/// lenient peer never corrupts the rest of the line.
pub fn unescape(wire: &str) -> String {
    let mut out = String::with_capacity(wire.len());
    let mut chars = wire.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('s') => out.push(' '),
            Some('p') => out.push('|'),
            Some('a') => out.push('\x07'),
            Some('b') => out.push('\x08'),
            Some('f') => out.push('\x0c'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('v') => out.push('\x0b'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_reserved_characters() {
        assert_eq!(escape("a b|c"), "a\\sb\\pc");
        assert_eq!(escape("back\\slash/fwd"), "back\\\\slash\\/fwd");
        assert_eq!(escape("line\nbreak"), "line\\nbreak");
    }

    #[test]
    fn round_trips() {
        let raw = "Lounge | AFK / away\tnow";
        assert_eq!(unescape(&escape(raw)), raw);
    }

    #[test]
    fn unescape_is_lenient() {
        assert_eq!(unescape("odd\\q"), "oddq");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }
}
