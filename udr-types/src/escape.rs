//! Reversible escaping for identifiers used as nested document keys.
//!
//! Document stores reserve `.` as the field-path separator and `$` as the
//! operator prefix, so an access-point name such as `internet.mnc01` cannot
//! be used verbatim as a map key. Each reserved character, and `%` itself,
//! is replaced by a `%XX` triple.

/// Characters that never appear unescaped in an escaped key.
const RESERVED: [(char, &str); 3] = [('%', "%25"), ('.', "%2E"), ('$', "%24")];

/// Escapes a raw identifier for use as a nested document key.
pub fn escape_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match RESERVED.iter().find(|(reserved, _)| *reserved == c) {
            Some((_, triple)) => out.push_str(triple),
            None => out.push(c),
        }
    }
    out
}

/// Reverses [`escape_key`].
///
/// Keys that were stored before escaping was introduced pass through
/// unchanged unless they contain one of the escape triples.
pub fn unescape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut rest = key;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match RESERVED
            .iter()
            .find(|(_, triple)| tail.get(..3).is_some_and(|t| t.eq_ignore_ascii_case(triple)))
        {
            Some((reserved, _)) => {
                out.push(*reserved);
                rest = &tail[3..];
            }
            None => {
                out.push('%');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Stateless handle over [`escape_key`] / [`unescape_key`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyEscaper;

impl KeyEscaper {
    /// See [`escape_key`].
    pub fn escape(&self, raw: &str) -> String {
        escape_key(raw)
    }

    /// See [`unescape_key`].
    pub fn unescape(&self, key: &str) -> String {
        unescape_key(key)
    }

    /// Returns true when `key` contains no reserved separator characters.
    pub fn is_safe_key(&self, key: &str) -> bool {
        !key.contains(['.', '$'])
    }
}
