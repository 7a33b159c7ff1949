//! Turning arbitrary names into cache keys

use regex::Regex;
use std::sync::LazyLock;

/// Characters removed outright
const STRIPPED: &[char] = &[
    '?', '[', ']', '/', '\\', '=', '<', '>', ':', ';', ',', '\'', '"', '&', '$', '#', '*', '(',
    ')', '|', '~', '`', '!', '{', '}', '-',
];

static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s_]+").unwrap());

/// Normalize a name (an IP address, a request fingerprint...) into a cache key
///
/// Filesystem-hostile characters and hyphens are dropped, anything else
/// outside `[A-Za-z0-9_.]` and whitespace is dropped too, runs of whitespace
/// and underscores become a single `_`, and leading or trailing `.`, `-` and
/// `_` are trimmed. The result is either empty or a valid cache key, and
/// sanitizing it again returns it unchanged.
pub fn sanitize(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| !STRIPPED.contains(c))
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.' || c.is_whitespace())
        .collect();

    SEPARATOR_RE
        .replace_all(&kept, "_")
        .trim_matches(|c| matches!(c, '.' | '-' | '_'))
        .to_string()
}
