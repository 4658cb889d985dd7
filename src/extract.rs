use std::sync::LazyLock;

use regex::Regex;

/// `http://` or `https://` followed by a run of non-whitespace. Scheme
/// matching is case-insensitive; the rest of the URL is taken verbatim.
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://\S+").expect("URL regex is valid"));

/// Pull the first URL-shaped substring out of free-form message text.
/// Any additional URLs in the same message are ignored.
pub fn extract_link(text: &str) -> Option<&str> {
    URL_RE.find(text).map(|m| m.as_str())
}
