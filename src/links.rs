//! Finding URLs in free-form message text.

use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s/$.?#].[^\s]*").expect("URL regex is valid"));

/// Every http(s) URL in `text`, in the order they appear
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
