//! URL path extraction and decoding.

use std::borrow::Cow;

use http::Uri;
use indexmap::IndexMap;
use parking_lot::Mutex;
use percent_encoding::percent_decode_str;

/// Extract the path component of a request URL or public path.
///
/// Accepts origin-form (`/a/b?q`), absolute (`http://host/a/`) and
/// protocol-relative (`//host/a/`) URLs. Strings without a leading slash or
/// scheme are treated as bare relative paths. Returns `None` when the input
/// can't be parsed, e.g. it contains raw control characters or spaces.
/// Parsing is stricter than Node's `url.parse`: characters such as a raw
/// backtick are rejected instead of being escaped.
pub fn parse_pathname(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }

    if url.starts_with("//") {
        // The leading `//` introduces a host, not an empty path segment
        let uri: Uri = format!("http:{url}").parse().ok()?;
        return Some(uri.path().to_string());
    }

    if url.starts_with('/') || url.contains("://") {
        let uri: Uri = url.parse().ok()?;
        return Some(uri.path().to_string());
    }

    // Bare relative path such as `assets/`
    if url.chars().any(|c| c.is_control() || c == ' ') {
        return None;
    }
    let end = url.find(|c: char| c == '?' || c == '#').unwrap_or(url.len());
    Some(url[..end].to_string())
}

/// Decode a path remainder with form-unescape semantics.
///
/// `+` becomes a space and `%XX` escapes are decoded. Malformed escapes are
/// kept verbatim and invalid UTF-8 is replaced lossily.
pub fn unescape(segment: &str) -> Cow<'_, str> {
    if segment.contains('+') {
        let spaced = segment.replace('+', " ");
        Cow::Owned(percent_decode_str(&spaced).decode_utf8_lossy().into_owned())
    } else {
        percent_decode_str(segment).decode_utf8_lossy()
    }
}

/// Bounded LRU memo of parsed public paths.
///
/// Keyed by raw public-path strings only. Request URLs are never memoized.
#[derive(Debug)]
pub struct PublicPathCache {
    entries: Mutex<IndexMap<String, Option<String>>>,
    capacity: usize,
}

impl PublicPathCache {
    pub const DEFAULT_CAPACITY: usize = 64;

    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(IndexMap::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    /// Parsed path of `public_path`, computing and caching it on a miss.
    pub fn pathname(&self, public_path: &str) -> Option<String> {
        let mut entries = self.entries.lock();

        if let Some(index) = entries.get_index_of(public_path) {
            let last = entries.len() - 1;
            entries.move_index(index, last);
            return entries[last].clone();
        }

        let parsed = parse_pathname(public_path);
        entries.insert(public_path.to_string(), parsed.clone());
        if entries.len() > self.capacity {
            entries.shift_remove_index(0);
        }

        parsed
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn contains(&self, public_path: &str) -> bool {
        self.entries.lock().contains_key(public_path)
    }
}

impl Default for PublicPathCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origin_form() {
        assert_eq!(parse_pathname("/assets/app.js?v=1").as_deref(), Some("/assets/app.js"));
        assert_eq!(parse_pathname("/").as_deref(), Some("/"));
    }

    #[test]
    fn test_parse_absolute_and_protocol_relative() {
        assert_eq!(
            parse_pathname("http://localhost:8080/static/").as_deref(),
            Some("/static/")
        );
        assert_eq!(
            parse_pathname("//cdn.example.com/static/").as_deref(),
            Some("/static/")
        );
    }

    #[test]
    fn test_parse_bare_relative() {
        assert_eq!(parse_pathname("assets/").as_deref(), Some("assets/"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_pathname(""), None);
        assert_eq!(parse_pathname("/bad\u{0007}path"), None);
        assert_eq!(parse_pathname("/with space"), None);
        assert_eq!(parse_pathname("/assets/a`b.js"), None);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("foo%20bar.js"), "foo bar.js");
        assert_eq!(unescape("a+b.js"), "a b.js");
        assert_eq!(unescape("100%zz.js"), "100%zz.js");
        assert_eq!(unescape("plain.js"), "plain.js");
        assert_eq!(unescape("%E2%9C%93.txt"), "\u{2713}.txt");
    }

    #[test]
    fn test_cache_evicts_least_recently_used() {
        let cache = PublicPathCache::new(2);

        cache.pathname("/a/");
        cache.pathname("/b/");
        // Touch `/a/` so `/b/` becomes the eviction candidate
        cache.pathname("/a/");
        cache.pathname("/c/");

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("/a/"));
        assert!(!cache.contains("/b/"));
        assert!(cache.contains("/c/"));
    }

    #[test]
    fn test_cache_returns_parsed_value() {
        let cache = PublicPathCache::default();
        assert_eq!(cache.pathname("/x/?q").as_deref(), Some("/x/"));
        assert_eq!(cache.pathname("/x/?q").as_deref(), Some("/x/"));
        assert_eq!(cache.len(), 1);
    }
}
