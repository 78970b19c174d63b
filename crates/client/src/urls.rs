//! Base URL sanitizing and request URL resolution.

use std::sync::LazyLock;

use regex::Regex;

/// Backend origin used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

static ABSOLUTE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("Invalid regex"));

/// Whether `path` already names a full `http(s)` URL.
#[must_use]
pub fn is_absolute(path: &str) -> bool {
    ABSOLUTE_URL.is_match(path)
}

/// Normalize a configured base URL.
///
/// Blank input yields [`DEFAULT_BASE_URL`]. A missing scheme becomes
/// `http://` and trailing slashes are dropped.
#[must_use]
pub fn sanitize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_BASE_URL.to_owned();
    }
    let with_scheme = if is_absolute(trimmed) {
        trimmed.to_owned()
    } else {
        format!("http://{trimmed}")
    };
    with_scheme.trim_end_matches('/').to_owned()
}

/// Resolve `path` against `base`.
///
/// Absolute URLs pass through untouched. Otherwise the sanitized base and
/// the path are joined with exactly one slash.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    if is_absolute(path) {
        return path.to_owned();
    }
    let base = sanitize_base_url(base);
    format!("{base}/{}", path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_adds_scheme_and_strips_slashes() {
        assert_eq!(
            sanitize_base_url("myapi.example.com"),
            "http://myapi.example.com"
        );
        assert_eq!(
            sanitize_base_url("  https://shop.example//  "),
            "https://shop.example"
        );
        assert_eq!(sanitize_base_url("HTTP://Shop.Example/"), "HTTP://Shop.Example");
    }

    #[test]
    fn test_sanitize_blank_is_default() {
        assert_eq!(sanitize_base_url(""), DEFAULT_BASE_URL);
        assert_eq!(sanitize_base_url("   "), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_join_exactly_one_slash() {
        for base in ["http://api.test", "http://api.test/", "http://api.test///"] {
            for path in ["products", "/products", "//products"] {
                assert_eq!(join_url(base, path), "http://api.test/products");
            }
        }
    }

    #[test]
    fn test_join_keeps_absolute_paths() {
        assert_eq!(
            join_url("http://api.test", "https://other.test/x/"),
            "https://other.test/x/"
        );
        assert_eq!(
            join_url("http://api.test", "HTTP://other.test"),
            "HTTP://other.test"
        );
    }

    #[test]
    fn test_join_keeps_query_string() {
        assert_eq!(
            join_url("api.test/", "/products?limit=5"),
            "http://api.test/products?limit=5"
        );
    }
}
