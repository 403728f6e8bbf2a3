//! Page and cursor primitives
//!
//! Pure helpers for the two pagination conventions the shell follows:
//! RFC 8288 `Link` headers (GitHub) and opaque `max_id` cursors (Instagram).
//! The shell owns the fetch loop; this module only decides what the next
//! cursor is.

use std::collections::HashMap;

/// One fetched page of items plus the cursor for the page after it
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` means the listing is exhausted
    pub next: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next: Option<String>) -> Self {
        Self { items, next }
    }

    /// A page with no successor
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

/// Parse a `Link` header into a map of `rel` to URL
///
/// Entries that don't look like `<url>; rel="name"` are ignored.
///
/// # Example
/// `<https://api.github.com/user/1/followers?page=2>; rel="next"` maps
/// `"next"` to the URL between the angle brackets.
pub fn parse_link_header(header: &str) -> HashMap<String, String> {
    let mut links = HashMap::new();

    for part in header.split(',') {
        let mut segments = part.split(';');

        let Some(target) = segments.next().map(str::trim) else {
            continue;
        };
        let Some(url) = target
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
        else {
            continue;
        };

        for param in segments {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            if key.trim() != "rel" {
                continue;
            }
            // rel may hold several space separated relation types
            for rel in value.trim().trim_matches('"').split_whitespace() {
                links.insert(rel.to_string(), url.to_string());
            }
        }
    }

    links
}

/// Extract the `rel="next"` URL from an optional `Link` header
pub fn next_link(header: Option<&str>) -> Option<String> {
    header.and_then(|h| parse_link_header(h).remove("next"))
}

/// Normalize an empty cursor string to "no more pages"
pub fn non_empty_cursor(cursor: Option<String>) -> Option<String> {
    cursor.filter(|c| !c.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GITHUB_LINK: &str = r#"<https://api.github.com/user/583231/followers?per_page=100&page=2>; rel="next", <https://api.github.com/user/583231/followers?per_page=100&page=5>; rel="last""#;

    #[test]
    fn test_parse_link_header_next_and_last() {
        let links = parse_link_header(GITHUB_LINK);

        assert_eq!(links.len(), 2);
        assert_eq!(
            links.get("next").map(String::as_str),
            Some("https://api.github.com/user/583231/followers?per_page=100&page=2")
        );
        assert_eq!(
            links.get("last").map(String::as_str),
            Some("https://api.github.com/user/583231/followers?per_page=100&page=5")
        );
    }

    #[test]
    fn test_next_link_absent_on_last_page() {
        let header = r#"<https://api.github.com/x?page=1>; rel="prev", <https://api.github.com/x?page=1>; rel="first""#;
        assert_eq!(next_link(Some(header)), None);
        assert_eq!(next_link(None), None);
    }

    #[test]
    fn test_parse_link_header_ignores_garbage() {
        let links = parse_link_header("garbage, <no-rel>, <https://x>; title=\"y\"");
        assert!(links.is_empty());
    }

    #[test]
    fn test_parse_link_header_multiple_rel_values() {
        let links = parse_link_header(r#"<https://x/?page=3>; rel="next last""#);
        assert_eq!(links.get("next").map(String::as_str), Some("https://x/?page=3"));
        assert_eq!(links.get("last").map(String::as_str), Some("https://x/?page=3"));
    }

    #[test]
    fn test_non_empty_cursor() {
        assert_eq!(non_empty_cursor(Some("QVFE".to_string())), Some("QVFE".to_string()));
        assert_eq!(non_empty_cursor(Some("  ".to_string())), None);
        assert_eq!(non_empty_cursor(None), None);
    }

    #[test]
    fn test_last_page_has_no_cursor() {
        assert_eq!(Page::last(vec![3]).next, None);
    }
}
