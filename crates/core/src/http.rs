//! Platform-independent helpers for describing failed HTTP responses

use chrono::{DateTime, Local, Utc};

/// `HTTP <code> <reason>` plus the platform message when there is one
pub fn format_http_error(status: u16, reason: Option<&str>, message: Option<&str>) -> String {
    let mut text = match reason {
        Some(reason) => format!("HTTP {status} {reason}"),
        None => format!("HTTP {status}"),
    };

    if let Some(message) = message.filter(|m| !m.is_empty()) {
        text.push_str(": ");
        text.push_str(message);
    }

    text
}

/// Format a unix timestamp in the local timezone
pub fn format_reset_time(reset_at: i64) -> Option<String> {
    let utc = DateTime::<Utc>::from_timestamp(reset_at, 0)?;
    Some(
        utc.with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    )
}

/// Suffix appended to rate limit errors
pub fn rate_limit_suffix(reset_at: Option<i64>) -> String {
    reset_at
        .and_then(format_reset_time)
        .map(|when| format!(" (rate limit resets at {when})"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_http_error() {
        assert_eq!(
            format_http_error(404, Some("Not Found"), Some("Not Found")),
            "HTTP 404 Not Found: Not Found"
        );
        assert_eq!(format_http_error(500, None, None), "HTTP 500");
        assert_eq!(
            format_http_error(502, Some("Bad Gateway"), Some("")),
            "HTTP 502 Bad Gateway"
        );
    }

    #[test]
    fn test_format_reset_time() {
        assert!(format_reset_time(1_700_000_000).is_some());
        assert_eq!(format_reset_time(i64::MAX), None);
    }

    #[test]
    fn test_rate_limit_suffix() {
        assert!(rate_limit_suffix(Some(1_700_000_000)).starts_with(" (rate limit resets at "));
        assert_eq!(rate_limit_suffix(None), "");
    }
}
