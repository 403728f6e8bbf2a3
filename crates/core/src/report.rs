//! Output models and text rendering for reconciliation results

use crate::reconcile::{Counts, ReconciliationResult};
use crate::user::UserRecord;
use serde::Serialize;

/// Platform a report was produced for
///
/// Controls the profile URL and how users are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    GitHub,
    Instagram,
}

impl Platform {
    pub fn profile_url(&self, username: &str) -> String {
        match self {
            Platform::GitHub => format!("https://github.com/{username}"),
            Platform::Instagram => format!("https://instagram.com/{username}"),
        }
    }
}

/// A user in JSON output
///
/// GitHub reports plain logins, Instagram reports the full record.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ReportUser {
    Login(String),
    Record(UserRecord),
}

/// JSON document emitted in `--json` mode
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NonFollowersReport {
    pub username: String,
    pub counts: Counts,
    pub users: Vec<ReportUser>,
}

/// Build the JSON report for a reconciliation result
pub fn build_report(
    platform: Platform,
    username: &str,
    result: &ReconciliationResult,
) -> NonFollowersReport {
    let users = result
        .users
        .iter()
        .map(|u| match platform {
            Platform::GitHub => ReportUser::Login(u.username.clone()),
            Platform::Instagram => ReportUser::Record(u.clone()),
        })
        .collect();

    NonFollowersReport {
        username: username.to_string(),
        counts: result.counts,
        users,
    }
}

/// Render the report as pretty-printed JSON
pub fn format_report_json(report: &NonFollowersReport) -> Result<String, String> {
    serde_json::to_string_pretty(report).map_err(|e| format!("JSON serialization failed: {e}"))
}

/// Header line for text output
pub fn format_header(result: &ReconciliationResult) -> String {
    match result.threshold {
        Some(threshold) => format!(
            "Accounts you follow that don't follow back (under {} followers): {}",
            threshold,
            result.users.len()
        ),
        None => format!(
            "Accounts you follow that don't follow back ({}):",
            result.users.len()
        ),
    }
}

/// One text line for a single user
pub fn format_user_line(platform: Platform, user: &UserRecord) -> String {
    let url = platform.profile_url(&user.username);
    match (platform, user.follower_count) {
        (Platform::Instagram, Some(count)) => {
            format!("- {} ({} followers) {}", user.username, count, url)
        }
        _ => format!("- {} {}", user.username, url),
    }
}

/// Render the whole result as plain text, one user per line
pub fn format_report_text(platform: Platform, result: &ReconciliationResult) -> String {
    let mut output = format_header(result);
    output.push('\n');

    if result.threshold.is_some() {
        output.push('\n');
    }

    for user in &result.users {
        output.push_str(&format_user_line(platform, user));
        output.push('\n');
    }

    output
}
