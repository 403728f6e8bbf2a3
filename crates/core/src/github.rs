//! Transformation functions for GitHub REST API responses

use crate::user::UserRecord;
use serde::Deserialize;

// =============================================================================
// API Response Types (Deserialization)
// =============================================================================

/// A user item from `/users/{username}/followers` or `/following`
#[derive(Debug, Deserialize, Clone)]
pub struct GitHubUser {
    pub login: String,
}

/// The authenticated user from `GET /user`
#[derive(Debug, Deserialize, Clone)]
pub struct GitHubAuthenticatedUser {
    pub login: String,
}

/// Error body GitHub returns on non-2xx responses
#[derive(Debug, Deserialize, Clone, Default)]
pub struct GitHubErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Pure Transformation Functions
// =============================================================================

/// Map one page of GitHub users into user records
///
/// GitHub listings don't carry follower counts.
pub fn transform_github_users(users: Vec<GitHubUser>) -> Vec<UserRecord> {
    users
        .into_iter()
        .map(|u| UserRecord::new(u.login))
        .collect()
}

/// Build the first-page URL for a relation listing
pub fn relation_url(api_base: &str, encoded_username: &str, relation: &str, per_page: u32) -> String {
    format!(
        "{}/users/{}/{}?per_page={}",
        api_base.trim_end_matches('/'),
        encoded_username,
        relation,
        per_page
    )
}

/// Whether a failed response means the rate limit quota is exhausted
///
/// GitHub signals this with `403` plus `x-ratelimit-remaining: 0`; secondary
/// limits use `429`.
pub fn is_rate_limited(status: u16, remaining: Option<&str>) -> bool {
    status == 429 || (status == 403 && remaining.map(str::trim) == Some("0"))
}

/// Parse the `x-ratelimit-reset` header (unix seconds)
pub fn parse_rate_limit_reset(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}

/// Extract the `message` field from an error body, if it parses
pub fn error_body_message(body: &str) -> Option<String> {
    serde_json::from_str::<GitHubErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
}
