use serde::{Deserialize, Serialize};

/// A single account as seen in a followers or following listing.
///
/// Usernames are lower-cased on construction so that comparisons across the
/// two listings are case-insensitive.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follower_count: Option<u64>,
}

impl UserRecord {
    pub fn new(username: impl AsRef<str>) -> Self {
        Self {
            username: normalize_username(username.as_ref()),
            follower_count: None,
        }
    }

    pub fn with_follower_count(username: impl AsRef<str>, follower_count: Option<u64>) -> Self {
        Self {
            username: normalize_username(username.as_ref()),
            follower_count,
        }
    }
}

/// Which side of the follow graph a listing targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Followers,
    Following,
}

impl RelationKind {
    /// Path segment used by both platforms for this relation
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Followers => "followers",
            RelationKind::Following => "following",
        }
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a username for comparison
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}
