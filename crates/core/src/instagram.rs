//! Transformation functions for the Instagram private (mobile) API
//!
//! Covers the response shapes used by login, current user lookup and the
//! friendships feeds, the deterministic device identity the client presents,
//! and the session state persisted between runs.

use crate::user::UserRecord;
use serde::{Deserialize, Serialize};

// =============================================================================
// Client identity
// =============================================================================

/// Fixed client values sent with every request
///
/// These are never written to the session cache; they are restored from
/// [`ClientConstants::default`] when a cached session is loaded.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ClientConstants {
    pub app_id: String,
    pub app_version: String,
    pub app_version_code: String,
    pub capabilities: String,
    pub device_string: String,
    pub locale: String,
}

impl Default for ClientConstants {
    fn default() -> Self {
        Self {
            app_id: "567067343352427".to_string(),
            app_version: "222.0.0.13.114".to_string(),
            app_version_code: "350696709".to_string(),
            capabilities: "3brTvw==".to_string(),
            device_string: "29/10; 420dpi; 1080x2340; samsung; SM-G975F; beyond2; exynos9820"
                .to_string(),
            locale: "en_US".to_string(),
        }
    }
}

impl ClientConstants {
    pub fn user_agent(&self) -> String {
        format!(
            "Instagram {} Android ({}; {}; {})",
            self.app_version, self.device_string, self.locale, self.app_version_code
        )
    }
}

/// Identifiers of the emulated Android device
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// `android-` followed by 16 hex characters
    pub device_id: String,
    pub uuid: String,
    pub phone_id: String,
    pub adid: String,
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

/// Format 32 hex characters as an 8-4-4-4-12 UUID
fn hex_to_uuid(hex: &str) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Derive a stable device identity from a seed, usually the username
///
/// The same seed always produces the same device so that repeated logins
/// look like one phone to the platform.
pub fn generate_device(seed: &str) -> DeviceIdentity {
    let base = md5_hex(seed);

    DeviceIdentity {
        device_id: format!("android-{}", &base[..16]),
        uuid: hex_to_uuid(&md5_hex(&format!("{seed}:uuid"))),
        phone_id: hex_to_uuid(&md5_hex(&format!("{seed}:phone"))),
        adid: hex_to_uuid(&md5_hex(&format!("{seed}:adid"))),
    }
}

/// Password envelope accepted by the login endpoint (version 0, plain text)
pub fn encode_password(password: &str, timestamp: i64) -> String {
    format!("#PWD_INSTAGRAM:0:{timestamp}:{password}")
}

/// Form body for `POST /accounts/login/`
pub fn login_form(
    username: &str,
    password: &str,
    device: &DeviceIdentity,
    timestamp: i64,
) -> Vec<(&'static str, String)> {
    vec![
        ("username", username.to_string()),
        ("enc_password", encode_password(password, timestamp)),
        ("guid", device.uuid.clone()),
        ("phone_id", device.phone_id.clone()),
        ("device_id", device.device_id.clone()),
        ("adid", device.adid.clone()),
        ("google_tokens", "[]".to_string()),
        ("login_attempt_count", "0".to_string()),
    ]
}

// =============================================================================
// Session state
// =============================================================================

/// Authentication state that lets a later run skip the login call
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub username: String,
    pub device: DeviceIdentity,
    /// Value for the `Authorization` header, `Bearer IGT:2:...`
    pub authorization: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub mid: Option<String>,
    /// Internal-only; stripped before the state is saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constants: Option<ClientConstants>,
}

impl SessionState {
    /// Copy of this state suitable for persisting
    pub fn for_storage(&self) -> Self {
        Self {
            constants: None,
            ..self.clone()
        }
    }

    /// Client constants, falling back to the built-in defaults
    pub fn constants(&self) -> ClientConstants {
        self.constants.clone().unwrap_or_default()
    }

    /// Whether this state was saved for `username`
    pub fn belongs_to(&self, username: &str) -> bool {
        self.username.eq_ignore_ascii_case(username.trim())
    }
}

// =============================================================================
// API Response Types (Deserialization)
// =============================================================================

/// Instagram returns ids and cursors as either JSON strings or numbers
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum StringOrNumber {
    Str(String),
    Num(u64),
}

impl std::fmt::Display for StringOrNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StringOrNumber::Str(s) => f.write_str(s),
            StringOrNumber::Num(n) => write!(f, "{n}"),
        }
    }
}

/// Minimal account shape shared by login and current user responses
#[derive(Debug, Deserialize, Clone)]
pub struct InstagramAccount {
    pub pk: StringOrNumber,
    pub username: String,
}

/// Response of `POST /accounts/login/`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct InstagramLoginResponse {
    #[serde(default)]
    pub logged_in_user: Option<InstagramAccount>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
}

impl InstagramLoginResponse {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("ok")
    }

    /// Error fields of a rejected login
    pub fn error_body(&self) -> InstagramErrorBody {
        InstagramErrorBody {
            message: self.message.clone(),
            error_type: self.error_type.clone(),
        }
    }
}

/// Response of `GET /accounts/current_user/`
#[derive(Debug, Deserialize, Clone)]
pub struct InstagramCurrentUserResponse {
    pub user: InstagramAccount,
}

/// One user in a followers or following feed page
#[derive(Debug, Deserialize, Clone)]
pub struct InstagramUser {
    pub username: String,
    #[serde(default)]
    pub follower_count: Option<u64>,
}

/// One page of `GET /friendships/{user_id}/followers/` or `/following/`
#[derive(Debug, Deserialize, Clone)]
pub struct InstagramFriendshipsResponse {
    #[serde(default)]
    pub users: Vec<InstagramUser>,
    #[serde(default)]
    pub next_max_id: Option<StringOrNumber>,
}

/// Error body returned with non-2xx responses
#[derive(Debug, Deserialize, Clone, Default)]
pub struct InstagramErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
}

// =============================================================================
// Pure Transformation Functions
// =============================================================================

/// Map one feed page into user records
pub fn transform_instagram_users(users: Vec<InstagramUser>) -> Vec<UserRecord> {
    users
        .into_iter()
        .map(|u| UserRecord::with_follower_count(u.username, u.follower_count))
        .collect()
}

/// Cursor for the next feed page, `None` once the feed is exhausted
pub fn next_cursor(response: &InstagramFriendshipsResponse) -> Option<String> {
    crate::pagination::non_empty_cursor(response.next_max_id.as_ref().map(|c| c.to_string()))
}

/// URL for one page of a friendships feed
pub fn friendships_url(
    api_base: &str,
    user_id: &str,
    relation: &str,
    count: u32,
    max_id: Option<&str>,
) -> String {
    let mut url = format!(
        "{}/friendships/{}/{}/?count={}",
        api_base.trim_end_matches('/'),
        user_id,
        relation,
        count
    );
    if let Some(cursor) = max_id {
        url.push_str("&max_id=");
        url.push_str(cursor);
    }
    url
}

/// Human readable message for an error body
pub fn describe_error(body: &InstagramErrorBody) -> Option<String> {
    match (&body.message, &body.error_type) {
        (Some(message), Some(kind)) if !message.is_empty() => Some(format!("{message} ({kind})")),
        (Some(message), _) if !message.is_empty() => Some(message.clone()),
        (_, Some(kind)) => Some(kind.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_device_is_deterministic() {
        let a = generate_device("someone");
        let b = generate_device("someone");
        let c = generate_device("someone_else");

        assert_eq!(a, b);
        assert_ne!(a.device_id, c.device_id);
        assert!(a.device_id.starts_with("android-"));
        assert_eq!(a.device_id.len(), "android-".len() + 16);
        assert_eq!(a.uuid.len(), 36);
        assert_eq!(a.uuid.matches('-').count(), 4);
        assert_ne!(a.uuid, a.phone_id);
    }

    #[test]
    fn test_encode_password() {
        assert_eq!(
            encode_password("hunter2", 1_700_000_000),
            "#PWD_INSTAGRAM:0:1700000000:hunter2"
        );
    }

    #[test]
    fn test_login_form_carries_device() {
        let device = generate_device("me");
        let form = login_form("me", "pw", &device, 1);

        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("username"), Some("me"));
        assert_eq!(get("enc_password"), Some("#PWD_INSTAGRAM:0:1:pw"));
        assert_eq!(get("device_id"), Some(device.device_id.as_str()));
        assert_eq!(get("guid"), Some(device.uuid.as_str()));
    }

    #[test]
    fn test_session_for_storage_strips_constants() {
        let state = SessionState {
            username: "me".to_string(),
            device: generate_device("me"),
            authorization: "Bearer IGT:2:abc".to_string(),
            user_id: Some("42".to_string()),
            mid: None,
            constants: Some(ClientConstants::default()),
        };

        let stored = state.for_storage();
        let json = serde_json::to_value(&stored).unwrap();

        assert!(stored.constants.is_none());
        assert!(json.get("constants").is_none());
        assert_eq!(json["authorization"], "Bearer IGT:2:abc");
        assert_eq!(stored.constants(), ClientConstants::default());
    }

    #[test]
    fn test_session_belongs_to() {
        let state = SessionState {
            username: "Me".to_string(),
            device: generate_device("me"),
            authorization: "Bearer x".to_string(),
            user_id: None,
            mid: None,
            constants: None,
        };
        assert!(state.belongs_to("me"));
        assert!(!state.belongs_to("you"));
    }

    #[test]
    fn test_user_agent() {
        let ua = ClientConstants::default().user_agent();
        assert!(ua.starts_with("Instagram 222.0.0.13.114 Android (29/10;"));
        assert!(ua.ends_with("en_US; 350696709)"));
    }

    #[test]
    fn test_feed_page_with_numeric_cursor() {
        let page: InstagramFriendshipsResponse = serde_json::from_str(
            r#"{
                "users": [
                    {"pk": 1, "username": "Alice", "follower_count": 120, "is_private": false},
                    {"pk": "2", "username": "bob"}
                ],
                "next_max_id": 200,
                "big_list": true,
                "status": "ok"
            }"#,
        )
        .unwrap();

        assert_eq!(next_cursor(&page), Some("200".to_string()));

        let records = transform_instagram_users(page.users);
        assert_eq!(
            records,
            vec![
                UserRecord::with_follower_count("alice", Some(120)),
                UserRecord::new("bob"),
            ]
        );
    }

    #[test]
    fn test_feed_page_without_cursor_is_last() {
        let page: InstagramFriendshipsResponse =
            serde_json::from_str(r#"{"users": [], "big_list": false, "status": "ok"}"#).unwrap();
        assert_eq!(next_cursor(&page), None);

        let page: InstagramFriendshipsResponse =
            serde_json::from_str(r#"{"users": [], "next_max_id": "", "status": "ok"}"#).unwrap();
        assert_eq!(next_cursor(&page), None);
    }

    #[test]
    fn test_friendships_url() {
        assert_eq!(
            friendships_url("https://i.instagram.com/api/v1/", "42", "followers", 200, None),
            "https://i.instagram.com/api/v1/friendships/42/followers/?count=200"
        );
        assert_eq!(
            friendships_url("https://i.instagram.com/api/v1", "42", "following", 200, Some("QVFB")),
            "https://i.instagram.com/api/v1/friendships/42/following/?count=200&max_id=QVFB"
        );
    }

    #[test]
    fn test_rejected_login_response() {
        let response: InstagramLoginResponse = serde_json::from_str(
            r#"{"message": "challenge_required", "error_type": "checkpoint_challenge_required", "status": "fail"}"#,
        )
        .unwrap();

        assert!(!response.is_ok());
        assert!(response.logged_in_user.is_none());
        assert_eq!(
            describe_error(&response.error_body()).as_deref(),
            Some("challenge_required (checkpoint_challenge_required)")
        );
    }

    #[test]
    fn test_describe_error() {
        let body: InstagramErrorBody = serde_json::from_str(
            r#"{"message": "The password you entered is incorrect.", "error_type": "bad_password", "status": "fail"}"#,
        )
        .unwrap();
        assert_eq!(
            describe_error(&body).as_deref(),
            Some("The password you entered is incorrect. (bad_password)")
        );
        assert_eq!(describe_error(&InstagramErrorBody::default()), None);
    }
}
