use crate::pagination::set_spinner_msg;
use crate::prelude::*;
use crate::session::SessionStore;
use indicatif::ProgressBar;
use nonfollowers_core::http::format_http_error;
use nonfollowers_core::instagram::{
    describe_error, generate_device, login_form, ClientConstants, DeviceIdentity,
    InstagramCurrentUserResponse, InstagramLoginResponse, SessionState,
};

use super::client::{error_for_status, InstagramClient};
use super::InstagramConfig;

/// Username and password for a fresh login
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Both values must be present and non-blank
    pub fn new(username: Option<String>, password: Option<String>) -> Result<Self> {
        let username = username.map(|u| u.trim().to_string()).unwrap_or_default();
        let password = password.unwrap_or_default();

        if username.is_empty() || password.is_empty() {
            return Err(Error::Authentication(
                "Instagram username and password are required (--username, --password)".to_string(),
            )
            .into());
        }

        Ok(Self { username, password })
    }
}

/// The logged in account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: String,
    pub username: String,
}

/// Stored session for this account, if one can be loaded and turned into a client
///
/// Any problem reading the stored session is logged and treated like an
/// empty store.
fn saved_session(
    config: &InstagramConfig,
    credentials: &Credentials,
    store: &dyn SessionStore,
) -> Option<InstagramClient> {
    match store.load() {
        Ok(Some(state)) if state.belongs_to(&credentials.username) => {
            match InstagramClient::from_session(config, &state) {
                Ok(client) => return Some(client),
                Err(err) => log::warn!(
                    "Saved session in {} is unusable: {}",
                    store.describe(),
                    err
                ),
            }
        }
        Ok(Some(state)) => log::warn!(
            "Saved session in {} belongs to @{}, logging in as @{}",
            store.describe(),
            state.username,
            credentials.username
        ),
        Ok(None) => log::info!("No saved session in {}", store.describe()),
        Err(err) => log::warn!(
            "Could not reuse saved session from {}: {}",
            store.describe(),
            err
        ),
    }

    None
}

/// Log in with username and password and persist the new session
///
/// A failure to save the session is logged and ignored.
async fn fresh_login(
    config: &InstagramConfig,
    credentials: &Credentials,
    store: &dyn SessionStore,
    spinner: Option<&ProgressBar>,
) -> Result<InstagramClient> {
    set_spinner_msg(spinner, "Logging in with username & password...");
    let device = generate_device(&credentials.username);
    let client = InstagramClient::unauthenticated(config, &device)?;
    let state = login(&client, credentials, device).await?;

    match store.save(&state) {
        Ok(()) => log::info!("Saved new session to {}", store.describe()),
        Err(err) => log::warn!("Failed to save session to {}: {}", store.describe(), err),
    }

    InstagramClient::from_session(config, &state)
}

fn is_authentication_error(err: &color_eyre::eyre::Report) -> bool {
    matches!(err.downcast_ref::<Error>(), Some(Error::Authentication(_)))
}

/// Produce an authenticated client and the account it belongs to
///
/// A stored session is tried first. If Instagram rejects it, the session is
/// replaced by a fresh login once.
pub async fn authenticate(
    config: &InstagramConfig,
    credentials: &Credentials,
    store: &dyn SessionStore,
    spinner: Option<&ProgressBar>,
) -> Result<(InstagramClient, CurrentUser)> {
    if let Some(client) = saved_session(config, credentials, store) {
        set_spinner_msg(spinner, "Reusing saved session...");
        match current_user(&client).await {
            Ok(me) => {
                log::info!("Reused saved session from {}", store.describe());
                return Ok((client, me));
            }
            Err(err) if is_authentication_error(&err) => log::warn!(
                "Saved session in {} was rejected, logging in again: {}",
                store.describe(),
                err
            ),
            Err(err) => return Err(err),
        }
    }

    let client = fresh_login(config, credentials, store, spinner).await?;
    let me = current_user(&client).await?;

    Ok((client, me))
}

fn response_header(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .filter(|v| !v.is_empty())
}

/// `POST /accounts/login/` and turn the response into session state
pub async fn login(
    client: &InstagramClient,
    credentials: &Credentials,
    device: DeviceIdentity,
) -> Result<SessionState> {
    let url = client.url("/accounts/login/");
    let form = login_form(
        &credentials.username,
        &credentials.password,
        &device,
        chrono::Utc::now().timestamp(),
    );

    log::debug!("POST {}", url);
    let response = client
        .http()
        .post(&url)
        .form(&form)
        .send()
        .await
        .map_err(|e| Error::Network(f!("Failed to send login request to Instagram: {}", e)))?;

    let status = response.status();
    let authorization = response_header(&response, "ig-set-authorization");
    let mid = response_header(&response, "ig-set-x-mid");
    let header_user_id = response_header(&response, "ig-set-ig-u-ds-user-id");

    let body = response.text().await.unwrap_or_default();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(error_for_status(status, &body).into());
    }

    let parsed: InstagramLoginResponse = serde_json::from_str(&body).unwrap_or_default();

    if !status.is_success() || !parsed.is_ok() {
        let message = format_http_error(
            status.as_u16(),
            status.canonical_reason(),
            describe_error(&parsed.error_body()).as_deref(),
        );
        return Err(Error::Authentication(message).into());
    }

    let account = parsed.logged_in_user.ok_or_else(|| {
        Error::Authentication("Login response did not include the account".to_string())
    })?;

    let authorization = authorization
        .filter(|a| a.trim_end() != "Bearer IGT:2:")
        .ok_or_else(|| {
            Error::Authentication("Login response did not include an authorization token".to_string())
        })?;

    Ok(SessionState {
        username: credentials.username.clone(),
        device,
        authorization,
        user_id: header_user_id.or_else(|| Some(account.pk.to_string())),
        mid,
        constants: Some(ClientConstants::default()),
    })
}

/// Who the authenticated client is logged in as
pub async fn current_user(client: &InstagramClient) -> Result<CurrentUser> {
    let url = client.url("/accounts/current_user/?edit=true");
    let response: InstagramCurrentUserResponse = client.get_json(&url).await?;

    Ok(CurrentUser {
        user_id: response.user.pk.to_string(),
        username: response.user.username,
    })
}
