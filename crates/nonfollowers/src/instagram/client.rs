use crate::prelude::*;
use nonfollowers_core::http::format_http_error;
use nonfollowers_core::instagram::{
    describe_error, ClientConstants, DeviceIdentity, InstagramErrorBody, SessionState,
};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT_LANGUAGE, AUTHORIZATION, USER_AGENT,
};
use serde::de::DeserializeOwned;

use super::InstagramConfig;

/// HTTP client preloaded with the headers of an Android Instagram app
///
/// Built once per run, either before login (no authorization) or from a
/// session state.
#[derive(Debug, Clone)]
pub struct InstagramClient {
    http: reqwest::Client,
    api_url: String,
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| eyre!("Invalid header value: {}", e))
}

fn device_headers(constants: &ClientConstants, device: &DeviceIdentity) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value(&constants.user_agent())?);
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US"));
    headers.insert(
        HeaderName::from_static("x-ig-app-id"),
        header_value(&constants.app_id)?,
    );
    headers.insert(
        HeaderName::from_static("x-ig-capabilities"),
        header_value(&constants.capabilities)?,
    );
    headers.insert(
        HeaderName::from_static("x-ig-connection-type"),
        HeaderValue::from_static("WIFI"),
    );
    headers.insert(
        HeaderName::from_static("x-ig-device-id"),
        header_value(&device.uuid)?,
    );
    headers.insert(
        HeaderName::from_static("x-ig-android-id"),
        header_value(&device.device_id)?,
    );
    Ok(headers)
}

impl InstagramClient {
    fn build(config: &InstagramConfig, headers: HeaderMap) -> Result<Self> {
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Client used for the login call itself
    pub fn unauthenticated(config: &InstagramConfig, device: &DeviceIdentity) -> Result<Self> {
        Self::build(config, device_headers(&ClientConstants::default(), device)?)
    }

    /// Client carrying the authorization of a previous login
    pub fn from_session(config: &InstagramConfig, session: &SessionState) -> Result<Self> {
        let mut headers = device_headers(&session.constants(), &session.device)?;

        let mut authorization = HeaderValue::from_str(&session.authorization)
            .map_err(|e| Error::Authentication(f!("Invalid session authorization: {}", e)))?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        if let Some(mid) = &session.mid {
            headers.insert(HeaderName::from_static("x-mid"), header_value(mid)?);
        }
        if let Some(user_id) = &session.user_id {
            headers.insert(
                HeaderName::from_static("ig-u-ds-user-id"),
                header_value(user_id)?,
            );
        }

        Self::build(config, headers)
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Absolute URL for an API path such as `/accounts/login/`
    pub fn url(&self, path: &str) -> String {
        f!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// GET a JSON document, failing on any non-success status
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(f!("Failed to send request to Instagram: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_for_response(response).await.into());
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::Decode(f!("Failed to parse Instagram response: {}", e)).into())
    }
}

/// Map an Instagram error status and body to a typed error
pub fn error_for_status(status: reqwest::StatusCode, body: &str) -> Error {
    let error_body: InstagramErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = format_http_error(
        status.as_u16(),
        status.canonical_reason(),
        describe_error(&error_body).as_deref(),
    );

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Error::RateLimited {
            status: status.as_u16(),
            message,
            reset_at: None,
        };
    }

    let login_required = error_body.message.as_deref() == Some("login_required");
    if status == reqwest::StatusCode::UNAUTHORIZED || login_required {
        return Error::Authentication(message);
    }

    Error::Http {
        status: status.as_u16(),
        message,
    }
}

async fn error_for_response(response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error_for_status(status, &body)
}
