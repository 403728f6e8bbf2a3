use crate::output::{new_spinner, print_result};
use crate::pagination::{collect_pages, set_spinner_msg};
use crate::prelude::{eprintln, *};
use indicatif::ProgressBar;
use nonfollowers_core::github::{
    error_body_message, is_rate_limited, parse_rate_limit_reset, relation_url,
    transform_github_users, GitHubAuthenticatedUser, GitHubUser,
};
use nonfollowers_core::http::format_http_error;
use nonfollowers_core::pagination::{next_link, Page};
use nonfollowers_core::reconcile::{build_result, ReconciliationResult};
use nonfollowers_core::report::Platform;
use nonfollowers_core::user::{RelationKind, UserRecord};

/// Options for the GitHub non-followers report
#[derive(Debug, clap::Args, Clone)]
pub struct GitHubOptions {
    /// GitHub username (required if no token)
    #[arg(short, long)]
    pub username: Option<String>,

    /// GitHub token, used to infer your account when --username is omitted
    #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output JSON
    #[arg(short, long)]
    pub json: bool,

    /// Page size hint sent with every listing request
    #[arg(long, default_value_t = GitHubConfig::DEFAULT_PER_PAGE)]
    pub per_page: u32,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,
}

/// GitHub API configuration
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_url: String,
    pub token: Option<String>,
    pub per_page: u32,
}

impl GitHubConfig {
    /// Default GitHub REST API base URL
    pub const DEFAULT_API_URL: &'static str = "https://api.github.com";
    pub const DEFAULT_PER_PAGE: u32 = 100;
    const USER_AGENT: &'static str = "nonfollowers-cli";

    /// Blank tokens count as no token
    pub fn new(token: Option<String>) -> Self {
        Self {
            api_url: Self::DEFAULT_API_URL.to_string(),
            token: token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(mut self, api_url: Option<String>, per_page: Option<u32>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(size) = per_page.filter(|s| *s > 0) {
            self.per_page = size;
        }
        self
    }
}

/// Create an HTTP client with GitHub default headers and optional bearer auth
pub fn create_github_client(config: &GitHubConfig) -> Result<reqwest::Client> {
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
    headers.insert(USER_AGENT, HeaderValue::from_static(GitHubConfig::USER_AGENT));

    if let Some(token) = &config.token {
        let mut value = HeaderValue::from_str(&f!("Bearer {token}"))
            .map_err(|e| Error::Authentication(f!("Invalid token: {}", e)))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}

/// Turn a non-success response into a typed error
async fn error_for_response(response: reqwest::Response) -> Error {
    let status = response.status();
    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let remaining = header("x-ratelimit-remaining");
    let reset = header("x-ratelimit-reset");

    let body = response.text().await.unwrap_or_default();
    let message = format_http_error(
        status.as_u16(),
        status.canonical_reason(),
        error_body_message(&body).as_deref(),
    );

    if is_rate_limited(status.as_u16(), remaining.as_deref()) {
        return Error::RateLimited {
            status: status.as_u16(),
            message,
            reset_at: parse_rate_limit_reset(reset.as_deref()),
        };
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Error::Authentication(message);
    }

    Error::Http {
        status: status.as_u16(),
        message,
    }
}

/// Send a GET request and fail on any non-success status
async fn get_checked(client: &reqwest::Client, url: &str) -> Result<reqwest::Response> {
    log::debug!("GET {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Network(f!("Failed to send request to GitHub: {}", e)))?;

    if !response.status().is_success() {
        return Err(error_for_response(response).await.into());
    }

    Ok(response)
}

/// Fetch the account the token belongs to
pub async fn fetch_authenticated_user(
    client: &reqwest::Client,
    config: &GitHubConfig,
) -> Result<GitHubAuthenticatedUser> {
    let url = f!("{}/user", config.api_url);
    let response = get_checked(client, &url).await?;

    response
        .json::<GitHubAuthenticatedUser>()
        .await
        .map_err(|e| Error::Decode(f!("Failed to parse GitHub user response: {}", e)).into())
}

/// Use the explicit username, or ask GitHub who the token belongs to
pub async fn resolve_username(
    client: &reqwest::Client,
    config: &GitHubConfig,
    username: Option<String>,
) -> Result<String> {
    if let Some(name) = username.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
        return Ok(name);
    }

    if config.token.is_none() {
        return Err(Error::Authentication(
            "Username is required. Provide --username <name> or set GITHUB_TOKEN to infer your account."
                .to_string(),
        )
        .into());
    }

    let me = fetch_authenticated_user(client, config).await?;
    log::info!("Token belongs to @{}", me.login);
    Ok(me.login)
}

/// Fetch one listing page and the URL of the page after it
async fn fetch_page(client: &reqwest::Client, url: String) -> Result<Page<UserRecord>> {
    let response = get_checked(client, &url).await?;

    let next = next_link(
        response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok()),
    );

    let users: Vec<GitHubUser> = response
        .json()
        .await
        .map_err(|e| Error::Decode(f!("Failed to parse GitHub users page: {}", e)))?;

    Ok(Page::new(transform_github_users(users), next))
}

/// Fetch every account on one side of the follow graph
pub async fn list_relation(
    client: &reqwest::Client,
    config: &GitHubConfig,
    username: &str,
    relation: RelationKind,
    spinner: Option<&ProgressBar>,
) -> Result<Vec<UserRecord>> {
    let first_url = relation_url(
        &config.api_url,
        &urlencoding::encode(username),
        relation.as_str(),
        config.per_page,
    );

    collect_pages(relation.as_str(), spinner, move |cursor| {
        let url = cursor.unwrap_or_else(|| first_url.clone());
        fetch_page(client, url)
    })
    .await
}

/// Parameters for a GitHub non-followers run
#[derive(Debug, Clone)]
pub struct GitHubParams {
    pub username: Option<String>,
    pub config: GitHubConfig,
}

/// Resolved account and its reconciliation
#[derive(Debug, Clone)]
pub struct GitHubNonFollowers {
    pub username: String,
    pub result: ReconciliationResult,
}

/// Authenticate, fetch both listings concurrently and reconcile them
pub async fn nonfollowers_data(
    params: GitHubParams,
    spinner: Option<&ProgressBar>,
) -> Result<GitHubNonFollowers> {
    let GitHubParams { username, config } = params;
    let client = create_github_client(&config)?;

    let username = resolve_username(&client, &config, username).await?;

    set_spinner_msg(spinner, f!("Fetching followers data for @{}...", username));
    let (following, followers) = tokio::try_join!(
        list_relation(&client, &config, &username, RelationKind::Following, spinner),
        list_relation(&client, &config, &username, RelationKind::Followers, spinner),
    )?;

    Ok(GitHubNonFollowers {
        username,
        result: build_result(following, followers, None),
    })
}

/// Handle the github command
pub async fn run(options: GitHubOptions, global: crate::Global) -> Result<()> {
    let config = GitHubConfig::new(options.token.clone())
        .with_overrides(options.api_url.clone(), Some(options.per_page));

    if global.verbose {
        eprintln!("GitHub API Base: {}", config.api_url);
    }

    let spinner = new_spinner()?;
    let params = GitHubParams {
        username: options.username.clone(),
        config,
    };

    let data = nonfollowers_data(params, Some(&spinner)).await;

    // Clear the spinner before printing output
    spinner.finish_and_clear();
    let data = data?;

    print_result(Platform::GitHub, &data.username, &data.result, options.json)
}
