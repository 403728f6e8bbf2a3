pub mod auth;
pub mod client;
pub mod feed;

use crate::output::{new_spinner, print_result};
use crate::pagination::set_spinner_msg;
use crate::prelude::{eprintln, *};
use crate::session::{FileSessionStore, MemorySessionStore, SessionStore};
use indicatif::ProgressBar;
use nonfollowers_core::reconcile::{build_result, ReconciliationResult, DEFAULT_FOLLOWER_THRESHOLD};
use nonfollowers_core::report::Platform;
use nonfollowers_core::user::RelationKind;
use std::path::PathBuf;

use auth::{authenticate, Credentials};

/// Options for the Instagram non-followers report
#[derive(Debug, clap::Args, Clone)]
pub struct InstagramOptions {
    /// Instagram username
    #[arg(short, long)]
    pub username: Option<String>,

    /// Instagram password, only needed when no saved session can be reused
    #[arg(short, long, env = "INSTAGRAM_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Output JSON
    #[arg(short, long)]
    pub json: bool,

    /// Only report accounts with fewer followers than this
    #[arg(long, default_value_t = DEFAULT_FOLLOWER_THRESHOLD)]
    pub threshold: u64,

    /// Where to keep the saved session (defaults to the user cache directory)
    #[arg(long, env = "INSTAGRAM_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// Never read or write a saved session
    #[arg(long)]
    pub no_session_cache: bool,

    /// Instagram private API base URL
    #[arg(long, env = "INSTAGRAM_API_URL")]
    pub api_url: Option<String>,

    /// Accounts requested per feed page
    #[arg(long, default_value_t = InstagramConfig::DEFAULT_PAGE_SIZE)]
    pub page_size: u32,
}

/// Instagram API configuration
#[derive(Debug, Clone)]
pub struct InstagramConfig {
    pub api_url: String,
    pub page_size: u32,
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            api_url: Self::DEFAULT_API_URL.to_string(),
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

impl InstagramConfig {
    pub const DEFAULT_API_URL: &'static str = "https://i.instagram.com/api/v1";
    pub const DEFAULT_PAGE_SIZE: u32 = 200;

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(mut self, api_url: Option<String>, page_size: Option<u32>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(size) = page_size.filter(|s| *s > 0) {
            self.page_size = size;
        }
        self
    }
}

/// Parameters for an Instagram non-followers run
#[derive(Debug, Clone)]
pub struct InstagramParams {
    pub credentials: Credentials,
    pub threshold: u64,
    pub config: InstagramConfig,
}

/// Logged in account and its reconciliation
#[derive(Debug, Clone)]
pub struct InstagramNonFollowers {
    pub username: String,
    pub result: ReconciliationResult,
}

/// Authenticate, fetch both feeds concurrently, reconcile and apply the threshold
pub async fn nonfollowers_data(
    params: InstagramParams,
    store: &dyn SessionStore,
    spinner: Option<&ProgressBar>,
) -> Result<InstagramNonFollowers> {
    let InstagramParams {
        credentials,
        threshold,
        config,
    } = params;

    set_spinner_msg(spinner, "Authenticating...");
    let (client, me) = authenticate(&config, &credentials, store, spinner).await?;
    log::info!("Logged in as @{} ({})", me.username, me.user_id);

    set_spinner_msg(spinner, f!("Fetching followers data for @{}...", me.username));
    let (following, followers) = tokio::try_join!(
        feed::list_relation(
            &client,
            &me.user_id,
            RelationKind::Following,
            config.page_size,
            spinner
        ),
        feed::list_relation(
            &client,
            &me.user_id,
            RelationKind::Followers,
            config.page_size,
            spinner
        ),
    )?;

    Ok(InstagramNonFollowers {
        username: me.username,
        result: build_result(following, followers, Some(threshold)),
    })
}

fn session_store(options: &InstagramOptions, username: &str) -> Result<Box<dyn SessionStore>> {
    if options.no_session_cache {
        return Ok(Box::new(MemorySessionStore::default()));
    }

    let path = match &options.session_file {
        Some(path) => path.clone(),
        None => FileSessionStore::default_path(username)?,
    };

    Ok(Box::new(FileSessionStore::new(path)))
}

/// Handle the instagram command
pub async fn run(options: InstagramOptions, global: crate::Global) -> Result<()> {
    let credentials = Credentials::new(options.username.clone(), options.password.clone())?;
    let config = InstagramConfig::default()
        .with_overrides(options.api_url.clone(), Some(options.page_size));
    let store = session_store(&options, &credentials.username)?;

    if global.verbose {
        eprintln!("Instagram API Base: {}", config.api_url);
        eprintln!("Session: {}", store.describe());
    }

    let spinner = new_spinner()?;
    let params = InstagramParams {
        credentials,
        threshold: options.threshold,
        config,
    };

    let data = nonfollowers_data(params, store.as_ref(), Some(&spinner)).await;

    // Clear the spinner before printing output
    spinner.finish_and_clear();
    let data = data?;

    print_result(Platform::Instagram, &data.username, &data.result, options.json)
}
