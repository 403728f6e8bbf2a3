#![allow(unused)]

use crate::prelude::{eprintln, *};
use clap::Parser;
use colored::Colorize;

mod error;
mod github;
mod instagram;
mod output;
mod pagination;
mod prelude;
mod session;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "List the accounts you follow that don't follow you back"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "NONFOLLOWERS_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// GitHub accounts you follow that don't follow back
    Github(crate::github::GitHubOptions),

    /// Instagram accounts under a follower threshold that don't follow back
    Instagram(crate::instagram::InstagramOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    let result = match app.command {
        SubCommands::Github(options) => crate::github::run(options, app.global).await,
        SubCommands::Instagram(options) => crate::instagram::run(options, app.global).await,
    };

    if let Err(err) = result {
        let status = err
            .downcast_ref::<crate::error::Error>()
            .and_then(|e| e.status());
        if let Some(status) = status {
            log::debug!("Failed with HTTP status {}", status);
        }
        log::debug!("{:?}", err);
        eprintln!("{} {}", "Error:".red().bold(), err);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        App::command().debug_assert();
    }

    #[test]
    fn test_parse_instagram_defaults() {
        let app =
            App::try_parse_from(["nonfollowers", "instagram", "-u", "me", "-p", "pw"]).unwrap();

        match app.command {
            SubCommands::Instagram(options) => {
                assert_eq!(options.username.as_deref(), Some("me"));
                assert_eq!(options.threshold, 1000);
                assert!(!options.json);
            }
            other => panic!("Expected instagram command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_github_json_flag() {
        let app = App::try_parse_from(["nonfollowers", "github", "-u", "octocat", "-j"]).unwrap();

        match app.command {
            SubCommands::Github(options) => {
                assert!(options.json);
                assert_eq!(options.per_page, 100);
            }
            other => panic!("Expected github command, got {:?}", other),
        }
    }
}
