use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde::Serialize;

use repofolio::{
    cache::{DataOrigin, RepositoryCache},
    config::{CacheConfig, Config},
    model::RepositorySummary,
    scheduler::Scheduler,
    selection::SelectionPolicy,
    services::build_cache,
    source::GitHubSource,
};

/// repofolio - cached GitHub repository listings for portfolio sites
///
/// Fetches an account's repositories, picks the ones worth showing and keeps
/// serving the last good listing (or a built-in default) when GitHub is
/// unreachable.
///
/// If the GITHUB_TOKEN environment variable is set, it will be used for authentication.
/// This raises the API rate limit.
///
/// Examples:
///   repofolio pinned octocat
///   repofolio watch octocat --interval 600
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// API token for higher rate limits
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Seconds before a cached listing is considered stale
    #[arg(long, value_name = "SECS", default_value_t = 1800, global = true)]
    pub ttl: u64,

    /// Seconds before an upstream request is abandoned
    #[arg(long, value_name = "SECS", default_value_t = 10, global = true)]
    pub timeout: u64,

    /// Comma-separated name fragments that always make the listing
    #[arg(
        long,
        value_name = "NAMES",
        value_delimiter = ',',
        default_value = "pharmup,seculearn",
        global = true
    )]
    pub featured: Vec<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print the selected repositories of an account as JSON
    Pinned(PinnedArgs),

    /// Print the profile of an account as JSON
    Profile(ProfileArgs),

    /// Keep the cache warm for one or more accounts until interrupted
    Watch(WatchArgs),
}

#[derive(clap::Args, Debug)]
pub struct PinnedArgs {
    /// The GitHub account
    #[arg(value_name = "ACCOUNT")]
    pub account: String,

    /// Also print cache statistics to stderr
    #[arg(long)]
    pub stats: bool,
}

#[derive(clap::Args, Debug)]
pub struct ProfileArgs {
    /// The GitHub account
    #[arg(value_name = "ACCOUNT")]
    pub account: String,
}

#[derive(clap::Args, Debug)]
pub struct WatchArgs {
    /// Accounts to keep warm
    #[arg(value_name = "ACCOUNT", required = true)]
    pub accounts: Vec<String>,

    /// Seconds between refreshes
    #[arg(long, value_name = "SECS", default_value_t = 7200)]
    pub interval: u64,
}

#[derive(Serialize)]
struct PinnedOutput<'a> {
    source: DataOrigin,
    repositories: &'a [RepositorySummary],
}

impl Cli {
    fn config(&self) -> Config {
        Config::new(
            self.api_url.clone(),
            self.token.clone(),
            Some(Duration::from_secs(self.timeout)),
        )
    }

    fn cache_config(&self, owner: &str) -> CacheConfig {
        CacheConfig::for_owner(owner)
            .with_ttl(Duration::from_secs(self.ttl))
            .with_selection(SelectionPolicy::default().with_featured(self.featured.clone()))
    }

    fn build_cache(&self, owner: &str) -> Result<RepositoryCache<GitHubSource>> {
        build_cache(&self.config(), self.cache_config(owner))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Pinned(args) => {
            let cache = cli.build_cache(&args.account)?;
            let fetched = cache
                .fetch_pinned_repositories_with_origin(&args.account)
                .await;
            let output = PinnedOutput {
                source: fetched.origin,
                repositories: &fetched.data,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            if args.stats {
                eprintln!("{}", serde_json::to_string_pretty(&cache.cache_stats())?);
            }
        }
        Commands::Profile(args) => {
            let cache = cli.build_cache(&args.account)?;
            let profile = cache
                .fetch_profile(&args.account)
                .await
                .with_context(|| format!("Failed to fetch profile for {}", args.account))?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Commands::Watch(args) => {
            let cache = Arc::new(cli.build_cache(&args.accounts[0])?);
            let scheduler = Scheduler::new(cache, args.accounts.clone())
                .with_interval(Duration::from_secs(args.interval.max(1)));
            scheduler
                .run(async {
                    let _ = tokio::signal::ctrl_c().await;
                    info!("Interrupted");
                })
                .await;
        }
    }
    Ok(())
}
