use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use postsiva::apis::platform::PlatformLinkProbe;
use postsiva::apis::PlatformClient;
use postsiva::cache::{storage, CacheConfig, ResponseCache};
use postsiva::config::Config;
use postsiva::linking::{
    LinkManager, LinkOutcome, PollTiming, PopupFeatures, SystemBrowserLauncher,
};
use postsiva::logger::{self, LogTag};
use postsiva::paths;

#[derive(Parser)]
#[command(name = "postsiva", about = "Command-line client for the Postsiva platform")]
struct Cli {
    /// Path to the JSON config file (defaults to the per-user data directory)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Connect an external platform account via OAuth
    Link {
        #[arg(long, default_value = "facebook")]
        platform: String,
    },
    /// Show dashboard overview aggregates
    Overview {
        /// Bypass the response cache for this call
        #[arg(long)]
        refresh: bool,
    },
    /// Show usage counters for the current billing period
    Usage {
        #[arg(long)]
        refresh: bool,
    },
    /// List subscription tiers
    Tiers {
        #[arg(long)]
        refresh: bool,
    },
    /// Show response cache statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    logger::init();

    // Logging flags are consumed straight from the raw arguments by
    // logger::init; strip them before clap sees the command line.
    let args: Vec<String> = env::args()
        .filter(|a| !(a.starts_with("--debug-") || a == "--quiet" || a == "--verbose"))
        .collect();
    let cli = Cli::parse_from(args);

    let config_path = cli.config.unwrap_or_else(paths::config_file);
    let config = Config::load(&config_path)
        .with_context(|| format!("Loading config from {}", config_path.display()))?;
    logger::debug(
        LogTag::Config,
        &format!("Loaded configuration from {}", config_path.display()),
    );

    let cache = Arc::new(ResponseCache::new(CacheConfig::custom(
        std::time::Duration::from_secs(config.cache.default_ttl_secs),
        config.cache.capacity,
    )));
    let snapshot_path = paths::cache_snapshot_file();
    if config.cache.persist {
        let restored = storage::load_snapshot(&cache, &snapshot_path)
            .unwrap_or_else(|e| {
                logger::warning(LogTag::Cache, &format!("Ignoring cache snapshot: {}", e));
                0
            });
        if restored > 0 {
            logger::debug(
                LogTag::Cache,
                &format!("Restored {} cached responses", restored),
            );
        }
    }

    let client = Arc::new(
        PlatformClient::new(&config.api)
            .context("Creating platform client")?
            .with_cache(cache.clone()),
    );

    match cli.command {
        Command::Link { platform } => run_link(&config, client, &platform).await?,
        Command::Overview { refresh } => {
            let overview = client.dashboard_overview(refresh).await?;
            println!("Connected pages:  {}", overview.connected_pages);
            println!("Scheduled posts:  {}", overview.scheduled_posts);
            println!("Published posts:  {}", overview.published_posts);
            println!("Failed posts:     {}", overview.failed_posts);
        }
        Command::Usage { refresh } => {
            let usage = client.usage(refresh).await?;
            println!(
                "Posts:          {}/{}",
                usage.posts_used, usage.posts_limit
            );
            println!(
                "AI generations: {}/{}",
                usage.ai_generations_used, usage.ai_generations_limit
            );
            if let Some(period_end) = usage.period_end {
                println!("Period ends:    {}", period_end);
            }
        }
        Command::Tiers { refresh } => {
            let tiers = client.platform_tiers(refresh).await?;
            for tier in tiers {
                println!(
                    "{:<12} {:>8} {}  posts={} ai={}",
                    tier.name,
                    format!("{:.2}", tier.monthly_price_cents as f64 / 100.0),
                    tier.currency,
                    tier.post_limit,
                    tier.ai_generation_limit
                );
            }
        }
        Command::Stats => {
            let metrics = cache.metrics();
            println!("Entries:     {}", cache.len());
            println!("Hits:        {}", metrics.hits);
            println!("Misses:      {}", metrics.misses);
            println!("Expirations: {}", metrics.expirations);
            println!("Hit rate:    {:.1}%", metrics.hit_rate() * 100.0);
        }
    }

    if config.cache.persist {
        if let Err(e) = storage::save_snapshot(&cache, &snapshot_path) {
            logger::warning(LogTag::Cache, &format!("Could not persist cache: {}", e));
        }
    }

    Ok(())
}

async fn run_link(config: &Config, client: Arc<PlatformClient>, platform: &str) -> Result<()> {
    logger::info(
        LogTag::Link,
        &format!("Requesting authorization URL for {}", platform),
    );
    let auth_url = client.authorization_url(platform).await?;

    let probe = Arc::new(PlatformLinkProbe::new(client, platform));
    let mut manager = LinkManager::new(
        probe,
        Box::new(SystemBrowserLauncher),
        PollTiming::from(&config.linking),
        PopupFeatures::new(config.linking.popup_width, config.linking.popup_height),
    );

    let mut session = manager.start(&auth_url)?;
    println!("Complete the authorization in your browser; waiting for confirmation...");

    match session.wait().await {
        Some(LinkOutcome::Linked) => {
            println!("Account linked. You can start scheduling posts.");
        }
        Some(LinkOutcome::PopupClosed) => {
            println!("Connection cancelled.");
        }
        Some(LinkOutcome::TimedOut) => {
            println!("The authorization was not confirmed in time. Please try again.");
        }
        None => {
            // Only reachable if the session was cancelled elsewhere
            println!("Linking attempt cancelled.");
        }
    }

    Ok(())
}
