//! Statute-Crawler main entry point
//!
//! This is the command-line interface for the statute crawler.

use anyhow::Context;
use clap::Parser;
use statute_crawler::config::{load_config_with_hash, Config};
use statute_crawler::crawler::crawl;
use statute_crawler::tree::{print_statistics, TreeStatistics};
use statute_crawler::RetrievalTarget;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Statute-Crawler: a hierarchy crawler for legal-code websites
///
/// Statute-Crawler walks a legal code from its table of contents down to
/// every section, reading leaf tables in place, and reports what it built.
#[derive(Parser, Debug)]
#[command(name = "statute-crawler")]
#[command(version)]
#[command(about = "A hierarchy crawler for legal-code websites", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Start from this URL instead of the configured one
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(url) = cli.url {
        RetrievalTarget::parse(&url).context("invalid --url")?;
        config.crawler.start_url = url;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("statute_crawler=info,warn"),
            1 => EnvFilter::new("statute_crawler=debug,info"),
            2 => EnvFilter::new("statute_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config) {
    println!("=== Statute-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Start URL: {}", config.crawler.start_url);
    println!(
        "  Max concurrent children: {}",
        config.crawler.max_concurrent_children
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nRetry:");
    println!("  Initial interval: {}ms", config.retry.initial_interval_ms);
    println!("  Max interval: {}ms", config.retry.max_interval_ms);
    println!("  Multiplier: {}", config.retry.multiplier);
    println!("  Give up after: {}ms", config.retry.max_elapsed_ms);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling crawl");
            on_interrupt.cancel();
        }
    });

    let tree = match crawl(&config, cancel).await {
        Ok(tree) => tree,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    let stats = TreeStatistics::from_tree(&tree);
    print_statistics(tree.title(), &stats);

    Ok(())
}
