//! Lemmaseek main entry point
//!
//! This is the command-line interface for the Lemmaseek site search engine.

use anyhow::Context;
use clap::{Parser, Subcommand};
use lemmaseek::config::{load_config_with_hash, Config};
use lemmaseek::output::{print_search_results, print_statistics};
use lemmaseek::Engine;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Lemmaseek: a lemma-indexed search engine for a fixed set of sites
///
/// Lemmaseek crawls every configured site, reduces page text to lemmas and
/// answers free-text queries ranked by lemma frequency.
#[derive(Parser, Debug)]
#[command(name = "lemmaseek")]
#[command(version = "1.0.0")]
#[command(about = "A lemma-indexed site search engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl and index every configured site, discarding earlier data
    Crawl {
        /// Validate config and show what would be crawled without crawling
        #[arg(long)]
        dry_run: bool,
    },

    /// Search the index
    Search {
        /// Free-text query
        query: String,

        /// Restrict results to one configured site
        #[arg(long, value_name = "URL")]
        site: Option<String>,

        /// Number of results to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Maximum number of results (defaults to the configured limit)
        #[arg(long)]
        limit: Option<usize>,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-fetch and re-index a single page of an indexed site
    IndexPage {
        /// Absolute URL of the page
        url: String,
    },

    /// Show index statistics
    Stats {
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    match cli.command {
        Command::Crawl { dry_run: true } => handle_dry_run(&config),
        Command::Crawl { dry_run: false } => handle_crawl(config).await,
        Command::Search {
            query,
            site,
            offset,
            limit,
            json,
        } => handle_search(config, &query, site.as_deref(), offset, limit, json),
        Command::IndexPage { url } => handle_index_page(config, &url).await,
        Command::Stats { json } => handle_stats(config, json),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lemmaseek=info,warn"),
            1 => EnvFilter::new("lemmaseek=debug,info"),
            2 => EnvFilter::new("lemmaseek=trace,debug"),
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

fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Lemmaseek Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Parallelism: {}", config.crawler.parallelism);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nIdentity:");
    println!("  User agent: {}", config.identity.user_agent);
    if let Some(referrer) = &config.identity.referrer {
        println!("  Referrer: {}", referrer);
    }

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);

    println!("\nMorphology:");
    println!("  Language: {}", config.morphology.language);

    println!("\nSites ({}):", config.sites.len());
    for site in &config.sites {
        println!("  - {} ({})", site.name, site.url);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling {} sites", config.sites.len());

    Ok(())
}

async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!("Sites to crawl: {}", config.sites.len());

    let engine = Engine::open(config).context("failed to open the index")?;
    engine.start_indexing().await?;

    tokio::select! {
        _ = engine.wait_until_idle() => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            tracing::warn!("Interrupt received, stopping crawl");
            if let Err(e) = engine.stop_indexing() {
                tracing::debug!("Stop after interrupt: {}", e);
            }
            engine.wait_until_idle().await;
        }
    }

    tracing::info!("Crawl finished");
    print_statistics(&engine.statistics()?);
    Ok(())
}

fn handle_search(
    config: Config,
    query: &str,
    site: Option<&str>,
    offset: usize,
    limit: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let engine = Engine::open(config).context("failed to open the index")?;
    let response = engine.search(query, site, offset, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_search_results(query, &response, offset);
    }
    Ok(())
}

async fn handle_index_page(config: Config, url: &str) -> anyhow::Result<()> {
    let engine = Engine::open(config).context("failed to open the index")?;
    let lemmas = engine.index_single_page(url).await?;
    println!("✓ Indexed {} ({} lemmas)", url, lemmas);
    Ok(())
}

fn handle_stats(config: Config, json: bool) -> anyhow::Result<()> {
    let database = config.storage.database_path.clone();
    let engine = Engine::open(config).context("failed to open the index")?;
    let stats = engine.statistics()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Database: {}\n", database);
        print_statistics(&stats);
    }
    Ok(())
}
