//! Uni-Scout main entry point
//!
//! This is the command-line interface for the Uni-Scout keyword crawler.

use clap::Parser;
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;
use uni_scout::config::{load_config_with_hash, Config};
use uni_scout::{CrawlRequest, CrawlService};

/// Uni-Scout: finds keyword-relevant pages on a university website
///
/// Uni-Scout crawls one site breadth-first from the seed URL, ranks the
/// paragraphs of every page against the keywords, and prints progress and
/// findings as JSON lines on stdout while it runs.
#[derive(Parser, Debug)]
#[command(name = "uni-scout")]
#[command(version = "1.0.0")]
#[command(about = "A keyword scout for university websites", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// Keyword to look for (repeat for several, highest priority first)
    #[arg(short, long = "keyword", value_name = "KEYWORD", required = true)]
    keywords: Vec<String>,

    /// Link depth below the seed page (defaults to crawler.default-depth)
    #[arg(short, long)]
    depth: Option<i32>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

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
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let mut request = CrawlRequest::new(cli.url.clone(), cli.keywords.clone());
    request.depth = cli.depth;

    if cli.dry_run {
        handle_dry_run(&config, &request);
        return Ok(());
    }

    handle_crawl(&config, request).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries only the event stream.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("uni_scout=info,warn"),
            1 => EnvFilter::new("uni_scout=debug,info"),
            2 => EnvFilter::new("uni_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective settings and exits
fn handle_dry_run(config: &Config, request: &CrawlRequest) {
    println!("=== Uni-Scout Dry Run ===\n");

    println!("Request:");
    println!("  Seed: {}", request.url);
    println!("  Keywords: {}", request.keywords.join(", "));
    println!(
        "  Depth: {}",
        request.depth.unwrap_or(config.crawler.default_depth)
    );

    println!("\nCrawler:");
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Links per page: {}", config.crawler.max_links_per_page);
    println!("  Strict dedup: {}", config.crawler.strict_dedup);
    println!("  Extract PDFs: {}", config.crawler.extract_pdf);

    println!("\nFetcher:");
    println!("  HTTP deadline: {}ms", config.fetcher.http_timeout_ms);
    println!(
        "  Browser fallback: {}",
        if config.fetcher.browser_fallback {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!(
        "  Navigation deadline: {}ms (+{}ms settle)",
        config.fetcher.navigation_timeout_ms, config.fetcher.settle_ms
    );

    println!("\nRanking:");
    println!("  Minimum score: {}", config.ranking.min_score);
    println!("  Findings per page: {}", config.ranking.max_findings);

    println!("\nStorage: {:?}", config.storage.backend);

    println!("\n✓ Configuration is valid");
}

/// Runs one crawl job, printing every event as a JSON line until it completes
async fn handle_crawl(config: &Config, request: CrawlRequest) -> Result<(), Box<dyn std::error::Error>> {
    let service = CrawlService::from_config(config)?;
    let (job_id, mut events) = match service.submit_and_subscribe(request) {
        Ok(submitted) => submitted,
        Err(e) => {
            tracing::error!("Crawl request rejected: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!("Started crawl job {}", job_id);

    loop {
        match events.recv().await {
            Ok(event) => {
                println!("{}", event.to_json()?);
                if event.is_complete() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("Event stream lagged, {} events dropped", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }

    service.shutdown();
    tracing::info!("Crawl job {} finished", job_id);
    Ok(())
}
