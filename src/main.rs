//! `fetch-control` command line harness.
//!
//! Fetches each URL through its own channel of one shared [`Fetcher`].
//! Ctrl+C cancels every outstanding request at once.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde_json::json;
use url::Url;

use fetch_control::config::loader::load_config;
use fetch_control::observability::logging::{init_logging, DEFAULT_FILTER};
use fetch_control::{FetchRequest, Fetcher, FetcherConfig, Transport};

#[derive(Parser)]
#[command(name = "fetch-control")]
#[command(about = "Fetch URLs with retries and group cancellation", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Attempts per request (overrides the config file).
    #[arg(short, long)]
    retries: Option<u32>,

    /// Delay between attempts in milliseconds (overrides the config file).
    #[arg(short, long)]
    wait_ms: Option<u64>,

    /// URLs to fetch, one channel each.
    #[arg(required = true)]
    urls: Vec<Url>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(DEFAULT_FILTER)?;

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => FetcherConfig {
            retry: fetch_control::config::RetryConfig::channel_default(),
            ..FetcherConfig::default()
        },
    };
    if let Some(retries) = cli.retries {
        config.retry.retry_count = retries;
    }
    if let Some(wait_ms) = cli.wait_ms {
        config.retry.wait_time_ms = wait_ms;
    }

    tracing::info!(
        retry_count = config.retry.retry_count,
        wait_time_ms = config.retry.wait_time_ms,
        urls = cli.urls.len(),
        "fetch-control starting"
    );

    let fetcher = Arc::new(Fetcher::from_config(&config)?);

    let mut tasks = Vec::with_capacity(cli.urls.len());
    for url in cli.urls {
        let channel = fetcher.create_fetch_function(&config.retry)?;
        tasks.push(tokio::spawn(async move {
            let result = channel.fetch(FetchRequest::get(url.clone())).await;
            (url, result)
        }));
    }

    let canceller = fetcher.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling all requests");
            canceller.cancel();
        }
    });

    for task in tasks {
        let (url, result) = task.await?;
        let line = match result {
            Ok(response) => json!({ "url": url.as_str(), "status": response.status().as_u16() }),
            Err(e) => json!({
                "url": url.as_str(),
                "error": e.to_string(),
                "aborted": e.is_abort(),
            }),
        };
        println!("{}", serde_json::to_string(&line)?);
    }

    ctrl_c.abort();
    Ok(())
}
