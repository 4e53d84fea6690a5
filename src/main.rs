//! CLI entry point for the fetchpool tool.

use std::io::{self, IsTerminal, Read};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use fetchpool_core::{CancellationToken, Scraper};
use tracing::{debug, info, warn};

mod cli;
mod report;

use cli::{Args, parse_url_lines};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr so stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let input_text = if !args.urls.is_empty() {
        args.urls.join("\n")
    } else if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read URLs from stdin")?;
        buffer
    } else {
        info!("No input provided. Pipe URLs via stdin or pass as arguments.");
        info!("Example: echo 'https://example.com/' | fetchpool -w 3");
        return Ok(());
    };

    let urls = parse_url_lines(&input_text);
    if urls.is_empty() {
        info!("No URLs found in input");
        return Ok(());
    }

    let scraper = Scraper::new(args.scraper_config()).context("invalid configuration")?;

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());
    if let Some(secs) = args.deadline {
        spawn_deadline(cancel.clone(), Duration::from_secs(secs));
    }

    let start = Instant::now();
    let mut results = scraper.run(urls, cancel);
    while let Some(result) = results.recv().await {
        println!("{}", report::format_result(&result));
    }

    println!(
        "{}",
        report::format_summary(&scraper.stats(), start.elapsed())
    );

    Ok(())
}

fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("interrupt received, cancelling pending retries");
                cancel.cancel();
            }
            Err(e) => warn!(error = %e, "failed to listen for interrupt"),
        }
    });
}

fn spawn_deadline(cancel: CancellationToken, after: Duration) {
    tokio::spawn(async move {
        tokio::select! {
            () = tokio::time::sleep(after) => {
                info!(deadline_secs = after.as_secs(), "deadline reached, cancelling pending retries");
                cancel.cancel();
            }
            () = cancel.cancelled() => {}
        }
    });
}
