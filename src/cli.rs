//! CLI argument definitions using clap derive macros.

use std::time::Duration;

use clap::Parser;

use fetchpool_core::{DEFAULT_MAX_RETRIES, DEFAULT_WORKERS, ScraperConfig};

/// Fetch a list of URLs with a bounded worker pool.
///
/// URLs are taken from the arguments, or one per line from stdin when no
/// arguments are given. Blank lines and lines starting with `#` are skipped.
#[derive(Parser, Debug)]
#[command(name = "fetchpool")]
#[command(author, version, about)]
pub struct Args {
    /// URLs to fetch (reads stdin if none are given)
    pub urls: Vec<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error log output
    #[arg(short, long)]
    pub quiet: bool,

    /// Worker pool size (0 starts one worker per URL)
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS as u16, value_parser = clap::value_parser!(u16).range(0..=1000))]
    pub workers: u16,

    /// Per-attempt timeout in seconds (0 uses the default of 30)
    #[arg(short = 't', long, default_value_t = 30)]
    pub timeout: u64,

    /// Maximum attempts per URL (0 or 1 means no retry)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES as u8, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub max_retries: u8,

    /// Minimum delay between one worker's requests in milliseconds (0 to disable, max 60000)
    #[arg(short = 'l', long, default_value_t = 0, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub rate_limit: u64,

    /// Backoff unit in milliseconds; the wait after attempt n is n times this
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..=60000))]
    pub backoff: u64,

    /// User-Agent header to send
    #[arg(short = 'A', long)]
    pub user_agent: Option<String>,

    /// Cancel pending retries after this many seconds
    #[arg(long)]
    pub deadline: Option<u64>,
}

impl Args {
    /// Builds the run configuration from the parsed flags.
    pub fn scraper_config(&self) -> ScraperConfig {
        let mut config = ScraperConfig::new()
            .with_max_workers(usize::from(self.workers))
            .with_timeout(Duration::from_secs(self.timeout))
            .with_max_retries(u32::from(self.max_retries))
            .with_rate_limit(Duration::from_millis(self.rate_limit))
            .with_backoff_base(Duration::from_millis(self.backoff));
        if let Some(ua) = &self.user_agent {
            config = config.with_user_agent(ua.clone());
        }
        config
    }
}

/// Extracts URLs from newline-separated text, skipping blanks and `#` comments.
pub fn parse_url_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["fetchpool"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(args.urls.is_empty());
        assert_eq!(args.workers, 5);
        assert_eq!(args.timeout, 30);
        assert_eq!(args.max_retries, 3);
        assert_eq!(args.rate_limit, 0);
        assert_eq!(args.backoff, 1000);
        assert_eq!(args.user_agent, None);
        assert_eq!(args.deadline, None);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["fetchpool", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_positional_urls() {
        let args =
            Args::try_parse_from(["fetchpool", "https://a.example", "https://b.example"]).unwrap();
        assert_eq!(args.urls, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_cli_workers_zero_allowed() {
        let args = Args::try_parse_from(["fetchpool", "-w", "0"]).unwrap();
        assert_eq!(args.workers, 0);
    }

    #[test]
    fn test_cli_max_retries_above_limit_rejected() {
        let result = Args::try_parse_from(["fetchpool", "-r", "11"]);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
    }

    #[test]
    fn test_cli_rate_limit_above_max_rejected() {
        let result = Args::try_parse_from(["fetchpool", "-l", "60001"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_zero_backoff_rejected() {
        let result = Args::try_parse_from(["fetchpool", "--backoff", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let result = Args::try_parse_from(["fetchpool", "--help"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::DisplayHelp
        );
    }

    #[test]
    fn test_scraper_config_from_flags() {
        let args = Args::try_parse_from([
            "fetchpool",
            "-w",
            "3",
            "-t",
            "10",
            "-r",
            "2",
            "-l",
            "250",
            "--backoff",
            "500",
            "-A",
            "bot/1.0",
        ])
        .unwrap();
        let config = args.scraper_config();
        assert_eq!(config.max_workers, 3);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.rate_limit, Duration::from_millis(250));
        assert_eq!(config.backoff_base, Duration::from_millis(500));
        assert_eq!(config.user_agent.as_deref(), Some("bot/1.0"));
    }

    #[test]
    fn test_parse_url_lines_skips_blank_and_comments() {
        let text = "https://a.example\n\n  # comment\n  https://b.example  \n";
        assert_eq!(
            parse_url_lines(text),
            vec!["https://a.example", "https://b.example"]
        );
    }
}
