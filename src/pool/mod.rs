//! Worker pool, results and statistics.
//!
//! - [`Scraper`] - dispatcher owning the job queue and result stream
//! - [`ResultStream`] - results in completion order, recorded into stats as read
//! - [`FetchResult`] - terminal outcome for one URL
//! - [`StatsAggregator`] / [`Stats`] - mutex-guarded counters and snapshots
//! - [`ScraperConfig`] - validated run settings

mod config;
mod engine;
mod result;
mod stats;
mod worker;

pub use config::{ConfigError, DEFAULT_WORKERS, ScraperConfig};
pub use engine::{ResultStream, Scraper};
pub use result::FetchResult;
pub use stats::{Stats, StatsAggregator};
