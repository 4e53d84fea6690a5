//! Human-readable output for results and run summaries.

use std::time::Duration;

use fetchpool_core::{FetchResult, Stats};

/// Formats a byte count with binary units (`1536` -> `"1.5 KB"`).
pub fn format_bytes(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    const PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

    if bytes < UNIT {
        return format!("{bytes} B");
    }

    let mut div = UNIT;
    let mut exp = 0usize;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    #[allow(clippy::cast_precision_loss)]
    let value = bytes as f64 / div as f64;
    format!("{value:.1} {}B", PREFIXES[exp])
}

/// One line per result.
pub fn format_result(result: &FetchResult) -> String {
    match &result.error {
        None => format!(
            "Worker {} succeeded: {} [{}] {} in {}ms (retries: {})",
            result.worker_id,
            result.url,
            result.status,
            format_bytes(result.size as u64),
            result.duration.as_millis(),
            result.retries,
        ),
        Some(error) => format!(
            "Worker {} failed: {} {} (retries: {})",
            result.worker_id, result.url, error, result.retries,
        ),
    }
}

/// Run summary: counts, bytes, average duration and wall-clock time.
pub fn format_summary(stats: &Stats, elapsed: Duration) -> String {
    format!(
        "{} succeeded, {} failed of {} total; {} fetched, avg {}ms; took {:.2}s",
        stats.success_requests,
        stats.failed_requests,
        stats.total_requests,
        format_bytes(stats.total_bytes),
        stats.average_duration().as_millis(),
        elapsed.as_secs_f64(),
    )
}
