//! Constants for the fetch module (timeouts, body limits, backoff).

use std::time::Duration;

/// Default per-attempt timeout, used when the configured timeout is zero.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of body bytes read per fetch (1 MiB). Longer bodies are truncated.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Base unit for linear retry backoff.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Upper bound on a single backoff wait.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);
