//! Default User-Agent sent when the run does not configure one.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/fetchpool";

/// Default User-Agent for fetch requests (identifies the tool).
#[must_use]
pub(crate) fn default_fetch_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("fetchpool/{version} (+{PROJECT_UA_URL})")
}
