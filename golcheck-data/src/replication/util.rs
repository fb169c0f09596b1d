//! Shared helpers used by the change sources.

use super::BaseUrl;

/// Default replication feed used when the configured base URL is blank.
pub const DEFAULT_BASE_URL: &str = "https://planet.openstreetmap.org/replication/minute";

/// Trim trailing slashes and fall back to the public minutely feed.
pub(crate) fn sanitise_base_url(url: impl Into<String>) -> BaseUrl {
    let raw = url.into();
    let trimmed = raw.trim_end_matches('/');
    if trimmed.is_empty() {
        BaseUrl::from(DEFAULT_BASE_URL)
    } else {
        BaseUrl::new(trimmed.to_owned())
    }
}
