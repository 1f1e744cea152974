//! Catalog freshness and duration helpers.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

/// Default catalog time-to-live: 24 hours.
pub const DEFAULT_CATALOG_TTL_SECS: i64 = 24 * 60 * 60;

/// Freshness of a cached catalog at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Younger than the TTL; use as-is.
    Fresh,
    /// At or past the TTL; try to refresh, but keep serving on failure.
    Stale,
}

/// Classify data fetched at `fetched_at` as of `now`.
///
/// Data is fresh iff `now - fetched_at < ttl`. A timestamp in the future
/// (clock skew between processes sharing a cache) counts as fresh.
pub fn freshness_at(fetched_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> Freshness {
    if now.signed_duration_since(fetched_at) < ttl {
        Freshness::Fresh
    } else {
        Freshness::Stale
    }
}

/// Parse a TTL string like "7d", "24h", "30m".
///
/// Values too large for a [`Duration`] are rejected.
pub fn parse_ttl(ttl: &str) -> Result<Duration> {
    let ttl = ttl.trim().to_lowercase();

    let duration = if let Some(days) = ttl.strip_suffix('d') {
        Duration::try_days(days.parse()?)
    } else if let Some(hours) = ttl.strip_suffix('h') {
        Duration::try_hours(hours.parse()?)
    } else if let Some(mins) = ttl.strip_suffix('m') {
        Duration::try_minutes(mins.parse()?)
    } else if let Some(secs) = ttl.strip_suffix('s') {
        Duration::try_seconds(secs.parse()?)
    } else {
        // Assume seconds if no suffix
        Duration::try_seconds(ttl.parse()?)
    };

    duration.ok_or_else(|| anyhow::anyhow!("duration out of range: {}", ttl))
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.num_seconds();

    if secs >= 86400 {
        let days = secs / 86400;
        format!("{}d", days)
    } else if secs >= 3600 {
        let hours = secs / 3600;
        format!("{}h", hours)
    } else if secs >= 60 {
        let mins = secs / 60;
        format!("{}m", mins)
    } else {
        format!("{}s", secs)
    }
}
