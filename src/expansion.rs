// src/expansion.rs
//! Domain-expansion lookup cache.
//!
//! The backend expands a skill domain ("cloud") into related keywords.
//! Lookups are cached per normalized domain for 30 minutes so repeated
//! searches within a session do not re-issue the request. Expiry is checked
//! on read; there is no background eviction.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// How long a cached expansion stays fresh.
pub const DOMAIN_EXPANSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Time source, injected so tests can drive the TTL manually.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Result of a domain expansion, cached or fresh.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedDomain {
    /// The normalized domain the keywords belong to.
    pub domain: String,
    pub keywords: Vec<String>,
    /// True when served from the client-side cache without a network call.
    pub cached: bool,
}

/// Wire shape of the `/admin/expand_domain` response. Extra fields
/// (`status`, `domain`, `fallback`) are ignored.
#[derive(Debug, Deserialize)]
pub struct ExpandDomainResponse {
    pub keywords: Vec<String>,
    #[serde(default)]
    pub cached: bool,
}

struct CacheEntry {
    keywords: Vec<String>,
    inserted_at: Instant,
}

/// TTL cache keyed by normalized domain.
///
/// Concurrent lookups for the same key before the first resolves are not
/// de-duplicated; both issue the request and the later write wins.
pub struct DomainExpansionCache {
    ttl: Duration,
    clock: Box<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl DomainExpansionCache {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock), DOMAIN_EXPANSION_TTL)
    }

    pub fn with_clock(clock: Box<dyn Clock>, ttl: Duration) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cache key normalization, shared with the request path.
    pub fn normalize(domain: &str) -> String {
        domain.trim().to_lowercase()
    }

    /// Fresh keywords for a normalized domain, or None on miss/expiry.
    pub fn get(&self, normalized: &str) -> Option<Vec<String>> {
        let entries = self.entries.lock().expect("expansion cache lock poisoned");
        let entry = entries.get(normalized)?;
        if self.clock.now().duration_since(entry.inserted_at) < self.ttl {
            Some(entry.keywords.clone())
        } else {
            None
        }
    }

    /// Store keywords for a normalized domain, overwriting any stale entry.
    pub fn insert(&self, normalized: &str, keywords: Vec<String>) {
        let mut entries = self.entries.lock().expect("expansion cache lock poisoned");
        entries.insert(
            normalized.to_string(),
            CacheEntry {
                keywords,
                inserted_at: self.clock.now(),
            },
        );
    }
}

impl Default for DomainExpansionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Clock that only moves when told to.
    struct ManualClock {
        start: Instant,
        offset: Mutex<Duration>,
    }

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                start: Instant::now(),
                offset: Mutex::new(Duration::ZERO),
            })
        }

        fn advance(&self, by: Duration) {
            *self.offset.lock().unwrap() += by;
        }
    }

    impl Clock for Arc<ManualClock> {
        fn now(&self) -> Instant {
            self.start + *self.offset.lock().unwrap()
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(DomainExpansionCache::normalize("  Finance "), "finance");
        assert_eq!(DomainExpansionCache::normalize("finance"), "finance");
    }

    #[test]
    fn test_hit_within_ttl() {
        let clock = ManualClock::new();
        let cache =
            DomainExpansionCache::with_clock(Box::new(clock.clone()), Duration::from_secs(60));

        cache.insert("cloud", vec!["aws".to_string(), "gcp".to_string()]);
        clock.advance(Duration::from_secs(59));
        assert_eq!(
            cache.get("cloud"),
            Some(vec!["aws".to_string(), "gcp".to_string()])
        );
    }

    #[test]
    fn test_expired_entry_misses() {
        let clock = ManualClock::new();
        let cache =
            DomainExpansionCache::with_clock(Box::new(clock.clone()), Duration::from_secs(60));

        cache.insert("cloud", vec!["aws".to_string()]);
        clock.advance(Duration::from_secs(60));
        assert_eq!(cache.get("cloud"), None);
    }

    #[test]
    fn test_refresh_overwrites() {
        let clock = ManualClock::new();
        let cache =
            DomainExpansionCache::with_clock(Box::new(clock.clone()), Duration::from_secs(60));

        cache.insert("cloud", vec!["aws".to_string()]);
        clock.advance(Duration::from_secs(61));
        cache.insert("cloud", vec!["azure".to_string()]);
        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get("cloud"), Some(vec!["azure".to_string()]));
    }

    #[test]
    fn test_unknown_domain_misses() {
        let cache = DomainExpansionCache::new();
        assert_eq!(cache.get("nope"), None);
    }
}
