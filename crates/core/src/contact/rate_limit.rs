use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);
pub const RATE_LIMIT_MAX_REQUESTS: usize = 3;

/// Tracked clients before the map is reset.
const MAX_TRACKED_KEYS: usize = 1000;

/// Sliding-window limiter keyed by client address.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_requests: usize,
    hits: Mutex<HashMap<String, Vec<Instant>>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RATE_LIMIT_WINDOW, RATE_LIMIT_MAX_REQUESTS)
    }
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            window,
            max_requests,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request from `key`. Returns false when it is over the limit.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut hits = self.hits.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let recent = hits.entry(key.to_string()).or_default();
        recent.retain(|at| now.saturating_duration_since(*at) < self.window);
        if recent.len() >= self.max_requests {
            return false;
        }
        recent.push(now);

        if hits.len() > MAX_TRACKED_KEYS {
            tracing::debug!(tracked = hits.len(), "resetting rate limiter");
            hits.clear();
        }
        true
    }
}
