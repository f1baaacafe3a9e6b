#[cfg(test)]
#[path = "rate_limiter_test.rs"]
mod tests;

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use dashmap::DashMap;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::RateLimitDecision;

const DEFAULT_LIMIT: u32 = 10;
const DEFAULT_WINDOW_SECONDS: u64 = 600;

struct Window {
    started_at: u64,
    count: u32,
}

/// Fixed-window admission control keyed by client identifier. The counter is
/// the only cross-request shared mutable state in the process; each check is
/// a single atomic check-and-increment through the map's entry API, so
/// concurrent requests for the same key cannot over-admit.
pub struct RateLimiter {
    limit: u32,
    window_seconds: u64,
    windows: DashMap<String, Window>,
}

fn unix_now() -> u64 {
    return SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| return elapsed.as_secs())
        .unwrap_or(0);
}

impl RateLimiter {
    pub fn new(limit: u32, window_seconds: u64) -> RateLimiter {
        return RateLimiter {
            limit,
            window_seconds,
            windows: DashMap::new(),
        };
    }

    pub fn from_config() -> RateLimiter {
        let limit = Config::get(ConfigKey::RateLimitRequests)
            .parse::<u32>()
            .unwrap_or(DEFAULT_LIMIT);
        let window_seconds = Config::get(ConfigKey::RateLimitWindowSeconds)
            .parse::<u64>()
            .unwrap_or(DEFAULT_WINDOW_SECONDS);

        return RateLimiter::new(limit, window_seconds);
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        return self.check_at(key, unix_now());
    }

    /// Clock-explicit admission check, the seam used by tests to cover window
    /// expiry without sleeping.
    pub fn check_at(&self, key: &str, now: u64) -> RateLimitDecision {
        let mut window = self.windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });

        if now >= window.started_at + self.window_seconds {
            window.started_at = now;
            window.count = 0;
        }

        let admitted = window.count < self.limit;
        if admitted {
            window.count += 1;
        } else {
            tracing::warn!(key = key, limit = self.limit, "rate limit exceeded");
        }

        return RateLimitDecision {
            admitted,
            limit: self.limit,
            remaining: self.limit - window.count,
            reset: window.started_at + self.window_seconds,
        };
    }
}
