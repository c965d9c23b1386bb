//! Per-address submission rate limiting.
//!
//! A sliding-window limiter over an in-memory store keyed by client
//! address. The store is explicitly bounded: entries are pruned lazily on
//! access, a full cleanup runs every `cleanup_interval` requests, and the
//! number of tracked addresses is hard-capped by `max_tracked_keys` so a
//! flood of spoofed addresses cannot grow the map without bound.
//!
//! The check-then-record sequence runs under a single lock, so concurrent
//! requests from the same address can never admit more than `max_requests`
//! per window.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::utils::error::{Result, SubmitError};

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum admitted requests per key per window.
    pub max_requests: u32,

    /// Window size in seconds.
    pub window_secs: u64,

    /// Run a full cleanup every N requests.
    pub cleanup_interval: u64,

    /// Hard cap on unique addresses tracked. When reached, a new address is
    /// admitted only if a forced cleanup frees a slot; otherwise it is
    /// rejected with the rate-limit error.
    pub max_tracked_keys: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            // 5 submissions per minute per address
            max_requests: 5,
            window_secs: 60,
            cleanup_interval: 100,
            max_tracked_keys: 10_000,
        }
    }
}

/// Sliding-window rate limiter shared across requests via `Arc`.
pub struct RateLimiter {
    config: RateLimitConfig,
    state: Mutex<HashMap<String, Vec<Instant>>>,
    request_count: AtomicU64,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Mutex::new(HashMap::new()),
            request_count: AtomicU64::new(0),
        }
    }

    /// Admits or rejects a request from `key` at the current time.
    ///
    /// Admission records a timestamp; rejection records nothing, so a
    /// rejected client does not extend its own penalty.
    pub fn check(&self, key: &str) -> Result<()> {
        let now = Instant::now();
        let window = Duration::from_secs(self.config.window_secs);
        let cutoff = now.checked_sub(window).unwrap_or(now);

        let count = self.request_count.fetch_add(1, Ordering::Relaxed);
        if count > 0 && count % self.config.cleanup_interval == 0 {
            tracing::debug!(request_count = count, "running periodic rate limiter cleanup");
            self.cleanup();
        }

        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if !state.contains_key(key) && state.len() >= self.config.max_tracked_keys {
            // Prune expired entries in place to make room for the new key.
            state.retain(|_, stamps| {
                stamps.retain(|&t| t > cutoff);
                !stamps.is_empty()
            });
            if state.len() >= self.config.max_tracked_keys {
                tracing::warn!(
                    key = %key,
                    tracked = state.len(),
                    max = self.config.max_tracked_keys,
                    "rejecting new address: tracked-key cap reached"
                );
                return Err(SubmitError::RateLimited);
            }
        }

        let timestamps = state.entry(key.to_string()).or_default();
        timestamps.retain(|&t| t > cutoff);

        if timestamps.len() >= self.config.max_requests as usize {
            tracing::warn!(
                key = %key,
                requests = timestamps.len(),
                max = self.config.max_requests,
                "rate limit exceeded"
            );
            return Err(SubmitError::RateLimited);
        }

        timestamps.push(now);
        Ok(())
    }

    /// Drops every address with no request inside the current window.
    pub fn cleanup(&self) {
        let now = Instant::now();
        let window = Duration::from_secs(self.config.window_secs);
        let cutoff = now.checked_sub(window).unwrap_or(now);

        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        state.retain(|_, timestamps| {
            timestamps.retain(|&t| t > cutoff);
            !timestamps.is_empty()
        });
    }

    /// Number of addresses currently tracked.
    pub fn tracked_keys(&self) -> usize {
        let state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.len()
    }
}
