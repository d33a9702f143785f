//! Fixed-window rate limiting for the public submission endpoints.
//!
//! One window per client identifier, reset lazily on the first request
//! after expiry. The limiter is advisory: the identifier comes from
//! spoofable proxy headers and the map lives in process memory, so it
//! deters casual abuse rather than a distributed attacker. Multi-instance
//! deployments get an independent counter per instance; swapping in a
//! shared store only requires replacing this type behind
//! `check_and_increment`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::config::RateLimitConfig;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Per-identifier submission counter.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<String, Window>>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            max_requests: config.max_requests,
            window: config.window,
        }
    }

    /// Records one request from `identifier` and reports whether it is
    /// allowed.
    ///
    /// The read/compare/increment sequence runs inside a single critical
    /// section, so concurrent requests from the same identifier cannot
    /// both slip under the limit. A denied request does not mutate the
    /// window.
    pub async fn check_and_increment(&self, identifier: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        match windows.get_mut(identifier) {
            Some(window) if now < window.reset_at => {
                if window.count >= self.max_requests {
                    return false;
                }
                window.count += 1;
                true
            }
            _ => {
                windows.insert(
                    identifier.to_owned(),
                    Window {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                true
            }
        }
    }
}
