// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter keyed by client identifier.
//!
//! Each client gets a counter and the instant its current window opened.
//! A window resets only once strictly more than the window length has
//! elapsed, so a client can get up to twice the limit through across a
//! window boundary.
//!
//! The whole map sits behind one async mutex, which makes the
//! read-modify-write of an entry atomic for concurrent requests from the
//! same client.

use crate::config::RateLimitConfig;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Requests counted in the current window, including this one
        count: u32,
        /// Remaining requests in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Human readable message stating the limit
        message: String,
        /// Time until the current window closes
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Counter state for one client.
#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    window_start: Instant,
}

/// Thread-safe fixed-window rate limiter.
///
/// Cloning is cheap and clones share the same counters.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Arc<Mutex<HashMap<String, WindowEntry>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check and count one request from `client_id`.
    ///
    /// An allowed request is counted; a denied one leaves the counter as is.
    pub async fn check(&self, client_id: &str) -> RateLimitResult {
        let now = Instant::now();
        let window = self.config.window_duration();
        let limit = self.config.max_requests;

        let mut windows = self.windows.lock().await;

        let entry = match windows.entry(client_id.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(WindowEntry {
                    count: 1,
                    window_start: now,
                });
                return allowed(1, limit, window);
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };

        let elapsed = now.duration_since(entry.window_start);
        if elapsed > window {
            debug!(client = %client_id, ?elapsed, "Window expired, resetting");
            *entry = WindowEntry {
                count: 1,
                window_start: now,
            };
            return allowed(1, limit, window);
        }

        let reset_in = window.saturating_sub(elapsed);
        if entry.count >= limit {
            info!(client = %client_id, count = entry.count, "Rate limit exceeded");
            return RateLimitResult::Limited {
                message: limit_message(limit, window),
                retry_after: reset_in,
            };
        }

        entry.count += 1;
        allowed(entry.count, limit, reset_in)
    }

    /// Drop entries whose window opened longer ago than the stale threshold.
    /// Returns the number of entries removed.
    pub async fn cleanup(&self) -> usize {
        let now = Instant::now();
        let stale_after = self.config.stale_after();

        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, entry| now.duration_since(entry.window_start) <= stale_after);
        let removed = before - windows.len();

        if removed > 0 {
            debug!(removed, tracked = windows.len(), "Pruned stale rate limit entries");
        }
        removed
    }

    /// Number of clients currently tracked.
    pub async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.len()
    }
}

fn allowed(count: u32, limit: u32, reset_in: Duration) -> RateLimitResult {
    RateLimitResult::Allowed {
        count,
        remaining: limit.saturating_sub(count),
        reset_in,
    }
}

fn limit_message(limit: u32, window: Duration) -> String {
    let per = match window.as_millis() {
        60_000 => "minute".to_string(),
        1_000 => "second".to_string(),
        ms if ms % 1_000 == 0 => format!("{} seconds", ms / 1_000),
        ms => format!("{ms} ms"),
    };
    format!("Rate limit exceeded: maximum {limit} requests per {per}")
}
