// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the email intake service.
//!
//! Every section can be deserialized on its own and falls back to the
//! defaults below. [`Config::from_env`] layers environment variables on top.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Configuration for the email intake service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Per-client admission control
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Submission validation limits
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Session enforcement
    #[serde(default)]
    pub auth: AuthConfig,

    /// Record store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum admitted requests per client per window (default: 10)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in milliseconds (default: 60000)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Entries whose window started longer ago than this are pruned (default: 300000)
    #[serde(default = "default_stale_after_ms")]
    pub stale_after_ms: u64,

    /// Interval between pruning passes in seconds (default: 60)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

/// Validation configuration for email submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Accepted content types (default: application/json)
    #[serde(default = "default_content_types")]
    pub accepted_content_types: Vec<String>,

    /// Maximum subject length in characters (default: 200)
    #[serde(default = "default_max_subject_chars")]
    pub max_subject_chars: usize,

    /// Maximum body length in characters (default: 500000)
    #[serde(default = "default_max_body_chars")]
    pub max_body_chars: usize,

    /// Maximum raw request body in bytes (default: 4 MiB)
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
}

/// Session enforcement configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Require a valid session on every submission (default: true)
    #[serde(default = "default_true")]
    pub enforce_auth: bool,

    /// Endpoint answering 2xx for a valid session
    #[serde(default)]
    pub session_service_url: Option<String>,

    /// Upper bound on one session lookup in milliseconds (default: 2000)
    #[serde(default = "default_session_timeout_ms")]
    pub session_timeout_ms: u64,
}

/// Record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database connection string; the in-memory store is used when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Upper bound on a single insert in milliseconds (default: 5000)
    #[serde(default = "default_store_timeout_ms")]
    pub timeout_ms: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_requests() -> u32 {
    10
}

fn default_window_ms() -> u64 {
    60_000
}

fn default_stale_after_ms() -> u64 {
    300_000 // 5 minutes
}

fn default_cleanup_interval_secs() -> u64 {
    60
}

fn default_content_types() -> Vec<String> {
    vec!["application/json".to_string()]
}

fn default_max_subject_chars() -> usize {
    200
}

fn default_max_body_chars() -> usize {
    500_000
}

fn default_max_payload_bytes() -> usize {
    4 * 1024 * 1024
}

fn default_store_timeout_ms() -> u64 {
    5_000
}

fn default_session_timeout_ms() -> u64 {
    2_000
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            validation: ValidationConfig::default(),
            auth: AuthConfig::default(),
            store: StoreConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_ms: default_window_ms(),
            stale_after_ms: default_stale_after_ms(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            accepted_content_types: default_content_types(),
            max_subject_chars: default_max_subject_chars(),
            max_body_chars: default_max_body_chars(),
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enforce_auth: default_true(),
            session_service_url: None,
            session_timeout_ms: default_session_timeout_ms(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            timeout_ms: default_store_timeout_ms(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Age after which an entry is pruned. Never shorter than one window,
    /// so an entry still counting requests is never dropped.
    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_after_ms.max(self.window_ms))
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}

impl AuthConfig {
    pub fn session_timeout(&self) -> Duration {
        Duration::from_millis(self.session_timeout_ms.max(1))
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Build the configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        Config {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            rate_limit: RateLimitConfig {
                max_requests: parse_value(lookup("RATE_LIMIT_MAX_REQUESTS"))
                    .unwrap_or(defaults.rate_limit.max_requests),
                window_ms: parse_value(lookup("RATE_LIMIT_WINDOW_MS")).unwrap_or(defaults.rate_limit.window_ms),
                stale_after_ms: parse_value(lookup("RATE_LIMIT_STALE_AFTER_MS"))
                    .unwrap_or(defaults.rate_limit.stale_after_ms),
                cleanup_interval_secs: parse_value(lookup("RATE_LIMIT_CLEANUP_SECS"))
                    .unwrap_or(defaults.rate_limit.cleanup_interval_secs),
            },
            validation: ValidationConfig {
                max_subject_chars: parse_value(lookup("MAX_SUBJECT_CHARS"))
                    .unwrap_or(defaults.validation.max_subject_chars),
                max_body_chars: parse_value(lookup("MAX_BODY_CHARS"))
                    .unwrap_or(defaults.validation.max_body_chars),
                max_payload_bytes: parse_value(lookup("MAX_PAYLOAD_BYTES"))
                    .unwrap_or(defaults.validation.max_payload_bytes),
                ..defaults.validation
            },
            auth: AuthConfig {
                enforce_auth: lookup("ENFORCE_AUTH")
                    .and_then(|v| parse_flag(&v))
                    .unwrap_or(defaults.auth.enforce_auth),
                session_service_url: lookup("SESSION_SERVICE_URL").filter(|v| !v.trim().is_empty()),
                session_timeout_ms: parse_value(lookup("SESSION_TIMEOUT_MS"))
                    .unwrap_or(defaults.auth.session_timeout_ms),
            },
            store: StoreConfig {
                database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
                timeout_ms: parse_value(lookup("STORE_TIMEOUT_MS")).unwrap_or(defaults.store.timeout_ms),
            },
            metrics: MetricsConfig {
                enabled: lookup("METRICS_ENABLED")
                    .and_then(|v| parse_flag(&v))
                    .unwrap_or(defaults.metrics.enabled),
                ..defaults.metrics
            },
        }
    }
}

fn parse_value<T: FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|v| v.trim().parse().ok())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
