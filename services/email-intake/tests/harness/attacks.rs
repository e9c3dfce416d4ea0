// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: Apache-2.0

//! Abuse patterns for security testing.

use std::time::Duration;

/// What each simulated request carries as its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Valid,
    InvalidAddresses,
    Malformed,
}

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Requests per second rate
    pub requests_per_second: f64,
    /// Number of unique clients to simulate
    pub unique_clients: usize,
    /// Whether to use valid Content-Type
    pub valid_content_type: bool,
    /// Whether requests carry a valid session
    pub authenticated: bool,
    /// Request body kind
    pub payload: PayloadKind,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            requests_per_second: 10.0,
            unique_clients: 1,
            valid_content_type: true,
            authenticated: true,
            payload: PayloadKind::Valid,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Single client flood - basic DoS from one address.
    pub fn single_client_flood() -> Self {
        Self {
            total_requests: 200,
            requests_per_second: 100.0,
            unique_clients: 1,
            ..Default::default()
        }
    }

    /// Distributed spray - many clients, few requests each.
    pub fn distributed_spray() -> Self {
        Self {
            total_requests: 500,
            requests_per_second: 50.0,
            unique_clients: 100,
            ..Default::default()
        }
    }

    /// Content-Type bypass attempts.
    pub fn content_type_bypass() -> Self {
        Self {
            total_requests: 50,
            unique_clients: 5,
            valid_content_type: false,
            ..Default::default()
        }
    }

    /// Submissions without a session.
    pub fn unauthenticated_flood() -> Self {
        Self {
            total_requests: 50,
            unique_clients: 5,
            authenticated: false,
            ..Default::default()
        }
    }

    /// Garbage bodies.
    pub fn malformed_spray() -> Self {
        Self {
            total_requests: 40,
            unique_clients: 4,
            payload: PayloadKind::Malformed,
            ..Default::default()
        }
    }

    /// Spoofed senders and broken recipient lists.
    pub fn invalid_address_spray() -> Self {
        Self {
            total_requests: 40,
            unique_clients: 4,
            payload: PayloadKind::InvalidAddresses,
            ..Default::default()
        }
    }

    /// Slow drip - one request every 8 seconds stays under 10 per minute.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 30,
            requests_per_second: 0.125,
            unique_clients: 1,
            ..Default::default()
        }
    }

    /// Delay between consecutive requests.
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.requests_per_second)
    }

    /// Calculate expected duration for the attack.
    pub fn expected_duration(&self) -> Duration {
        Duration::from_secs_f64(self.total_requests as f64 / self.requests_per_second)
    }
}
