// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome collection for abuse simulation results.

use axum::http::StatusCode;
use std::collections::HashMap;

/// Collects outcomes during an attack simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    /// Count of requests by outcome
    outcomes: HashMap<Outcome, usize>,
    /// Count of requests by client
    requests_per_client: HashMap<String, usize>,
}

/// Possible outcomes for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Accepted,
    RateLimited,
    InvalidContentType,
    Unauthenticated,
    BadRequest,
    ServerError,
    Other,
}

impl Outcome {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::OK => Outcome::Accepted,
            StatusCode::TOO_MANY_REQUESTS => Outcome::RateLimited,
            StatusCode::UNSUPPORTED_MEDIA_TYPE => Outcome::InvalidContentType,
            StatusCode::UNAUTHORIZED => Outcome::Unauthenticated,
            StatusCode::BAD_REQUEST => Outcome::BadRequest,
            StatusCode::INTERNAL_SERVER_ERROR => Outcome::ServerError,
            _ => Outcome::Other,
        }
    }
}

impl AttackMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request outcome.
    pub fn record(&mut self, outcome: Outcome, client: &str) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self.requests_per_client.entry(client.to_string()).or_insert(0) += 1;
    }

    /// Get total request count.
    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    /// Get count for a specific outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Get block rate (ratio of rejected to total).
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        let accepted = self.count(Outcome::Accepted);
        (total - accepted) as f64 / total as f64
    }

    /// Get number of unique clients that made requests.
    pub fn unique_clients(&self) -> usize {
        self.requests_per_client.len()
    }

    /// Generate a summary report.
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            total_requests: self.total_requests(),
            accepted: self.count(Outcome::Accepted),
            rate_limited: self.count(Outcome::RateLimited),
            rejected_before_validation: self.count(Outcome::InvalidContentType)
                + self.count(Outcome::Unauthenticated),
            bad_request: self.count(Outcome::BadRequest),
            server_error: self.count(Outcome::ServerError) + self.count(Outcome::Other),
            block_rate: self.block_rate(),
            unique_clients: self.unique_clients(),
        }
    }
}

/// Summary report of attack metrics.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub accepted: usize,
    pub rate_limited: usize,
    pub rejected_before_validation: usize,
    pub bad_request: usize,
    pub server_error: usize,
    pub block_rate: f64,
    pub unique_clients: usize,
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Attack Metrics Report ===")?;
        writeln!(f, "Total Requests:    {}", self.total_requests)?;
        writeln!(f)?;
        writeln!(f, "--- Outcomes ---")?;
        writeln!(f, "Accepted:          {}", self.accepted)?;
        writeln!(f, "Rate Limited:      {}", self.rate_limited)?;
        writeln!(f, "Gate Rejected:     {}", self.rejected_before_validation)?;
        writeln!(f, "Bad Request:       {}", self.bad_request)?;
        writeln!(f, "Server Error:      {}", self.server_error)?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate * 100.0)?;
        writeln!(f)?;
        writeln!(f, "--- Distribution ---")?;
        writeln!(f, "Unique Clients:    {}", self.unique_clients)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let mut metrics = AttackMetrics::new();

        metrics.record(Outcome::Accepted, "10.0.0.1");
        metrics.record(Outcome::Accepted, "10.0.0.2");
        metrics.record(Outcome::RateLimited, "10.0.0.1");

        assert_eq!(metrics.total_requests(), 3);
        assert_eq!(metrics.count(Outcome::Accepted), 2);
        assert_eq!(metrics.count(Outcome::RateLimited), 1);
        assert_eq!(metrics.unique_clients(), 2);
    }

    #[test]
    fn test_block_rate() {
        let mut metrics = AttackMetrics::new();
        for _ in 0..3 {
            metrics.record(Outcome::Accepted, "10.0.0.1");
        }
        for _ in 0..7 {
            metrics.record(Outcome::RateLimited, "10.0.0.1");
        }

        assert!((metrics.block_rate() - 0.7).abs() < 0.01);
    }

    #[test]
    fn test_outcome_from_status() {
        assert_eq!(Outcome::from_status(StatusCode::OK), Outcome::Accepted);
        assert_eq!(Outcome::from_status(StatusCode::PAYLOAD_TOO_LARGE), Outcome::Other);
    }
}
