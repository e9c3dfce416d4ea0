// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the intake pipeline.
//!
//! Each [`IntakeMetrics`] owns its own registry so independent application
//! states (tests in particular) never share counters.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

pub struct IntakeMetrics {
    registry: Registry,
    submissions: IntCounterVec,
    tracked_clients: IntGauge,
}

impl IntakeMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new(
                "email_intake_submissions_total",
                "Email submissions by pipeline outcome",
            ),
            &["outcome"],
        )?;
        let tracked_clients = IntGauge::new(
            "email_intake_rate_limit_clients",
            "Clients currently tracked by the rate limiter",
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(tracked_clients.clone()))?;

        Ok(Self {
            registry,
            submissions,
            tracked_clients,
        })
    }

    /// Count one submission with the given outcome label.
    pub fn record(&self, outcome: &str) {
        self.submissions.with_label_values(&[outcome]).inc();
    }

    pub fn submissions(&self, outcome: &str) -> u64 {
        self.submissions.with_label_values(&[outcome]).get()
    }

    pub fn set_tracked_clients(&self, count: usize) {
        self.tracked_clients.set(count as i64);
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_render() {
        let metrics = IntakeMetrics::new().unwrap();
        metrics.record("accepted");
        metrics.record("accepted");
        metrics.record("rate_limited");
        metrics.set_tracked_clients(3);

        assert_eq!(metrics.submissions("accepted"), 2);
        assert_eq!(metrics.submissions("invalid"), 0);

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"email_intake_submissions_total{outcome="accepted"} 2"#));
        assert!(text.contains("email_intake_rate_limit_clients 3"));
    }

    #[test]
    fn test_registries_are_independent() {
        let a = IntakeMetrics::new().unwrap();
        let b = IntakeMetrics::new().unwrap();
        a.record("accepted");
        assert_eq!(b.submissions("accepted"), 0);
    }
}
