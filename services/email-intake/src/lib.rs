// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Email Intake
//!
//! This crate provides the admission pipeline in front of an email record
//! store:
//!
//! - Per-client fixed-window rate limiting (10 requests per minute default)
//! - Content-Type validation
//! - Session enforcement, switchable with `enforce_auth`
//! - Strict payload parsing
//! - Field presence, address shape and length validation
//! - Time-bounded insert into a pluggable record store

pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod models;
pub mod session;
pub mod store;
pub mod validator;

pub use config::Config;
pub use error::IntakeError;
pub use handlers::{router, AppState};
pub use limiter::{RateLimitResult, RateLimiter};
pub use models::{EmailRecord, EmailSubmission, NewEmail};
pub use session::{SessionService, SessionValidator};
pub use store::{EmailStore, MemoryStore, StoreError};
pub use validator::{EmailValidator, ValidationError, ValidationResult};
