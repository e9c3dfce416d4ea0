// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: Apache-2.0

//! Email submission validator.
//!
//! Checks run in a fixed order:
//! - Required fields (subject, sender, recipients, body). If any is absent
//!   only the presence errors are reported.
//! - Sender address shape
//! - Recipient, CC and BCC address shape, one combined error per list
//! - Subject and body length
//!
//! The validator is pure; it never touches the rate limiter or the store.

use crate::config::ValidationConfig;
use crate::models::EmailSubmission;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid sender email format: {0}")]
    InvalidSender(String),

    #[error("Invalid {field} email address(es): {}", .addresses.join(", "))]
    InvalidAddresses {
        field: AddressList,
        addresses: Vec<String>,
    },

    #[error("{field} must be {max} characters or less")]
    TooLong { field: &'static str, max: usize },
}

/// Address lists checked element by element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressList {
    Recipients,
    Cc,
    Bcc,
}

impl fmt::Display for AddressList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recipients => write!(f, "recipient"),
            Self::Cc => write!(f, "CC"),
            Self::Bcc => write!(f, "BCC"),
        }
    }
}

/// Result of validating a submission. Errors keep the order they were found in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// User-facing messages, one per error.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Email submission validator.
#[derive(Debug, Clone)]
pub struct EmailValidator {
    config: ValidationConfig,
}

impl Default for EmailValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

impl EmailValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Check that the declared Content-Type is one of the accepted media
    /// types. Parameters such as `charset` are ignored.
    pub fn accepts_content_type(&self, content_type: Option<&str>) -> bool {
        let Some(raw) = content_type else {
            debug!("Content-Type missing");
            return false;
        };

        let media_type = raw.split(';').next().unwrap_or(raw).trim();
        let accepted = self
            .config
            .accepted_content_types
            .iter()
            .any(|expected| expected.eq_ignore_ascii_case(media_type));

        if !accepted {
            debug!(content_type = %media_type, expected = ?self.config.accepted_content_types, "Content-Type rejected");
        }
        accepted
    }

    /// Validate a complete submission.
    pub fn validate(&self, submission: &EmailSubmission) -> ValidationResult {
        let mut errors = Vec::new();

        // Presence
        if is_blank(submission.subject.as_deref()) {
            errors.push(ValidationError::MissingField("subject"));
        }
        if is_blank(submission.sender.as_deref()) {
            errors.push(ValidationError::MissingField("sender"));
        }
        let recipients = submission
            .recipients
            .as_ref()
            .map(|r| r.as_slice())
            .unwrap_or_default();
        if recipients.is_empty() {
            errors.push(ValidationError::MissingField("recipients"));
        }
        if is_blank(submission.body.as_deref()) {
            errors.push(ValidationError::MissingField("body"));
        }
        if !errors.is_empty() {
            debug!(missing = errors.len(), "Required fields absent");
            return ValidationResult { errors };
        }

        // Address shape
        let sender = submission.sender.as_deref().unwrap_or_default();
        if !is_valid_email(sender) {
            errors.push(ValidationError::InvalidSender(sender.to_string()));
        }
        check_list(&mut errors, AddressList::Recipients, recipients);
        if let Some(cc) = submission.cc.as_deref() {
            check_list(&mut errors, AddressList::Cc, cc);
        }
        if let Some(bcc) = submission.bcc.as_deref() {
            check_list(&mut errors, AddressList::Bcc, bcc);
        }

        // Length
        let subject = submission.subject.as_deref().unwrap_or_default();
        if subject.chars().count() > self.config.max_subject_chars {
            errors.push(ValidationError::TooLong {
                field: "Subject",
                max: self.config.max_subject_chars,
            });
        }
        let body = submission.body.as_deref().unwrap_or_default();
        if body.chars().count() > self.config.max_body_chars {
            errors.push(ValidationError::TooLong {
                field: "Body",
                max: self.config.max_body_chars,
            });
        }

        debug!(errors = errors.len(), "Submission validated");
        ValidationResult { errors }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Record one combined error listing every malformed address in `list`.
fn check_list(errors: &mut Vec<ValidationError>, field: AddressList, list: &[String]) {
    let invalid: Vec<String> = list
        .iter()
        .filter(|addr| !is_valid_email(addr))
        .cloned()
        .collect();

    if !invalid.is_empty() {
        errors.push(ValidationError::InvalidAddresses {
            field,
            addresses: invalid,
        });
    }
}

/// Check the address shape `local@domain.tld`.
///
/// - local: one or more of ASCII letters, digits, `.`, `_`, `%`, `+`, `-`
/// - domain: one or more of ASCII letters, digits, `.`, `-`
/// - tld: two or more ASCII letters following the last dot
pub fn is_valid_email(address: &str) -> bool {
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    // The tld cannot contain a dot, so it starts after the last one.
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };

    !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-'))
        && !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'))
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}
