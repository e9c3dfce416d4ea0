// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission and record types.
//!
//! [`EmailSubmission`] is the strict wire shape of an incoming payload. Every
//! field is optional at this stage so that missing fields can be reported by
//! the validator instead of failing deserialization. Once validated it is
//! normalized into a [`NewEmail`], which is the only type a store accepts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validator::ValidationError;

/// Candidate email record as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmailSubmission {
    pub subject: Option<String>,
    pub sender: Option<String>,
    pub recipients: Option<Recipients>,
    pub cc: Option<Vec<String>>,
    pub bcc: Option<Vec<String>>,
    pub body: Option<String>,
}

/// Recipient list. A bare string is accepted and treated as a single
/// recipient.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    Many(Vec<String>),
    One(String),
}

impl Recipients {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Recipients::Many(list) => list,
            Recipients::One(single) => std::slice::from_ref(single),
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        match self {
            Recipients::Many(list) => list,
            Recipients::One(single) => vec![single],
        }
    }
}

impl From<Vec<String>> for Recipients {
    fn from(list: Vec<String>) -> Self {
        Recipients::Many(list)
    }
}

/// A validated, normalized submission ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmail {
    pub subject: String,
    pub sender: String,
    pub recipients: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub body: String,
}

/// A stored email as returned by the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub email: NewEmail,
}

impl EmailRecord {
    /// Wrap a new email with a fresh identifier and the current time.
    pub fn assign(email: NewEmail) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            email,
        }
    }
}

impl EmailSubmission {
    /// Convert into the stored shape: recipients become a list and absent
    /// CC/BCC lists become empty. Fails only if a required field is absent,
    /// which the validator reports first.
    pub fn normalize(self) -> Result<NewEmail, ValidationError> {
        let subject = self.subject.ok_or(ValidationError::MissingField("subject"))?;
        let sender = self.sender.ok_or(ValidationError::MissingField("sender"))?;
        let recipients = self
            .recipients
            .map(Recipients::into_vec)
            .filter(|list| !list.is_empty())
            .ok_or(ValidationError::MissingField("recipients"))?;
        let body = self.body.ok_or(ValidationError::MissingField("body"))?;

        Ok(NewEmail {
            subject,
            sender,
            recipients,
            cc: self.cc.unwrap_or_default(),
            bcc: self.bcc.unwrap_or_default(),
            body,
        })
    }
}
