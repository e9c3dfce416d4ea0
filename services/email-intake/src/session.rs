// SPDX-License-Identifier: PMPL-1.0-or-later
// Session checks for the email intake service
//
// Session validity is owned by an external auth service. The intake
// service forwards the caller's credentials and only looks at the status.

use crate::config::AuthConfig;
use axum::http::{header, HeaderMap};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Errors building a session client.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid session service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to build session client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Predicate deciding whether a request carries a valid session.
pub trait SessionValidator: Send + Sync + 'static {
    fn has_valid_session(&self, headers: &HeaderMap) -> impl Future<Output = bool> + Send;
}

/// Session client for the external auth service
pub struct SessionService {
    endpoint: Option<Url>,
    client: reqwest::Client,
}

impl SessionService {
    /// Create a session client whose lookups give up after `timeout`.
    /// Without an endpoint every session is considered invalid.
    pub fn new(endpoint: Option<Url>, timeout: Duration) -> Result<Self, SessionError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self { endpoint, client })
    }

    /// Parse the configured endpoint, if any.
    pub fn from_url(url: Option<&str>, timeout: Duration) -> Result<Self, SessionError> {
        let endpoint = url.map(Url::parse).transpose()?;
        Self::new(endpoint, timeout)
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, SessionError> {
        Self::from_url(config.session_service_url.as_deref(), config.session_timeout())
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }
}

impl SessionValidator for SessionService {
    async fn has_valid_session(&self, headers: &HeaderMap) -> bool {
        let Some(endpoint) = &self.endpoint else {
            warn!("No session service configured, rejecting session");
            return false;
        };

        let cookie = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        if cookie.is_none() && authorization.is_none() {
            debug!("Request carries no credentials");
            return false;
        }

        let mut request = self.client.get(endpoint.clone());
        if let Some(cookie) = cookie {
            request = request.header("cookie", cookie);
        }
        if let Some(authorization) = authorization {
            request = request.header("authorization", authorization);
        }

        match request.send().await {
            Ok(response) => {
                let valid = response.status().is_success();
                debug!(status = %response.status(), valid, "Session service answered");
                valid
            }
            Err(e) if e.is_timeout() => {
                warn!(error = %e, "Session service timed out, rejecting session");
                false
            }
            Err(e) => {
                warn!(error = %e, "Session service unreachable, rejecting session");
                false
            }
        }
    }
}
