// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the email intake service.
//!
//! A submission passes through an ordered series of gates, each of which
//! can end the request:
//!
//! 1. rate limit per client (429)
//! 2. Content-Type (415)
//! 3. session, unless auth enforcement is off (401)
//! 4. body size (413)
//! 5. payload shape (400)
//! 6. field validation (400)
//! 7. store insert (500 on failure, 200 on success)
//!
//! The body is only buffered once the first three gates pass, so every
//! request is counted by the limiter whatever its size.

use crate::config::Config;
use crate::error::IntakeError;
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::metrics::IntakeMetrics;
use crate::models::{EmailRecord, EmailSubmission};
use crate::session::SessionValidator;
use crate::store::{EmailStore, StoreError};
use crate::validator::EmailValidator;
use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, FromRequest, Request, State},
    http::{header, HeaderMap, Response as HttpResponse, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Client identifier used when no forwarded address is present.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Shared application state.
pub struct AppState<S, A> {
    pub config: Config,
    pub limiter: RateLimiter,
    pub validator: EmailValidator,
    pub store: S,
    pub sessions: A,
    pub metrics: IntakeMetrics,
}

impl<S: EmailStore, A: SessionValidator> AppState<S, A> {
    /// Build state with a fresh limiter derived from `config`.
    pub fn new(config: Config, store: S, sessions: A) -> Result<Self, prometheus::Error> {
        let limiter = RateLimiter::new(config.rate_limit.clone());
        Self::with_limiter(config, limiter, store, sessions)
    }

    /// Build state around an existing limiter, e.g. one shared between
    /// several routers.
    pub fn with_limiter(
        config: Config,
        limiter: RateLimiter,
        store: S,
        sessions: A,
    ) -> Result<Self, prometheus::Error> {
        Ok(Self {
            validator: EmailValidator::new(config.validation.clone()),
            metrics: IntakeMetrics::new()?,
            config,
            limiter,
            store,
            sessions,
        })
    }
}

/// Successful submission response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub message: &'static str,
    pub email_id: Uuid,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build the router for the service.
pub fn router<S, A>(state: Arc<AppState<S, A>>) -> Router
where
    S: EmailStore,
    A: SessionValidator,
{
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/api/emails", post(submit_email::<S, A>));

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics::<S, A>));
    }

    app.layer(DefaultBodyLimit::max(state.config.validation.max_payload_bytes))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "email-intake",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics<S, A>(State(state): State<Arc<AppState<S, A>>>) -> Response
where
    S: EmailStore,
    A: SessionValidator,
{
    state
        .metrics
        .set_tracked_clients(state.limiter.tracked_clients().await);

    match state.metrics.render() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Accept an email submission.
pub async fn submit_email<S, A>(
    State(state): State<Arc<AppState<S, A>>>,
    request: Request,
) -> Response
where
    S: EmailStore,
    A: SessionValidator,
{
    let client_id = client_identifier(request.headers());

    match admit(&state, &client_id, request).await {
        Ok(record) => {
            state.metrics.record("accepted");
            info!(client = %client_id, email_id = %record.id, "Email stored");
            (
                StatusCode::OK,
                Json(SubmitResponse {
                    success: true,
                    message: "Email saved successfully",
                    email_id: record.id,
                }),
            )
                .into_response()
        }
        Err(err) => {
            state.metrics.record(err.outcome());
            match &err {
                IntakeError::StoreFailure(detail) => {
                    error!(client = %client_id, detail = %detail, "Store rejected submission")
                }
                other => info!(client = %client_id, outcome = other.outcome(), "Submission rejected"),
            }
            err.into_response()
        }
    }
}

/// Run the gates in order and store the submission if all of them pass.
async fn admit<S, A>(
    state: &AppState<S, A>,
    client_id: &str,
    request: Request,
) -> Result<EmailRecord, IntakeError>
where
    S: EmailStore,
    A: SessionValidator,
{
    if let RateLimitResult::Limited {
        message,
        retry_after,
    } = state.limiter.check(client_id).await
    {
        return Err(IntakeError::RateLimited {
            message,
            retry_after,
        });
    }

    let headers = request.headers();
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    if !state.validator.accepts_content_type(content_type) {
        return Err(IntakeError::UnsupportedMediaType);
    }

    if state.config.auth.enforce_auth && !state.sessions.has_valid_session(headers).await {
        debug!(client = %client_id, "No valid session");
        return Err(IntakeError::Unauthenticated);
    }

    let body = read_body(request, state.config.validation.max_payload_bytes).await?;
    let submission: EmailSubmission = serde_json::from_slice(&body)
        .map_err(|e| IntakeError::MalformedPayload(e.to_string()))?;

    let validation = state.validator.validate(&submission);
    if !validation.is_valid() {
        return Err(IntakeError::Validation(validation.messages()));
    }

    let email = submission
        .normalize()
        .map_err(|e| IntakeError::Validation(vec![e.to_string()]))?;

    let timeout = state.config.store.timeout();
    match tokio::time::timeout(timeout, state.store.insert(email)).await {
        Ok(Ok(record)) => Ok(record),
        Ok(Err(e)) => Err(IntakeError::StoreFailure(e.to_string())),
        Err(_) => Err(IntakeError::StoreFailure(
            StoreError::Timeout(state.config.store.timeout_ms).to_string(),
        )),
    }
}

/// Buffer the request body, honouring the router's `DefaultBodyLimit`.
async fn read_body(request: Request, limit: usize) -> Result<Bytes, IntakeError> {
    Bytes::from_request(request, &()).await.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            IntakeError::PayloadTooLarge { limit }
        } else {
            IntakeError::MalformedPayload(rejection.body_text())
        }
    })
}

/// Resolve the client identifier from the first `X-Forwarded-For` hop.
pub fn client_identifier(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> HttpResponse<Body> {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    warn!(detail = %detail, "Handler panicked");

    IntakeError::UnexpectedFailure.into_response()
}
