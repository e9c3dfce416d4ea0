// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Email Intake Service
//!
//! Accepts email records over HTTP, runs them through rate limiting,
//! session, shape and field checks, and hands valid ones to the record
//! store.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (and an optional
//! `.env` file):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT_MAX_REQUESTS`: Requests per client per window (default: 10)
//! - `RATE_LIMIT_WINDOW_MS`: Window length (default: 60000)
//! - `ENFORCE_AUTH`: Require a valid session (default: true)
//! - `SESSION_SERVICE_URL`: Auth service endpoint checked for sessions
//! - `SESSION_TIMEOUT_MS`: Upper bound on one session lookup (default: 2000)
//! - `DATABASE_URL`: Postgres connection string (`postgres` feature only)
//!
//! See [`email_intake::config`] for the full list.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use email_intake::{
    config::Config,
    handlers::{router, AppState},
    session::SessionService,
    store::{EmailStore, MemoryStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first so RUST_LOG set there reaches the filter
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        max_requests = config.rate_limit.max_requests,
        window_ms = config.rate_limit.window_ms,
        enforce_auth = config.auth.enforce_auth,
        "Starting email intake service"
    );

    let sessions = SessionService::from_config(&config.auth)?;
    if config.auth.enforce_auth && !sessions.is_configured() {
        anyhow::bail!("ENFORCE_AUTH is on but SESSION_SERVICE_URL is not set");
    }
    if !config.auth.enforce_auth {
        warn!("Session enforcement disabled, accepting unauthenticated submissions");
    }

    #[cfg(feature = "postgres")]
    if let Some(database_url) = config.store.database_url.clone() {
        let store = email_intake::store::PostgresStore::connect(&database_url).await?;
        return serve(config, store, sessions).await;
    }

    #[cfg(not(feature = "postgres"))]
    if config.store.database_url.is_some() {
        warn!("DATABASE_URL is set but the postgres feature is disabled, using memory store");
    }
    serve(config, MemoryStore::new(), sessions).await
}

async fn serve<S: EmailStore>(
    config: Config,
    store: S,
    sessions: SessionService,
) -> anyhow::Result<()> {
    let addr: SocketAddr = config.bind_addr.parse()?;
    let cleanup_interval = config.rate_limit.cleanup_interval();
    let state = Arc::new(AppState::new(config, store, sessions)?);

    // Spawn cleanup task
    let limiter = state.limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_interval);
        loop {
            interval.tick().await;
            limiter.cleanup().await;
        }
    });

    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
