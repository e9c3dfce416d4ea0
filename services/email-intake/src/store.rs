// SPDX-License-Identifier: Apache-2.0
//! Record stores for validated emails
//!
//! The handler only sees the [`EmailStore`] trait. [`MemoryStore`] is the
//! default backend; `PostgresStore` is available with the `postgres` feature.

use crate::models::{EmailRecord, NewEmail};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Store error types. Messages are safe to return to callers: they carry the
/// database's own message or a generic kind, never connection details.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store timed out after {0} ms")]
    Timeout(u64),
}

/// Persistence for validated submissions.
pub trait EmailStore: Send + Sync + 'static {
    /// Insert one email, returning the stored record with its assigned id.
    fn insert(&self, email: NewEmail) -> impl Future<Output = Result<EmailRecord, StoreError>> + Send;
}

/// In-process store. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Vec<EmailRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: Uuid) -> Option<EmailRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl EmailStore for MemoryStore {
    async fn insert(&self, email: NewEmail) -> Result<EmailRecord, StoreError> {
        let record = EmailRecord::assign(email);
        self.records.write().await.push(record.clone());
        Ok(record)
    }
}

#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

#[cfg(feature = "postgres")]
mod postgres {
    use super::{EmailStore, StoreError};
    use crate::models::{EmailRecord, NewEmail};
    use sqlx::postgres::{PgPool, PgPoolOptions};
    use std::time::Duration;
    use tracing::info;

    /// Postgres-backed store.
    #[derive(Clone)]
    pub struct PostgresStore {
        pool: PgPool,
    }

    impl PostgresStore {
        /// Connect and make sure the `emails` table exists.
        pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .acquire_timeout(Duration::from_secs(5))
                .connect(database_url)
                .await
                .map_err(sanitize)?;

            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS emails (
                    id UUID PRIMARY KEY,
                    subject TEXT NOT NULL,
                    sender TEXT NOT NULL,
                    recipients TEXT[] NOT NULL,
                    cc TEXT[] NOT NULL DEFAULT '{}',
                    bcc TEXT[] NOT NULL DEFAULT '{}',
                    body TEXT NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL
                )
                "#,
            )
            .execute(&pool)
            .await
            .map_err(sanitize)?;

            info!("Connected to Postgres record store");
            Ok(Self { pool })
        }
    }

    impl EmailStore for PostgresStore {
        async fn insert(&self, email: NewEmail) -> Result<EmailRecord, StoreError> {
            let record = EmailRecord::assign(email);

            sqlx::query(
                r#"INSERT INTO emails (id, subject, sender, recipients, cc, bcc, body, created_at)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
            )
            .bind(record.id)
            .bind(&record.email.subject)
            .bind(&record.email.sender)
            .bind(&record.email.recipients)
            .bind(&record.email.cc)
            .bind(&record.email.bcc)
            .bind(&record.email.body)
            .bind(record.created_at)
            .execute(&self.pool)
            .await
            .map_err(sanitize)?;

            Ok(record)
        }
    }

    /// Reduce a driver error to something safe to hand back to a client.
    fn sanitize(err: sqlx::Error) -> StoreError {
        match err {
            sqlx::Error::Database(db) => StoreError::Database(db.message().to_string()),
            sqlx::Error::PoolTimedOut => StoreError::Unavailable("connection pool timed out".into()),
            sqlx::Error::PoolClosed => StoreError::Unavailable("connection pool closed".into()),
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                StoreError::Unavailable("connection failed".into())
            }
            _ => StoreError::Database("unexpected database error".into()),
        }
    }
}
