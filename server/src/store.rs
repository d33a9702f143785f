//! Persistence for job applications.
//!
//! Contact messages leave the system over SMTP; applications are rows the
//! recruiting team queries later, so they land in SurrealDB behind the
//! [`ApplicationStore`] trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use surrealdb::engine::any::{connect, Any};
use surrealdb::opt::auth::Root;
use surrealdb::types as surrealdb_types;
use surrealdb_types::SurrealValue;
use surrealdb::Surreal;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::retry::{with_backoff, Backoff};

const APPLICATION_TABLE: &str = "job_application";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] surrealdb::Error),
    #[error("database accepted the write but returned no record")]
    NotPersisted,
}

/// A sanitized application as persisted. Field names are stored camelCase
/// to match the shape the careers dashboard already reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, SurrealValue)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    #[surreal(rename = "positionId")]
    pub position_id: String,
    #[surreal(rename = "positionTitle")]
    pub position_title: String,
    pub department: String,
    #[surreal(rename = "firstName")]
    pub first_name: String,
    #[surreal(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[surreal(rename = "coverLetter")]
    pub cover_letter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[surreal(rename = "resumeUrl")]
    pub resume_url: Option<String>,
    /// RFC 3339 submission timestamp, assigned by the gateway.
    #[surreal(rename = "appliedAt")]
    pub applied_at: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert(&self, record: ApplicationRecord) -> Result<(), StoreError>;
}

/// SurrealDB-backed [`ApplicationStore`].
#[derive(Clone)]
pub struct SurrealStore {
    db: Surreal<Any>,
}

impl SurrealStore {
    /// Connects, authenticates, and selects the configured namespace and
    /// database, retrying while the engine comes up.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let db = with_backoff("surreal_connect", Backoff::startup(), || async {
            info!(endpoint = %config.endpoint, "Connecting to SurrealDB");
            connect(&config.endpoint).await
        })
        .await?;

        // Embedded engines (mem://) have no authentication layer.
        if !config.username.is_empty() {
            db.signin(Root {
                username: config.username.clone(),
                password: config.password.clone(),
            })
            .await?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        Ok(Self { db })
    }

    #[cfg(test)]
    async fn count(&self) -> Result<usize, StoreError> {
        let records: Vec<ApplicationRecord> = self.db.select(APPLICATION_TABLE).await?;
        Ok(records.len())
    }
}

#[async_trait]
impl ApplicationStore for SurrealStore {
    async fn insert(&self, record: ApplicationRecord) -> Result<(), StoreError> {
        let created: Option<ApplicationRecord> =
            with_backoff("application_insert", Backoff::delivery(), || {
                let record = record.clone();
                async move { self.db.create(APPLICATION_TABLE).content(record).await }
            })
            .await?;

        match created {
            Some(stored) => {
                info!(
                    position = %stored.position_title,
                    "Job application stored"
                );
                Ok(())
            }
            None => Err(StoreError::NotPersisted),
        }
    }
}
