//! Storage collaborator traits: the durable slot behind the wizard and the
//! record store behind submission.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::profile::ProfileData;

/// A submitted profile as stored: the full aggregate plus a server-assigned
/// id and creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub profile: ProfileData,
}

impl SubmittedRecord {
    pub fn new(profile: ProfileData) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            profile,
        }
    }

    pub fn email(&self) -> &str {
        &self.profile.email
    }
}

/// Result of an insert under the per-email uniqueness constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created(SubmittedRecord),
    /// A record already exists for that email; nothing was written.
    Conflict,
}

/// A durable key-value slot.
#[async_trait]
pub trait KeyValueSlot: Send + Sync {
    async fn get_slot(&self, key: &str) -> Result<Option<Vec<u8>>, DatabaseError>;

    async fn set_slot(&self, key: &str, value: &[u8]) -> Result<(), DatabaseError>;
}

/// Durable store of submitted profiles, at most one per email.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert `profile` unless a record for its email exists. The check and
    /// the insert are a single atomic operation.
    async fn create_unique(&self, profile: &ProfileData) -> Result<CreateOutcome, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<SubmittedRecord>, DatabaseError>;
}
