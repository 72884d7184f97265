//! Defines the repository event envelope delivered by CodeCommit
//! triggers, and the normalization of such an envelope into a single
//! commit reference.

use crate::error::HookError;
use serde::Deserialize;
use tracing::debug;

/// The inbound trigger payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<RepositoryRecord>,
}

/// A single record of a repository event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRecord {
    #[serde(default)]
    pub event_trigger_name: Option<String>,

    #[serde(rename = "eventSourceARN", default)]
    pub event_source_arn: Option<String>,

    pub codecommit: CodeCommitDetail,
}

/// The CodeCommit-specific portion of a record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodeCommitDetail {
    #[serde(default)]
    pub references: Vec<CommitReference>,
}

/// One ref update.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct CommitReference {
    /// The full reference, e.g. `refs/heads/feature/x`.
    #[serde(rename = "ref")]
    pub reference: String,

    /// The commit the reference points to after the update.
    pub commit: String,

    #[serde(default)]
    pub created: bool,

    #[serde(default)]
    pub deleted: bool,
}

/// What happened to a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefChange {
    Created,
    Deleted,
    Updated,
}

impl RepositoryEvent {
    /// Returns the only record in the event.
    pub fn single_record(&self) -> Result<&RepositoryRecord, HookError> {
        match self.records.as_slice() {
            [record] => Ok(record),
            records => Err(HookError::MalformedEvent(format!(
                "expected exactly one record, got {}",
                records.len()
            ))),
        }
    }
}

impl RepositoryRecord {
    /// Returns the only commit reference in the record.
    pub fn single_reference(&self) -> Result<&CommitReference, HookError> {
        let references = &self.codecommit.references;
        debug!("Obtained codecommit references: {:?}", references);
        match references.as_slice() {
            [reference] => Ok(reference),
            _ => Err(HookError::MalformedEvent(format!(
                "expected exactly one commit reference in record {} triggered by {}, got {:?}",
                self.event_trigger_name.as_deref().unwrap_or("<unnamed>"),
                self.event_source_arn.as_deref().unwrap_or("<unknown source>"),
                references
            ))),
        }
    }
}

impl CommitReference {
    /// Classifies the update. `branch` is only used to describe a
    /// conflicting update.
    pub fn change(&self, branch: &str) -> Result<RefChange, HookError> {
        match (self.created, self.deleted) {
            (true, true) => Err(HookError::ConflictingChange {
                branch: branch.to_string(),
            }),
            (true, false) => Ok(RefChange::Created),
            (false, true) => Ok(RefChange::Deleted),
            (false, false) => Ok(RefChange::Updated),
        }
    }
}
