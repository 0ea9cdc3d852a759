//! Commit envelopes attached to versioned-entity mutations.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::response::ApiResult;
use crate::services::versioning::{GetCurrentActiveReq, VersionInfo, VersioningService};

/// Class of a commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitType {
    #[default]
    Field,
    Scenario,
}

impl CommitType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Field => "FIELD",
            Self::Scenario => "SCENARIO",
        }
    }
}

/// Mutation a commit describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOp {
    Create,
    Update,
    Delete,
    Revert,
    SelectVersions,
}

impl CommitOp {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Revert => "Revert",
            Self::SelectVersions => "Select Versions",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitInfo {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub commit_type: CommitType,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub version_id: String,
    #[serde(default)]
    pub version_ids: Vec<String>,
    #[serde(default)]
    pub version_infos: HashMap<String, VersionInfo>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl CommitInfo {
    pub fn with_version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = version_id.into();
        self
    }
}

/// Build the envelope for one mutation.
///
/// The name reads `Auto Created Commit <Op> <entity> - <RFC 1123 time>`.
/// `guid` stays empty; the backend assigns it.
pub fn build_commit(
    op: CommitOp,
    entity: &str,
    commit_type: CommitType,
    author_id: &str,
    project_id: &str,
    now: DateTime<Utc>,
) -> CommitInfo {
    let stamp = now.to_rfc3339();
    CommitInfo {
        guid: String::new(),
        commit_type,
        name: format!(
            "Auto Created Commit {} {entity} - {}",
            op.label(),
            now.format("%a, %d %b %Y %H:%M:%S UTC")
        ),
        author_id: author_id.to_string(),
        project_id: project_id.to_string(),
        version_id: String::new(),
        version_ids: Vec::new(),
        version_infos: HashMap::new(),
        created_at: stamp.clone(),
        updated_at: stamp,
    }
}

/// A version id for a revert, which always opens a new version.
pub fn fresh_version_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Id of the environment's active release, or a fresh one if none is active.
pub async fn active_version_id(
    versioning: &dyn VersioningService,
    project_id: &str,
    environment_id: &str,
) -> ApiResult<String> {
    let release = versioning
        .get_current_active(GetCurrentActiveReq {
            project_id: project_id.to_string(),
            environment_id: environment_id.to_string(),
        })
        .await?;

    if release.id.is_empty() {
        Ok(fresh_version_id())
    } else {
        Ok(release.id)
    }
}
