//! Records returned by the GitLab list endpoints.
//!
//! Every record tolerates missing fields and `null` scalars: anything the
//! server leaves out decodes to its default value, and unknown fields are
//! ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Decode `null` as the type's default instead of failing.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeRequestState {
    Opened,
    Closed,
    Merged,
    /// States this client does not know about, e.g. `locked`.
    #[default]
    #[serde(other)]
    Other,
}

impl MergeRequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeRequestState::Opened => "opened",
            MergeRequestState::Closed => "closed",
            MergeRequestState::Merged => "merged",
            MergeRequestState::Other => "other",
        }
    }
}

impl fmt::Display for MergeRequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub username: String,
    #[serde(deserialize_with = "nullable")]
    pub id: u64,
    #[serde(deserialize_with = "nullable")]
    pub state: String,
    pub avatar_url: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub web_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeRequest {
    #[serde(deserialize_with = "nullable")]
    pub id: u64,
    #[serde(deserialize_with = "nullable")]
    pub iid: u64,
    #[serde(deserialize_with = "nullable")]
    pub project_id: u64,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub state: MergeRequestState,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "nullable")]
    pub target_branch: String,
    #[serde(deserialize_with = "nullable")]
    pub source_branch: String,
    #[serde(deserialize_with = "nullable")]
    pub upvotes: u64,
    #[serde(deserialize_with = "nullable")]
    pub downvotes: u64,
    #[serde(deserialize_with = "nullable")]
    pub author: Author,
    // Shapes of the following vary between GitLab versions, so they stay opaque.
    pub assignee: Value,
    pub labels: Value,
    pub milestone: Value,
    pub approvals_before_merge: Value,
    pub should_remove_source_branch: Value,
    #[serde(deserialize_with = "nullable")]
    pub source_project_id: u64,
    #[serde(deserialize_with = "nullable")]
    pub target_project_id: u64,
    #[serde(deserialize_with = "nullable")]
    pub work_in_progress: bool,
    #[serde(deserialize_with = "nullable")]
    pub merge_when_build_succeeds: bool,
    #[serde(deserialize_with = "nullable")]
    pub merge_status: String,
    #[serde(deserialize_with = "nullable")]
    pub sha: String,
    pub merge_commit_sha: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub subscribed: bool,
    #[serde(deserialize_with = "nullable")]
    pub user_notes_count: u64,
    #[serde(deserialize_with = "nullable")]
    pub force_remove_source_branch: bool,
    #[serde(deserialize_with = "nullable")]
    pub web_url: String,
}

/// The head commit embedded in a branch listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitSummary {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub message: String,
    #[serde(deserialize_with = "nullable")]
    pub parent_ids: Vec<String>,
    pub authored_date: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "nullable")]
    pub author_name: String,
    #[serde(deserialize_with = "nullable")]
    pub author_email: String,
    pub committed_date: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "nullable")]
    pub committer_name: String,
    #[serde(deserialize_with = "nullable")]
    pub committer_email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branch {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub commit: CommitSummary,
    #[serde(deserialize_with = "nullable")]
    pub merged: bool,
    #[serde(deserialize_with = "nullable")]
    pub protected: bool,
    #[serde(deserialize_with = "nullable")]
    pub developers_can_push: bool,
    #[serde(deserialize_with = "nullable")]
    pub developers_can_merge: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Commit {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub short_id: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    #[serde(deserialize_with = "nullable")]
    pub message: String,
    #[serde(deserialize_with = "nullable")]
    pub author_name: String,
    #[serde(deserialize_with = "nullable")]
    pub author_email: String,
    pub created_at: Option<DateTime<Utc>>,
}
