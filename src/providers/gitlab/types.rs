//! Typed GitLab REST v4 payloads.
//!
//! Only the fields the collectors read are modelled; everything else in the
//! responses is ignored.

use serde::Deserialize;

/// A group visible to the configured token.
#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
    pub full_path: String,
}

/// A project the configured token is a member of.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub path_with_namespace: String,
}

/// Minimal user reference embedded in pipelines, issues and merge requests.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRef {
    pub name: String,
    pub username: String,
}

/// Entry of the pipeline list; only the id is needed to fetch the detail.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSummary {
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pipeline {
    pub status: String,
    #[serde(rename = "ref")]
    pub ref_: String,
    /// Seconds; absent until the pipeline has finished running.
    pub duration: Option<f64>,
    pub created_at: String,
    pub user: Option<UserRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub title: String,
    pub state: String,
    pub created_at: String,
    #[serde(default)]
    pub assignees: Vec<UserRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequest {
    pub id: u64,
    pub title: String,
    pub state: String,
    pub created_at: String,
    pub updated_at: String,
    /// Deprecated upstream in favour of `draft`; older instances only send this one.
    pub work_in_progress: Option<bool>,
    pub draft: Option<bool>,
    pub assignee: Option<UserRef>,
}

impl MergeRequest {
    pub fn is_work_in_progress(&self) -> bool {
        self.work_in_progress.or(self.draft).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub name: String,
    pub username: String,
    pub access_level: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Branch {
    pub name: String,
    #[serde(default)]
    pub protected: bool,
}

/// One rule of a protection policy. User- or group-scoped rules carry no level.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessRule {
    pub access_level: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProtectedBranch {
    pub name: String,
    #[serde(default)]
    pub push_access_levels: Vec<AccessRule>,
    #[serde(default)]
    pub merge_access_levels: Vec<AccessRule>,
}

impl ProtectedBranch {
    /// Lowest access level any push rule requires.
    pub fn min_push_access_level(&self) -> Option<u32> {
        min_access_level(&self.push_access_levels)
    }

    /// Lowest access level any merge rule requires.
    pub fn min_merge_access_level(&self) -> Option<u32> {
        min_access_level(&self.merge_access_levels)
    }
}

fn min_access_level(rules: &[AccessRule]) -> Option<u32> {
    rules.iter().filter_map(|rule| rule.access_level).min()
}
