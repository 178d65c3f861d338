//! Per-facet metric collectors.
//!
//! Each collector re-walks the upstream API for every in-scope entity and
//! returns freshly built metric families. Nothing is cached between calls.

mod issues;
mod membership;
mod merge_requests;
mod paths;
mod pipelines;
mod protected_branches;

use std::sync::Arc;

use super::client::GitLabClient;
use super::entities::EntitySet;

/// Label value used when an issue or merge request has no assignee.
pub(crate) const UNASSIGNED: &str = "None";

/// Collects metrics for one immutable snapshot of in-scope entities.
pub struct GitLabCollector {
    client: Arc<GitLabClient>,
    entities: Arc<EntitySet>,
    namespace: String,
}

impl GitLabCollector {
    pub fn new(client: Arc<GitLabClient>, entities: Arc<EntitySet>, namespace: String) -> Self {
        Self {
            client,
            entities,
            namespace,
        }
    }
}
