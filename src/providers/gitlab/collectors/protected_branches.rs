use log::debug;
use prometheus::proto::MetricFamily;

use super::GitLabCollector;
use crate::error::{ExporterError, Result};
use crate::filter::EntityFilter;
use crate::metrics::{families, GaugeFamily};
use crate::providers::gitlab::entities::Entity;
use crate::providers::gitlab::types::ProtectedBranch;

const PROTECTED_BRANCH_LABELS: [&str; 2] = ["project", "ref"];

/// Lowest access levels allowed to push to and merge into a protected branch.
///
/// A side with no level-based rule (only user or group rules) has no minimum
/// and is not reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedBranchFact {
    pub project: String,
    pub ref_: String,
    pub min_push: Option<u32>,
    pub min_merge: Option<u32>,
}

impl ProtectedBranchFact {
    pub fn from_policy(project: &str, policy: &ProtectedBranch) -> Self {
        Self {
            project: project.to_string(),
            ref_: policy.name.clone(),
            min_push: policy.min_push_access_level(),
            min_merge: policy.min_merge_access_level(),
        }
    }
}

impl GitLabCollector {
    /// Needs one extra request per protected branch on top of the branch list.
    pub async fn collect_protected_branches(&self) -> Result<Vec<MetricFamily>> {
        let ns = &self.namespace;
        let mut push = GaugeFamily::new(
            ns,
            "protected_branch_push",
            "Minimum access level required to push",
            &PROTECTED_BRANCH_LABELS,
        )?;
        let mut merge = GaugeFamily::new(
            ns,
            "protected_branch_merge",
            "Minimum access level required to merge",
            &PROTECTED_BRANCH_LABELS,
        )?;

        for project in &self.entities.projects {
            let branches = self.client.list_branches(project.id).await?;
            let mut rules: Option<Vec<ProtectedBranch>> = None;

            for branch in branches.iter().filter(|branch| branch.protected) {
                debug!("{}: fetching protection of {}", project.path, branch.name);
                let policy = self.policy_for(project, &branch.name, &mut rules).await?;
                let Some(policy) = policy else {
                    debug!("{}: no rule covers {}, skipping", project.path, branch.name);
                    continue;
                };

                let mut fact = ProtectedBranchFact::from_policy(&project.path, &policy);
                // Wildcard policies report the pattern; label with the branch itself.
                fact.ref_.clone_from(&branch.name);
                let labels = [fact.project.as_str(), fact.ref_.as_str()];

                if let Some(level) = fact.min_push {
                    push.add(&labels, f64::from(level))?;
                }
                if let Some(level) = fact.min_merge {
                    merge.add(&labels, f64::from(level))?;
                }
            }
        }

        Ok(families([push, merge]))
    }

    /// Looks up the rule protecting `branch`.
    ///
    /// The per-branch endpoint only knows rules named exactly like the branch.
    /// On a 404 the project's rule list, fetched at most once per project, is
    /// searched for a wildcard rule matching the branch.
    async fn policy_for(
        &self,
        project: &Entity,
        branch: &str,
        rules: &mut Option<Vec<ProtectedBranch>>,
    ) -> Result<Option<ProtectedBranch>> {
        match self.client.get_protected_branch(project.id, branch).await {
            Ok(policy) => return Ok(Some(policy)),
            Err(ExporterError::Api { status: 404, .. }) => {}
            Err(e) => return Err(e),
        }

        if rules.is_none() {
            *rules = Some(self.client.list_protected_branches(project.id).await?);
        }

        Ok(rules.iter().flatten().find(|rule| rule_covers(rule, branch)).cloned())
    }
}

fn rule_covers(rule: &ProtectedBranch, branch: &str) -> bool {
    rule.name == branch || EntityFilter::new(std::slice::from_ref(&rule.name)).matches(branch)
}
