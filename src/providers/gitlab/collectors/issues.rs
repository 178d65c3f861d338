use prometheus::proto::MetricFamily;

use super::{GitLabCollector, UNASSIGNED};
use crate::error::Result;
use crate::metrics::{families, GaugeFamily};
use crate::providers::gitlab::types::Issue;
use crate::status::IssueState;
use crate::timestamp::to_epoch_millis;

const ISSUE_LABELS: [&str; 5] = ["project", "id", "title", "assigned_user", "assigned_username"];

#[derive(Debug, Clone, PartialEq)]
pub struct IssueFact {
    pub project: String,
    pub id: String,
    pub title: String,
    pub assigned_user: String,
    pub assigned_username: String,
    pub state: IssueState,
    pub created_at: f64,
}

impl IssueFact {
    /// Only the first assignee is reported.
    pub fn from_issue(project: &str, issue: &Issue) -> Result<Self> {
        let (assigned_user, assigned_username) = issue
            .assignees
            .first()
            .map_or((UNASSIGNED, UNASSIGNED), |u| (u.name.as_str(), u.username.as_str()));

        Ok(Self {
            project: project.to_string(),
            id: issue.id.to_string(),
            title: issue.title.clone(),
            assigned_user: assigned_user.to_string(),
            assigned_username: assigned_username.to_string(),
            state: issue.state.parse()?,
            created_at: to_epoch_millis(&issue.created_at)?,
        })
    }

    fn labels(&self) -> [&str; 5] {
        [
            self.project.as_str(),
            self.id.as_str(),
            self.title.as_str(),
            self.assigned_user.as_str(),
            self.assigned_username.as_str(),
        ]
    }
}

impl GitLabCollector {
    pub async fn collect_issues(&self) -> Result<Vec<MetricFamily>> {
        let ns = &self.namespace;
        let mut state = GaugeFamily::new(ns, "issue_state", "Issue state", &ISSUE_LABELS)?;
        let mut created_at =
            GaugeFamily::new(ns, "issue_created_at", "Issue created_at", &ISSUE_LABELS)?;

        for project in &self.entities.projects {
            for issue in self.client.list_issues(project.id).await? {
                let fact = IssueFact::from_issue(&project.path, &issue)?;
                let labels = fact.labels();

                state.add(&labels, fact.state.code())?;
                created_at.add(&labels, fact.created_at)?;
            }
        }

        Ok(families([state, created_at]))
    }
}
