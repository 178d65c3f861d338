use prometheus::proto::MetricFamily;

use super::{GitLabCollector, UNASSIGNED};
use crate::error::Result;
use crate::metrics::{families, GaugeFamily};
use crate::providers::gitlab::types::MergeRequest;
use crate::status::MergeRequestState;
use crate::timestamp::to_epoch_millis;

const MERGE_REQUEST_LABELS: [&str; 6] = [
    "project",
    "id",
    "wip",
    "title",
    "assigned_user",
    "assigned_username",
];

#[derive(Debug, Clone, PartialEq)]
pub struct MergeRequestFact {
    pub project: String,
    pub id: String,
    pub wip: String,
    pub title: String,
    pub assigned_user: String,
    pub assigned_username: String,
    pub state: MergeRequestState,
    pub created_at: f64,
    pub updated_at: f64,
}

impl MergeRequestFact {
    pub fn from_merge_request(project: &str, mr: &MergeRequest) -> Result<Self> {
        let (assigned_user, assigned_username) = mr
            .assignee
            .as_ref()
            .map_or((UNASSIGNED, UNASSIGNED), |u| (u.name.as_str(), u.username.as_str()));

        Ok(Self {
            project: project.to_string(),
            id: mr.id.to_string(),
            wip: mr.is_work_in_progress().to_string(),
            title: mr.title.clone(),
            assigned_user: assigned_user.to_string(),
            assigned_username: assigned_username.to_string(),
            state: mr.state.parse()?,
            created_at: to_epoch_millis(&mr.created_at)?,
            updated_at: to_epoch_millis(&mr.updated_at)?,
        })
    }

    fn labels(&self) -> [&str; 6] {
        [
            self.project.as_str(),
            self.id.as_str(),
            self.wip.as_str(),
            self.title.as_str(),
            self.assigned_user.as_str(),
            self.assigned_username.as_str(),
        ]
    }
}

impl GitLabCollector {
    pub async fn collect_merge_requests(&self) -> Result<Vec<MetricFamily>> {
        let ns = &self.namespace;
        let mut state = GaugeFamily::new(
            ns,
            "merge_request_state",
            "Merge request state",
            &MERGE_REQUEST_LABELS,
        )?;
        let mut created_at = GaugeFamily::new(
            ns,
            "merge_request_created_at",
            "Merge request created_at",
            &MERGE_REQUEST_LABELS,
        )?;
        let mut updated_at = GaugeFamily::new(
            ns,
            "merge_request_updated_at",
            "Merge request updated_at",
            &MERGE_REQUEST_LABELS,
        )?;

        for project in &self.entities.projects {
            for mr in self.client.list_merge_requests(project.id).await? {
                let fact = MergeRequestFact::from_merge_request(&project.path, &mr)?;
                let labels = fact.labels();

                state.add(&labels, fact.state.code())?;
                created_at.add(&labels, fact.created_at)?;
                updated_at.add(&labels, fact.updated_at)?;
            }
        }

        Ok(families([state, created_at, updated_at]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExporterError;
    use crate::metrics::encode_text;
    use crate::providers::gitlab::collectors::test_support::{collector, mock_json, samples};
    use crate::providers::gitlab::entities::tests::project;

    #[test]
    fn test_fact_from_merge_request() {
        let mr: MergeRequest = serde_json::from_str(
            r#"{"id": 300, "title": "Add exporter", "state": "merged",
                "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-02T00:00:00Z",
                "work_in_progress": false, "draft": false,
                "assignee": {"name": "Ada", "username": "ada"}}"#,
        )
        .unwrap();

        let fact = MergeRequestFact::from_merge_request("teamA/svc1", &mr).unwrap();
        assert_eq!(fact.state, MergeRequestState::Merged);
        assert_eq!(fact.wip, "false");
        assert_eq!(fact.assigned_user, "Ada");
        assert_eq!(fact.updated_at - fact.created_at, 86_400_000.0);
    }

    #[test]
    fn test_unassigned_draft() {
        let mr: MergeRequest = serde_json::from_str(
            r#"{"id": 301, "title": "WIP", "state": "opened",
                "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z",
                "draft": true, "assignee": null}"#,
        )
        .unwrap();

        let fact = MergeRequestFact::from_merge_request("teamA/svc1", &mr).unwrap();
        assert_eq!(fact.wip, "true");
        assert_eq!(fact.assigned_user, "None");
        assert_eq!(fact.assigned_username, "None");
    }

    #[test]
    fn test_unmapped_state_fails_fact() {
        let mr: MergeRequest = serde_json::from_str(
            r#"{"id": 302, "title": "t", "state": "reopened",
                "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert!(matches!(
            MergeRequestFact::from_merge_request("teamA/svc1", &mr),
            Err(ExporterError::UnmappedStatus { kind: "merge request", .. })
        ));
    }

    #[tokio::test]
    async fn test_collect_merge_requests() {
        let mut server = mockito::Server::new_async().await;
        let _mrs = mock_json(
            &mut server,
            "/api/v4/projects/1/merge_requests",
            r#"[{"id": 300, "title": "Add exporter", "state": "locked",
                 "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-02T00:00:00Z",
                 "work_in_progress": true, "assignee": null}]"#,
        )
        .await;

        let collector = collector(&server, vec![], vec![project(1, "teamA/svc1")]);
        let text = encode_text(&collector.collect_merge_requests().await.unwrap()).unwrap();

        let states = samples(&text, "gitlab_merge_request_state");
        assert_eq!(states.len(), 1);
        assert!(states[0].contains(r#"wip="true""#));
        assert!(states[0].contains(r#"project="teamA/svc1""#));
        assert!(states[0].ends_with(" 2"));

        let updated = samples(&text, "gitlab_merge_request_updated_at");
        assert!(updated[0].ends_with(" 1704153600000"));
        assert_eq!(samples(&text, "gitlab_merge_request_created_at").len(), 1);
    }
}
