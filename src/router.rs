use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, info};
use prometheus::proto::MetricFamily;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::providers::GitLabCollector;

/// The metric facets a collection set can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Pipelines,
    Issues,
    MergeRequests,
    Membership,
    Paths,
    ProtectedBranches,
}

impl Facet {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pipelines => "pipelines",
            Self::Issues => "issues",
            Self::MergeRequests => "merge_requests",
            Self::Membership => "membership",
            Self::Paths => "paths",
            Self::ProtectedBranches => "protected_branches",
        }
    }

    async fn collect(self, collector: &GitLabCollector) -> Result<Vec<MetricFamily>> {
        match self {
            Self::Pipelines => collector.collect_pipelines().await,
            Self::Issues => collector.collect_issues().await,
            Self::MergeRequests => collector.collect_merge_requests().await,
            Self::Membership => collector.collect_membership().await,
            Self::Paths => collector.collect_paths().await,
            Self::ProtectedBranches => collector.collect_protected_branches().await,
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered list of facets served together on one endpoint.
///
/// Owns its collector; overlapping scrapes of the same set run one at a time.
pub struct CollectionSet {
    name: String,
    facets: Vec<Facet>,
    collector: GitLabCollector,
    in_flight: Mutex<()>,
}

impl CollectionSet {
    pub fn new(name: impl Into<String>, facets: Vec<Facet>, collector: GitLabCollector) -> Self {
        Self {
            name: name.into(),
            facets,
            collector,
            in_flight: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    /// Runs every facet in order and concatenates their families.
    ///
    /// The first failing facet fails the whole pass. Collectors leave out
    /// families without samples.
    pub async fn collect(&self) -> Result<Vec<MetricFamily>> {
        let _guard = self.in_flight.lock().await;
        debug!("Collecting set '{}'", self.name);

        let mut families = Vec::new();
        for facet in &self.facets {
            let collected = facet.collect(&self.collector).await?;
            debug!("Set '{}': {facet} yielded {} families", self.name, collected.len());
            families.extend(collected);
        }

        info!(
            "Collected {} metric families for set '{}'",
            families.len(),
            self.name
        );
        Ok(families)
    }
}

/// Collection sets by name, in configuration order.
#[derive(Default)]
pub struct CollectionRouter {
    sets: IndexMap<String, Arc<CollectionSet>>,
}

impl CollectionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, set: CollectionSet) {
        self.sets.insert(set.name.clone(), Arc::new(set));
    }

    pub fn get(&self, name: &str) -> Option<Arc<CollectionSet>> {
        self.sets.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExporterError;
    use crate::metrics::encode_text;
    use crate::providers::gitlab::collectors::test_support::{collector, mock_json};
    use crate::providers::gitlab::entities::tests::{group, project};

    #[test]
    fn test_facet_names_round_trip_through_serde() {
        let facets: Vec<Facet> =
            serde_json::from_str(r#"["pipelines", "merge_requests", "protected_branches"]"#)
                .unwrap();
        assert_eq!(
            facets,
            vec![Facet::Pipelines, Facet::MergeRequests, Facet::ProtectedBranches]
        );
        assert_eq!(Facet::MergeRequests.to_string(), "merge_requests");
    }

    #[tokio::test]
    async fn test_collect_concatenates_in_order() {
        let mut server = mockito::Server::new_async().await;
        let _members = mock_json(
            &mut server,
            "/api/v4/groups/10/members",
            r#"[{"name": "Ada", "username": "ada", "access_level": 50}]"#,
        )
        .await;

        let set = CollectionSet::new(
            "slow",
            vec![Facet::Paths, Facet::Membership],
            collector(&server, vec![group(10, "teamA")], vec![]),
        );

        let families = set.collect().await.unwrap();
        let names: Vec<&str> = families.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["gitlab_path", "gitlab_membership"]);
    }

    #[tokio::test]
    async fn test_empty_families_are_dropped() {
        let mut server = mockito::Server::new_async().await;
        let _issues = mock_json(&mut server, "/api/v4/projects/1/issues", "[]").await;

        let set = CollectionSet::new(
            "fast",
            vec![Facet::Issues],
            collector(&server, vec![], vec![project(1, "teamA/svc1")]),
        );

        assert!(set.collect().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_failing_facet_fails_the_pass() {
        let mut server = mockito::Server::new_async().await;
        let _issues = mock_json(
            &mut server,
            "/api/v4/projects/1/issues",
            r#"[{"id": 1, "title": "t", "state": "opened", "created_at": "2024-01-01T00:00:00Z"}]"#,
        )
        .await;
        let _mrs = server
            .mock("GET", "/api/v4/projects/1/merge_requests")
            .match_query(mockito::Matcher::Any)
            .with_status(502)
            .create_async()
            .await;

        let set = CollectionSet::new(
            "fast",
            vec![Facet::Issues, Facet::MergeRequests],
            collector(&server, vec![], vec![project(1, "teamA/svc1")]),
        );

        let err = set.collect().await.unwrap_err();
        assert!(matches!(err, ExporterError::Api { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_router_keeps_sets_by_name() {
        let server = mockito::Server::new_async().await;
        let mut router = CollectionRouter::new();
        router.insert(CollectionSet::new(
            "fast",
            vec![Facet::Paths],
            collector(&server, vec![], vec![project(1, "teamA/svc1")]),
        ));
        router.insert(CollectionSet::new(
            "slow",
            vec![Facet::Paths],
            collector(&server, vec![], vec![project(2, "teamA/svc2")]),
        ));

        assert!(router.get("fast").is_some());
        assert!(router.get("missing").is_none());

        let slow = router.get("slow").unwrap();
        assert_eq!(slow.facets(), &[Facet::Paths]);
        let text = encode_text(&slow.collect().await.unwrap()).unwrap();
        assert!(text.contains("teamA/svc2"));
        assert!(!text.contains("teamA/svc1"));
    }
}
