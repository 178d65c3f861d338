use prometheus::proto::MetricFamily;

use super::GitLabCollector;
use crate::error::Result;
use crate::metrics::{families, GaugeFamily};

impl GitLabCollector {
    /// One constant sample per known group and project.
    pub async fn collect_paths(&self) -> Result<Vec<MetricFamily>> {
        let mut paths = GaugeFamily::new(&self.namespace, "path", "Paths", &["path"])?;

        for entity in self.entities.all() {
            paths.add(&[entity.path.as_str()], 1.0)?;
        }

        Ok(families([paths]))
    }
}

#[cfg(test)]
mod tests {
    use crate::metrics::encode_text;
    use crate::providers::gitlab::collectors::test_support::{collector, samples};
    use crate::providers::gitlab::entities::tests::{group, project};

    #[tokio::test]
    async fn test_collect_paths_without_upstream_calls() {
        let server = mockito::Server::new_async().await;
        let collector = collector(
            &server,
            vec![group(10, "teamA")],
            vec![project(1, "teamA/svc1"), project(2, "teamA/svc2")],
        );

        let text = encode_text(&collector.collect_paths().await.unwrap()).unwrap();
        let paths = samples(&text, "gitlab_path");

        assert_eq!(paths.len(), 3);
        assert!(paths.contains(&r#"gitlab_path{path="teamA"} 1"#));
        assert!(paths.contains(&r#"gitlab_path{path="teamA/svc2"} 1"#));
    }
}
