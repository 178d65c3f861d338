use log::debug;
use prometheus::proto::MetricFamily;

use super::{GitLabCollector, UNASSIGNED};
use crate::error::Result;
use crate::metrics::{families, GaugeFamily};
use crate::providers::gitlab::types::Pipeline;
use crate::status::PipelineStatus;
use crate::timestamp::to_epoch_millis;

const PIPELINE_LABELS: [&str; 4] = ["project", "ref", "user", "username"];

/// One pipeline run, shaped for export.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineFact {
    pub project: String,
    pub ref_: String,
    pub user: String,
    pub username: String,
    pub status: PipelineStatus,
    /// Seconds; `None` while the pipeline has not finished.
    pub duration: Option<f64>,
    pub created_at: f64,
}

impl PipelineFact {
    pub fn from_pipeline(project: &str, pipeline: &Pipeline) -> Result<Self> {
        let (user, username) = pipeline
            .user
            .as_ref()
            .map_or((UNASSIGNED, UNASSIGNED), |u| (u.name.as_str(), u.username.as_str()));

        Ok(Self {
            project: project.to_string(),
            ref_: pipeline.ref_.clone(),
            user: user.to_string(),
            username: username.to_string(),
            status: pipeline.status.parse()?,
            duration: pipeline.duration,
            created_at: to_epoch_millis(&pipeline.created_at)?,
        })
    }

    fn labels(&self) -> [&str; 4] {
        [
            self.project.as_str(),
            self.ref_.as_str(),
            self.user.as_str(),
            self.username.as_str(),
        ]
    }
}

impl GitLabCollector {
    /// Status, duration and creation time of every pipeline of every project.
    ///
    /// The pipeline list does not carry the triggering user or the duration,
    /// so each pipeline is fetched individually.
    pub async fn collect_pipelines(&self) -> Result<Vec<MetricFamily>> {
        let ns = &self.namespace;
        let mut status =
            GaugeFamily::new(ns, "pipeline_status", "Pipeline status", &PIPELINE_LABELS)?;
        let mut duration =
            GaugeFamily::new(ns, "pipeline_duration", "Pipeline duration", &PIPELINE_LABELS)?;
        let mut created_at =
            GaugeFamily::new(ns, "pipeline_created_at", "Pipeline created_at", &PIPELINE_LABELS)?;

        for project in &self.entities.projects {
            let summaries = self.client.list_pipelines(project.id).await?;
            debug!("{}: {} pipelines", project.path, summaries.len());

            for summary in summaries {
                let pipeline = self.client.get_pipeline(project.id, summary.id).await?;
                let fact = PipelineFact::from_pipeline(&project.path, &pipeline)?;
                let labels = fact.labels();

                status.add(&labels, fact.status.code())?;
                if let Some(seconds) = fact.duration {
                    duration.add(&labels, seconds)?;
                }
                created_at.add(&labels, fact.created_at)?;
            }
        }

        Ok(families([status, duration, created_at]))
    }
}
