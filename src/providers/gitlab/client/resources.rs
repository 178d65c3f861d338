use super::core::GitLabClient;
use crate::error::Result;
use crate::providers::gitlab::types::{
    Branch, Group, Issue, Member, MergeRequest, Pipeline, PipelineSummary, Project,
    ProtectedBranch,
};

impl GitLabClient {
    /// All groups visible to the token.
    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        self.get_all(self.endpoint(&["groups"]), &[]).await
    }

    /// Projects the token's user is a member of.
    pub async fn list_member_projects(&self) -> Result<Vec<Project>> {
        self.get_all(self.endpoint(&["projects"]), &[("membership", "true")])
            .await
    }

    pub async fn list_pipelines(&self, project_id: u64) -> Result<Vec<PipelineSummary>> {
        let id = project_id.to_string();
        self.get_all(self.endpoint(&["projects", id.as_str(), "pipelines"]), &[])
            .await
    }

    pub async fn get_pipeline(&self, project_id: u64, pipeline_id: u64) -> Result<Pipeline> {
        let id = project_id.to_string();
        let pipeline = pipeline_id.to_string();
        self.get(self.endpoint(&["projects", id.as_str(), "pipelines", pipeline.as_str()]))
            .await
    }

    pub async fn list_issues(&self, project_id: u64) -> Result<Vec<Issue>> {
        let id = project_id.to_string();
        self.get_all(self.endpoint(&["projects", id.as_str(), "issues"]), &[])
            .await
    }

    pub async fn list_merge_requests(&self, project_id: u64) -> Result<Vec<MergeRequest>> {
        let id = project_id.to_string();
        self.get_all(self.endpoint(&["projects", id.as_str(), "merge_requests"]), &[])
            .await
    }

    pub async fn list_group_members(&self, group_id: u64) -> Result<Vec<Member>> {
        let id = group_id.to_string();
        self.get_all(self.endpoint(&["groups", id.as_str(), "members"]), &[])
            .await
    }

    pub async fn list_project_members(&self, project_id: u64) -> Result<Vec<Member>> {
        let id = project_id.to_string();
        self.get_all(self.endpoint(&["projects", id.as_str(), "members"]), &[])
            .await
    }

    pub async fn list_branches(&self, project_id: u64) -> Result<Vec<Branch>> {
        let id = project_id.to_string();
        self.get_all(self.endpoint(&["projects", id.as_str(), "repository", "branches"]), &[])
            .await
    }

    /// Protection rules of a project, wildcard rules included.
    pub async fn list_protected_branches(&self, project_id: u64) -> Result<Vec<ProtectedBranch>> {
        let id = project_id.to_string();
        self.get_all(self.endpoint(&["projects", id.as_str(), "protected_branches"]), &[])
            .await
    }

    pub async fn get_protected_branch(
        &self,
        project_id: u64,
        branch: &str,
    ) -> Result<ProtectedBranch> {
        let id = project_id.to_string();
        self.get(self.endpoint(&["projects", id.as_str(), "protected_branches", branch]))
            .await
    }
}
