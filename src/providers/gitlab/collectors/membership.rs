use prometheus::proto::MetricFamily;

use super::GitLabCollector;
use crate::error::Result;
use crate::metrics::{families, GaugeFamily};
use crate::providers::gitlab::entities::{Entity, EntityKind};
use crate::providers::gitlab::types::Member;

const MEMBERSHIP_LABELS: [&str; 3] = ["path", "user", "username"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipFact {
    pub path: String,
    pub user: String,
    pub username: String,
    pub access_level: u32,
}

impl MembershipFact {
    pub fn from_member(path: &str, member: Member) -> Self {
        Self {
            path: path.to_string(),
            user: member.name,
            username: member.username,
            access_level: member.access_level,
        }
    }
}

impl GitLabCollector {
    async fn members_of(&self, entity: &Entity) -> Result<Vec<Member>> {
        match entity.kind {
            EntityKind::Group => self.client.list_group_members(entity.id).await,
            EntityKind::Project => self.client.list_project_members(entity.id).await,
        }
    }

    /// Access level of every direct member of every group and project.
    pub async fn collect_membership(&self) -> Result<Vec<MetricFamily>> {
        let mut membership = GaugeFamily::new(
            &self.namespace,
            "membership",
            "Membership",
            &MEMBERSHIP_LABELS,
        )?;

        for entity in self.entities.all() {
            for member in self.members_of(entity).await? {
                let fact = MembershipFact::from_member(&entity.path, member);
                membership.add(
                    &[fact.path.as_str(), fact.user.as_str(), fact.username.as_str()],
                    f64::from(fact.access_level),
                )?;
            }
        }

        Ok(families([membership]))
    }
}
