use log::{debug, info};

use super::client::GitLabClient;
use super::types::{Group, Project};
use crate::error::Result;
use crate::filter::EntityFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Group,
    Project,
}

/// A group or project that metrics are exported for.
///
/// Identified by its full path, which is what ends up in metric labels. The
/// numeric id only addresses sub-resources in the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub id: u64,
    pub path: String,
    pub name: String,
    pub kind: EntityKind,
}

impl From<Group> for Entity {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            path: group.full_path,
            name: group.name,
            kind: EntityKind::Group,
        }
    }
}

impl From<Project> for Entity {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            path: project.path_with_namespace,
            name: project.name,
            kind: EntityKind::Project,
        }
    }
}

/// In-scope groups and projects, loaded once at startup and never refreshed.
#[derive(Debug, Clone, Default)]
pub struct EntitySet {
    pub groups: Vec<Entity>,
    pub projects: Vec<Entity>,
}

impl EntitySet {
    /// Groups first, then projects.
    pub fn all(&self) -> impl Iterator<Item = &Entity> {
        self.groups.iter().chain(self.projects.iter())
    }
}

pub struct EntityLoader<'a> {
    client: &'a GitLabClient,
    filter: &'a EntityFilter,
}

impl<'a> EntityLoader<'a> {
    pub fn new(client: &'a GitLabClient, filter: &'a EntityFilter) -> Self {
        Self { client, filter }
    }

    pub async fn load_groups(&self) -> Result<Vec<Entity>> {
        let groups = self.client.list_groups().await?;
        let total = groups.len();

        let accepted: Vec<Entity> = groups
            .into_iter()
            .map(Entity::from)
            .filter(|group| self.accept(group))
            .collect();

        info!("Loaded {} of {total} visible groups", accepted.len());
        Ok(accepted)
    }

    pub async fn load_projects(&self) -> Result<Vec<Entity>> {
        let projects = self.client.list_member_projects().await?;
        let total = projects.len();

        let accepted: Vec<Entity> = projects
            .into_iter()
            .map(Entity::from)
            .filter(|project| self.accept(project))
            .collect();

        info!("Loaded {} of {total} member projects", accepted.len());
        Ok(accepted)
    }

    pub async fn load(&self) -> Result<EntitySet> {
        Ok(EntitySet {
            groups: self.load_groups().await?,
            projects: self.load_projects().await?,
        })
    }

    fn accept(&self, entity: &Entity) -> bool {
        let accepted = self.filter.matches(&entity.path);
        if !accepted {
            debug!("Skipping {:?} {} (filtered out)", entity.kind, entity.path);
        }
        accepted
    }
}
