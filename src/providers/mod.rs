pub mod gitlab;

pub use gitlab::{EntityLoader, EntitySet, GitLabClient, GitLabCollector};
