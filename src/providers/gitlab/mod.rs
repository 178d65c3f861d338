mod client;
pub(crate) mod collectors;
pub(crate) mod entities;
mod types;

pub use client::GitLabClient;
pub use collectors::GitLabCollector;
pub use entities::{EntityLoader, EntitySet};
