use anyhow::{Context, Result};
use clap::Parser;
use futures::future::try_join_all;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::Token;
use crate::config::Config;
use crate::filter::EntityFilter;
use crate::output;
use crate::providers::{EntityLoader, GitLabClient, GitLabCollector};
use crate::router::{CollectionRouter, CollectionSet};
use crate::server::ScrapeServer;

#[derive(Parser)]
#[command(name = "gitlab-exporter")]
#[command(author, version, about = "Prometheus exporter for GitLab", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Access token, overrides the configured one
    #[arg(short, long, env = "GITLAB_TOKEN")]
    token: Option<String>,

    /// GitLab base URL, overrides the configured one
    #[arg(short, long)]
    url: Option<String>,
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(url) = &self.url {
            config.gitlab.url.clone_from(url);
        }
        if let Some(token) = &self.token {
            config.gitlab.private_token = Some(token.clone());
        }

        Ok(config)
    }

    pub async fn execute(&self) -> Result<()> {
        let config = self.load_config()?;
        info!("Exporting metrics for GitLab instance: {}", config.gitlab.url);

        let token = config.gitlab.private_token.as_deref().map(Token::from);
        if token.is_none() {
            warn!("No access token configured, only public resources will be visible");
        }

        let client = Arc::new(GitLabClient::new(
            &config.gitlab.url,
            token,
            config.gitlab.per_page,
            Duration::from_secs(config.gitlab.timeout_secs),
        )?);

        let patterns = config.filter_patterns()?;
        let filter = EntityFilter::new(patterns.as_slice());
        if filter.is_empty() {
            info!("No entity filter configured, exporting every visible entity");
        }

        let entities = EntityLoader::new(&client, &filter)
            .load()
            .await
            .context("Failed to load groups and projects")?;
        output::print_entities(&entities);
        let entities = Arc::new(entities);

        let endpoints = config.endpoints();
        let mut router = CollectionRouter::new();
        for endpoint in &endpoints {
            let collector = GitLabCollector::new(
                Arc::clone(&client),
                Arc::clone(&entities),
                config.exporter.namespace.clone(),
            );
            router.insert(CollectionSet::new(
                endpoint.name.clone(),
                endpoint.collectors.clone(),
                collector,
            ));
        }
        info!("Built {} collection sets", endpoints.len());
        output::print_endpoints(&config.exporter.bind_address, &endpoints);

        let servers = endpoints
            .iter()
            .map(|endpoint| {
                let set = router
                    .get(&endpoint.name)
                    .with_context(|| format!("No collection set named '{}'", endpoint.name))?;
                Ok(ScrapeServer::new(
                    set,
                    config.exporter.bind_address.clone(),
                    endpoint.port,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        try_join_all(servers.into_iter().map(ScrapeServer::serve)).await?;
        Ok(())
    }
}
