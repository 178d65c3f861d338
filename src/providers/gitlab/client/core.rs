use log::debug;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::auth::Token;
use crate::error::{ExporterError, Result};

const USER_AGENT: &str = concat!("gitlab-exporter/", env!("CARGO_PKG_VERSION"));
const NEXT_PAGE_HEADER: &str = "x-next-page";

/// Thin GitLab REST v4 client.
///
/// Every collection endpoint is drained page by page; a single failed request
/// fails the whole call. No retries are attempted.
pub struct GitLabClient {
    client: Client,
    api_url: Url,
    token: Option<Token>,
    per_page: u32,
}

impl GitLabClient {
    pub fn new(
        base_url: &str,
        token: Option<Token>,
        per_page: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ExporterError::Config(format!("Failed to create HTTP client: {e}")))?;

        let mut base = Url::parse(base_url)
            .map_err(|e| ExporterError::Config(format!("Invalid base URL: {e}")))?;

        if base.cannot_be_a_base() {
            return Err(ExporterError::Config(format!(
                "Invalid base URL: {base_url}"
            )));
        }

        // Keep any sub-path the instance is served under.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let api_url = base
            .join("api/v4/")
            .map_err(|e| ExporterError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token,
            per_page: per_page.max(1),
        })
    }

    pub fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            request.bearer_auth(token.as_str())
        } else {
            request
        }
    }

    /// Builds an API URL from raw path segments, percent-encoding each one.
    pub(super) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, url: Url, query: &[(&str, String)]) -> Result<Response> {
        debug!("GET {url} {query:?}");

        let response = self
            .auth_request(self.client.get(url).query(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(ExporterError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    /// Fetches a single resource.
    pub(super) async fn get<T>(&self, url: Url) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(url, &[]).await?;
        Ok(response.json().await?)
    }

    /// Fetches every page of a collection resource.
    pub(super) async fn get_all<T>(&self, url: Url, filters: &[(&str, &str)]) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut page: u32 = 1;

        loop {
            let mut query: Vec<(&str, String)> = filters
                .iter()
                .map(|(key, value)| (*key, (*value).to_string()))
                .collect();
            query.push(("per_page", self.per_page.to_string()));
            query.push(("page", page.to_string()));

            let response = self.send(url.clone(), &query).await?;

            let next_page = response
                .headers()
                .get(NEXT_PAGE_HEADER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u32>().ok());

            let batch: Vec<T> = response.json().await?;
            debug!("Fetched {} items from page {page} of {url}", batch.len());

            let exhausted = batch.is_empty();
            items.extend(batch);

            match next_page {
                Some(next) if next > page && !exhausted => page = next,
                _ => break,
            }
        }

        Ok(items)
    }
}
