//! HTTP scrape endpoints.
//!
//! Each collection set is served on its own port. A scrape runs the set's
//! collectors synchronously and answers with the Prometheus text format, or
//! with a 500 when any collector fails.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use log::{debug, error, info};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::metrics::encode_text;
use crate::router::CollectionSet;

/// Serves one collection set.
pub struct ScrapeServer {
    set: Arc<CollectionSet>,
    bind_address: String,
    port: u16,
}

impl ScrapeServer {
    pub fn new(set: Arc<CollectionSet>, bind_address: impl Into<String>, port: u16) -> Self {
        Self {
            set,
            bind_address: bind_address.into(),
            port,
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn app(set: Arc<CollectionSet>) -> Router {
        Router::new()
            .route("/", get(metrics_handler))
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .with_state(set)
    }

    /// Binds and serves until the process is stopped.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = self.socket_addr();
        let listener = TcpListener::bind(&addr).await?;
        info!(
            "Serving collection set '{}' ({}) on http://{}/metrics",
            self.set.name(),
            self.set
                .facets()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            addr
        );

        axum::serve(listener, Self::app(self.set))
            .await
            .map_err(|e| anyhow::anyhow!("Scrape server on {addr} failed: {e}"))
    }
}

async fn metrics_handler(State(set): State<Arc<CollectionSet>>) -> Response {
    debug!("Scrape of set '{}'", set.name());

    let encoded = match set.collect().await {
        Ok(families) => encode_text(&families),
        Err(e) => Err(e),
    };

    match encoded {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, TextEncoder::new().format_type().to_string())],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Scrape of set '{}' failed: {e}", set.name());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Collection failed: {e}"),
            )
                .into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
