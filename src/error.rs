use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("GitLab API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unmapped {kind} status: {status:?}")]
    UnmappedStatus { kind: &'static str, status: String },

    #[error("Unparseable timestamp: {value:?}")]
    Timestamp { value: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, ExporterError>;
