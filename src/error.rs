use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse authorization file {}: {source}", path.display())]
    AuthFileParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("booking rejected with status {status}: {body}")]
    RemoteRejection { status: u16, body: String },

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("notification is not valid JSON: {0}")]
    InvalidNotification(#[source] serde_json::Error),

    #[error("no webhook configured")]
    MissingWebhook,

    #[error("webhook rejected notification with status {status}: {body}")]
    WebhookRejected { status: u16, body: String },
}

impl Error {
    /// Transport-level failure, as opposed to an answer from the remote API.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}
