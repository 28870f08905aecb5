//! Error types for cluster queries and shell attachment.

use thiserror::Error;

/// A listing call against the API server failed.
#[derive(Debug, Error)]
#[error("failed to {operation}: {source}")]
pub struct ClusterQueryError {
    pub operation: String,
    #[source]
    pub source: anyhow::Error,
}

impl ClusterQueryError {
    pub fn new(operation: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self {
            operation: operation.into(),
            source: source.into(),
        }
    }
}

/// Why a single exec attempt did not produce a running shell.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The cluster runtime refused to start the command (missing binary and similar).
    #[error("command rejected by the container runtime: {0}")]
    Rejected(String),

    /// The exec stream could not be opened or broke mid-session.
    #[error("exec stream failed: {0}")]
    Connection(String),
}

impl ExecError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }
}

impl From<kube::Error> for ExecError {
    fn from(error: kube::Error) -> Self {
        match error {
            // A Status reply from the API server rather than a transport failure.
            // Failed exec upgrades (403, 404) arrive as `UpgradeConnection` instead.
            kube::Error::Api(status) => Self::Rejected(status.message.clone()),
            other => Self::Connection(other.to_string()),
        }
    }
}

impl From<std::io::Error> for ExecError {
    fn from(error: std::io::Error) -> Self {
        Self::Connection(error.to_string())
    }
}
