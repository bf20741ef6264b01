//! Error types for entity-suggest.
//!
//! Uses thiserror for ergonomic error handling with proper
//! error chain propagation. None of these are fatal to the widget:
//! every failure degrades to "nothing is shown".

use std::path::PathBuf;
use thiserror::Error;

/// Top-level suggestion error.
#[derive(Error, Debug)]
pub enum SuggestError {
    #[error("Network error: {0}")]
    Network(#[from] TransportError),

    #[error("Service error: {status} ({code})")]
    Service { status: String, code: String },

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch task aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

/// Transport-level failures (request rejected, connection dropped).
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} failed: {reason}")]
    Other { url: String, reason: String },
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for suggestion operations.
pub type SuggestResult<T> = std::result::Result<T, SuggestError>;

/// Result type alias for transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

impl SuggestError {
    /// Builds a service error from an HTTP status that is not a success.
    #[must_use]
    pub fn status(status: u16) -> Self {
        Self::Service {
            status: status.to_string(),
            code: "/api/status/error".to_string(),
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network(e) => e.code(),
            Self::Service { .. } => "SERVICE_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Config(e) => e.code(),
            Self::Aborted(_) => "ABORTED",
        }
    }

    /// Whether this failure came from the remote side rather than the transport.
    #[must_use]
    pub fn is_service(&self) -> bool {
        matches!(self, Self::Service { .. } | Self::Decode(_))
    }
}

impl TransportError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Http { .. } => "HTTP_ERROR",
            Self::Other { .. } => "NETWORK_ERROR",
        }
    }
}

impl ConfigError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "CONFIG_READ_ERROR",
            Self::Parse { .. } => "CONFIG_PARSE_ERROR",
        }
    }
}
