use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a failed call to the text-generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpstreamErrorKind {
    RateLimited,
    Authentication,
    Transient,
    Other,
}

impl fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::RateLimited => "rate limited",
            Self::Authentication => "authentication",
            Self::Transient => "transient",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Malformed table: row {row} has {found} columns, expected 3 (label, prior, current)")]
    MalformedTable { row: usize, found: usize },

    #[error("Missing totals: no line item matches {query}")]
    MissingTotals { query: String },

    #[error("Upstream service error ({kind}): {message}")]
    UpstreamService {
        kind: UpstreamErrorKind,
        message: String,
    },

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AnalysisError {
    pub(crate) fn upstream(kind: UpstreamErrorKind, message: impl Into<String>) -> Self {
        Self::UpstreamService {
            kind,
            message: message.into(),
        }
    }

    /// True for the errors that describe a problem with the uploaded table
    /// itself rather than with the service or the environment.
    pub fn is_data_structure_error(&self) -> bool {
        matches!(self, Self::MalformedTable { .. } | Self::MissingTotals { .. })
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
