//! Network description error types.

use std::path::PathBuf;

use crate::geo::InvalidCoordinate;

/// Errors raised while turning a network description into a station index.
///
/// `Malformed`, `Io` and `Json` abort the whole build. The remaining variants
/// are scoped to a single line or stop and are normally collected into a
/// [`BuildReport`](super::BuildReport) while the build carries on.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// The description file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The description is not JSON at all
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level line/stop containers are missing
    #[error("malformed network description: {reason}")]
    Malformed { reason: &'static str },

    /// A line carries no usable display name
    #[error("line {line} has no English display name")]
    MissingLocalization { line: usize },

    /// A line entry lacks its color or coordinate segments
    #[error("line {line} is unreadable: {message}")]
    InvalidLine { line: usize, message: String },

    /// A stop's latitude or longitude is not a number
    #[error("stop {stop} has an invalid coordinate: {source}")]
    InvalidCoordinate {
        stop: usize,
        #[source]
        source: InvalidCoordinate,
    },

    /// A stop entry has the wrong shape
    #[error("stop {stop} is unreadable: {message}")]
    InvalidStop { stop: usize, message: String },
}

impl NetworkError {
    /// Whether this error only affects a single line or stop.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            NetworkError::MissingLocalization { .. }
                | NetworkError::InvalidLine { .. }
                | NetworkError::InvalidCoordinate { .. }
                | NetworkError::InvalidStop { .. }
        )
    }
}
