//! Error types shared by the backend client, the renderer and the view state.

use std::path::PathBuf;

/// Message shown for every transport failure; the underlying cause only goes to the log.
pub const CONNECTIVITY_MESSAGE: &str =
    "Could not reach the analysis service. Check that the server is running and try again.";

/// Message for a JSON answer whose fields have the wrong types.
pub const UNREADABLE_RESULT_MESSAGE: &str =
    "The analysis service answered, but its result could not be read by this client.";

/// Fallback when the backend reports `success: false` without an `error` string.
pub const UNKNOWN_BACKEND_ERROR: &str = "Unknown error reported by the service";

/// A required field was missing from a backend payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed result: missing required field `{field}`")]
pub struct MalformedResultError {
    pub field: &'static str,
}

impl MalformedResultError {
    pub fn missing(field: &'static str) -> Self {
        Self { field }
    }
}

/// Everything that can go wrong between choosing a file and holding a display model.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Backend unreachable, timed out, or answered with something that is not JSON.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered `success: false`; the message is kept verbatim.
    #[error("{0}")]
    Domain(String),

    #[error(transparent)]
    Malformed(#[from] MalformedResultError),

    /// Valid JSON from the backend, but a field has the wrong type.
    #[error("unexpected payload shape: {0}")]
    Payload(String),

    /// Rejected before any request was sent.
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    /// Text to put in front of the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport(_) => CONNECTIVITY_MESSAGE.to_string(),
            ClientError::Domain(message) => message.clone(),
            ClientError::Payload(_) => UNREADABLE_RESULT_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

/// Configuration file problems.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot access config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
