//! Error types for the remote access layer.
//!
//! Each operation wraps transport failures with its own name and re-raises;
//! nothing here retries. The only local absorption is chunk failures inside
//! `WitClient::get_many`, which are reported structurally in the outcome.

use thiserror::Error;

/// Result type alias for access layer operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur in the work item access layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required connection setting is absent. Construction-time fatal:
    /// every subsequent call would be unauthenticated or unaddressed.
    #[error("missing required setting: {0}")]
    MissingSetting(&'static str),

    /// The configured endpoint does not form a valid base URL.
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),

    /// The access token cannot be carried in a header.
    #[error("access token is not a valid header value")]
    InvalidToken,

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build http client")]
    BuildClient(#[source] reqwest::Error),

    /// Single-item fetch or update of an id the remote does not know.
    #[error("work item {0} not found")]
    NotFound(u64),

    /// The remote answered with a non-success status.
    #[error("{operation} failed with status {status}: {message}")]
    Remote {
        operation: &'static str,
        status: u16,
        message: String,
    },

    /// The transport failed before a usable response arrived, or the
    /// response body could not be decoded.
    #[error("{operation} request failed")]
    Request {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    /// True for errors raised before any network call was possible.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingSetting(_) | Self::InvalidUrl(_) | Self::InvalidToken | Self::BuildClient(_)
        )
    }
}
