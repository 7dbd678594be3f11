//! Error types for the ABS2 client.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for ABS2 client operations.
pub type Abs2Result<T> = Result<T, Abs2Error>;

/// Errors that can occur when talking to the ABS2 QUBO solver.
///
/// Every facade operation surfaces failures through this single type. None of
/// them are retried by the client.
#[derive(Debug, Error)]
pub enum Abs2Error {
    /// The request never produced a complete response (DNS, TLS, connect,
    /// reset, timeout, or a broken body stream).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not JSON, or did not match the expected model.
    #[error("Bad JSON in response ({context}): {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A request body could not be built from the caller's data.
    #[error("Invalid request body ({context}): {source}")]
    Encode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A resource name cannot address a single path segment.
    #[error("Invalid resource name: {0:?}")]
    InvalidName(String),

    /// The server answered with a status outside `200..=299`.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A header name or value could not be encoded.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// A QUBO coefficient cannot be represented as an integer weight.
    #[error("Non-finite weight for pair ({a}, {b})")]
    InvalidWeight { a: String, b: String },

    /// Reading a matrix file from disk failed.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Abs2Error {
    pub(crate) fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn encode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Encode {
            context: context.into(),
            source,
        }
    }

    /// HTTP status code carried by an [`Abs2Error::Api`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure happened before any response arrived.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Whether the response could not be decoded.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Whether the server rejected the request.
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}
