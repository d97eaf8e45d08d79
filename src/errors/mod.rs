//! Error types for the xMatters client.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias for xMatters operations.
pub type XMattersResult<T> = Result<T, XMattersError>;

/// Maximum number of body bytes kept on a decode error.
const MAX_ERROR_BODY_LEN: usize = 4096;

/// Error payload returned by the xMatters API for failed requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// HTTP-like error code reported by the server.
    #[serde(default)]
    pub code: u16,
    /// Short reason phrase.
    #[serde(default)]
    pub reason: String,
    /// Human readable message.
    #[serde(default)]
    pub message: String,
    /// Optional machine readable subcode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcode: Option<String>,
}

impl fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}. {}", self.code, self.reason, self.message)?;
        if let Some(ref subcode) = self.subcode {
            write!(f, " (subcode: {})", subcode)?;
        }
        Ok(())
    }
}

/// Category of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection could not be established.
    Connect,
    /// The request timed out.
    Timeout,
    /// The response body could not be read.
    Body,
    /// Any other failure reported by the HTTP stack.
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Timeout => write!(f, "timeout"),
            Self::Body => write!(f, "body"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Errors produced by the xMatters client.
#[derive(Error, Debug)]
pub enum XMattersError {
    /// The client configuration is invalid.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The HTTP request could not be constructed.
    #[error("HTTP request creation failed: {0}")]
    Request(String),

    /// The request body could not be encoded as JSON.
    #[error("error marshalling body to JSON: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Network failure after all retries were exhausted.
    #[error("HTTP request failed ({kind}): {message}")]
    Transport {
        /// Failure category.
        kind: TransportErrorKind,
        /// Description from the HTTP stack.
        message: String,
    },

    /// A response body did not match the expected JSON shape.
    #[error("error unmarshalling the JSON response: {message}")]
    Decode {
        /// Decoder message.
        message: String,
        /// Raw response body (truncated).
        body: String,
    },

    /// The server answered 204 No Content.
    #[error("xMatters API Error: 204 - No Content. A resource was not found in response to a DELETE request.")]
    NoContent,

    /// The server answered 401 Unauthorized.
    #[error("xMatters API Error: 401 - Unauthorized. Invalid Credentials")]
    InvalidCredentials,

    /// The server returned a structured error payload.
    #[error("xMatters API Error: {error} [HTTP {status}]")]
    Api {
        /// HTTP status of the response.
        status: u16,
        /// Decoded error payload.
        error: ApiErrorBody,
    },

    /// The request was cancelled by the caller.
    #[error("request cancelled")]
    Cancelled,

    /// The caller's deadline elapsed before the request completed.
    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

impl XMattersError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a request construction error.
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }

    /// Creates a transport error.
    pub fn transport(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self::Transport {
            kind,
            message: message.into(),
        }
    }

    /// Creates a decode error that keeps the offending body for diagnostics.
    pub fn decode(message: impl fmt::Display, body: &[u8]) -> Self {
        let mut body = String::from_utf8_lossy(body).into_owned();
        if body.len() > MAX_ERROR_BODY_LEN {
            let mut cut = MAX_ERROR_BODY_LEN;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Self::Decode {
            message: message.to_string(),
            body,
        }
    }

    /// Returns true for the 204 sentinel.
    pub fn is_no_content(&self) -> bool {
        matches!(self, Self::NoContent)
    }

    /// Returns true for the 401 sentinel.
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, Self::InvalidCredentials)
    }

    /// Returns true if a fresh attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// HTTP status associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::NoContent => Some(204),
            Self::InvalidCredentials => Some(401),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Structured error payload, if the server sent one.
    pub fn api_error(&self) -> Option<&ApiErrorBody> {
        match self {
            Self::Api { error, .. } => Some(error),
            _ => None,
        }
    }
}
