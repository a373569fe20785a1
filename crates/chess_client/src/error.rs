//! Error types for the board client.

use derive_more::{Display, Error};
use tracing::instrument;

/// What went wrong with a client operation.
///
/// Every remote failure is folded into one of these so callers can treat
/// server rejections and transport problems the same way.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ClientErrorKind {
    /// The server answered with an error field or a failure status.
    #[display("Server rejected request: {_0}")]
    ServerRejected(String),
    /// The request never produced a response.
    #[display("Communication failure: {_0}")]
    Transport(String),
    /// The request did not complete within the configured timeout.
    #[display("Request timed out: {_0}")]
    Timeout(String),
    /// The response arrived but could not be understood.
    #[display("Malformed response: {_0}")]
    Decode(String),
    /// A value supplied by the caller was out of range.
    #[display("Invalid input: {_0}")]
    InvalidInput(String),
    /// Configuration could not be read or is inconsistent.
    #[display("Config error: {_0}")]
    Config(String),
}

/// Client error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("{} at {}:{}", kind, file, line)]
pub struct ClientError {
    /// Error category and message.
    pub kind: ClientErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ClientError {
    /// Creates a new client error with caller location tracking.
    #[track_caller]
    #[instrument(skip(kind))]
    pub fn new(kind: ClientErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// The server refused the request.
    #[track_caller]
    pub fn server_rejected(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::ServerRejected(message.into()))
    }

    /// The request could not be delivered or answered.
    #[track_caller]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Transport(message.into()))
    }

    /// The request exceeded its deadline.
    #[track_caller]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Timeout(message.into()))
    }

    /// The response body did not match the expected shape.
    #[track_caller]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Decode(message.into()))
    }

    /// A caller-supplied value was rejected before any request was made.
    #[track_caller]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::InvalidInput(message.into()))
    }

    /// Configuration file or environment was unusable.
    #[track_caller]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Config(message.into()))
    }

    /// Message suitable for showing to the user (no source location).
    pub fn user_message(&self) -> String {
        self.kind.to_string()
    }

    /// Whether this error came from the timeout policy.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ClientErrorKind::Timeout(_))
    }
}

impl From<reqwest::Error> for ClientError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(err.to_string())
        } else if err.is_decode() {
            Self::decode(err.to_string())
        } else {
            Self::transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_points_at_caller() {
        let err = ClientError::server_rejected("nope");
        assert!(err.file.ends_with("error.rs"));
        assert!(err.line > 0);
    }

    #[test]
    fn test_user_message_omits_location() {
        let err = ClientError::timeout("submit move exceeded 50 ms");
        assert_eq!(
            err.user_message(),
            "Request timed out: submit move exceeded 50 ms"
        );
        assert!(err.is_timeout());
        assert!(err.to_string().contains("error.rs"));
    }
}
