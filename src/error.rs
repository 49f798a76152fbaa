use thiserror::Error;

use crate::protocol::DecodeError;

/// Errors produced by the protocol layer.
///
/// Every variant is scoped to a single send or receive; none of them is fatal
/// to the session. The type is `Clone` so that one transport failure can be
/// fanned out to every pending call waiting on that connection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrthoError {
    /// An action could not be turned into a wire object.
    ///
    /// Unreachable for well-formed actions; aborts only the send that hit it.
    #[error("failed to encode `{action}`: {reason}")]
    Encoding {
        action: &'static str,
        reason: String,
    },

    /// Inbound text was not a recognised response.
    #[error(transparent)]
    Decoding(#[from] DecodeError),

    /// No matching response arrived before the caller's deadline.
    #[error("timed out waiting for `{expected}`")]
    CorrelationTimeout { expected: &'static str },

    /// The pending call was cancelled before a response arrived.
    #[error("pending `{expected}` call was cancelled")]
    Cancelled { expected: &'static str },

    /// A response was routed to a call expecting a different variant.
    #[error("expected `{expected}` but received `{received}`")]
    UnexpectedResponse {
        expected: &'static str,
        received: &'static str,
    },

    /// Failure reported by the transport collaborator.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, OrthoError>;
