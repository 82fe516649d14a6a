//! Fault types raised by request operations.
//!
//! # Design
//! `FetchError` covers everything an operation can *raise*: transport
//! failures, unexpected HTTP statuses, and payload (de)serialization
//! problems. Application-level rejections (`errorCode != 0`) are normally
//! carried inside the envelope instead; `Rejected` exists only so the
//! legacy settle path can report them through a single error type.

use thiserror::Error;

/// Faults produced by an operation or by the envelope client.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The operation gave up waiting for the remote side.
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure reported by the host transport.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be decoded into an envelope.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The operation panicked instead of returning.
    #[error("operation panicked: {0}")]
    Panicked(String),

    /// A well-formed envelope carried a nonzero `errorCode`.
    #[error("rejected with code {code}: {message}")]
    Rejected { code: i32, message: String },
}

impl FetchError {
    /// True for faults raised below the application protocol.
    pub fn is_transport(&self) -> bool {
        !matches!(self, FetchError::Rejected { .. })
    }
}
