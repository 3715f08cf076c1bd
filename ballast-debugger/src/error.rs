//! Error types for the debugger protocol.

use thiserror::Error;

/// Errors raised while negotiating, encoding or applying debugger traffic.
#[derive(Error, Debug)]
pub enum DebuggerError {
    /// A client version string was not `major.minor.patch`.
    #[error("invalid client version `{0}`")]
    InvalidVersion(String),

    /// The client speaks a protocol version this side cannot serve.
    #[error("debugger client version {0} is not supported")]
    UnsupportedVersion(String),

    /// Traffic was encoded or decoded with [`SerializerMapping::Unsupported`](crate::SerializerMapping::Unsupported).
    #[error("no serializer is available for this debugger client")]
    NoSerializer,

    /// A payload could not be encoded or decoded as JSON.
    #[error("debugger payload is not valid: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A serialized payload used a content type the adapter cannot decode.
    #[error("unsupported content type `{0}`")]
    UnsupportedContentType(String),

    /// The adapter cannot turn serialized text back into a state.
    #[error("this adapter cannot decode states sent by the debugger")]
    ReplaceStateUnsupported,

    /// An action referred to an event that is not in the history, or that
    /// does not carry what the action needs.
    #[error("no recorded event `{0}` carries the requested value")]
    UnknownEvent(String),

    /// The ViewModel refused the Input or state the action produced.
    #[error("the ViewModel is no longer accepting values")]
    ViewModelClosed,

    /// The other end of the connection is gone.
    #[error("the debugger connection is closed")]
    Disconnected,
}
