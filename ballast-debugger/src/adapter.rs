//! Payload adapters: how Inputs, Events and States are written for the debugger.

use crate::error::DebuggerError;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;

/// Text sent to the debugger, tagged with its encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedPayload {
    /// The encoded value.
    pub content: String,
    /// MIME type of `content`.
    pub content_type: String,
}

impl SerializedPayload {
    /// `content` as `text/plain`.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_type: ToStringDebuggerAdapter::CONTENT_TYPE.to_string(),
        }
    }

    /// The `Debug` rendering of `value` as `text/plain`.
    pub fn debug(value: &impl Debug) -> Self {
        Self::text(format!("{value:?}"))
    }
}

/// Encodes a ViewModel's values for the debugger.
///
/// Decoding is only needed for `RequestReplaceState`; adapters that cannot
/// decode states keep the default, which refuses the request.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot encode `{I}`, `{E}` and `{S}` for the debugger",
    label = "missing `DebuggerAdapter` implementation",
    note = "Use `ToStringDebuggerAdapter` for any Debug types, or `JsonDebuggerAdapter` for serde types."
)]
pub trait DebuggerAdapter<I, E, S>: Send + Sync + 'static {
    /// Encode an Input.
    fn serialize_input(&self, input: &I) -> Result<SerializedPayload, DebuggerError>;

    /// Encode an Event.
    fn serialize_event(&self, event: &E) -> Result<SerializedPayload, DebuggerError>;

    /// Encode a State.
    fn serialize_state(&self, state: &S) -> Result<SerializedPayload, DebuggerError>;

    /// Decode a State written by the debugger client.
    fn deserialize_state(&self, content_type: &str, content: &str) -> Result<S, DebuggerError> {
        let _ = (content_type, content);
        Err(DebuggerError::ReplaceStateUnsupported)
    }
}

/// Writes every value with its `Debug` formatting.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToStringDebuggerAdapter;

impl ToStringDebuggerAdapter {
    /// Content type of everything this adapter writes.
    pub const CONTENT_TYPE: &'static str = "text/plain";
}

impl<I: Debug, E: Debug, S: Debug> DebuggerAdapter<I, E, S> for ToStringDebuggerAdapter {
    fn serialize_input(&self, input: &I) -> Result<SerializedPayload, DebuggerError> {
        Ok(SerializedPayload::debug(input))
    }

    fn serialize_event(&self, event: &E) -> Result<SerializedPayload, DebuggerError> {
        Ok(SerializedPayload::debug(event))
    }

    fn serialize_state(&self, state: &S) -> Result<SerializedPayload, DebuggerError> {
        Ok(SerializedPayload::debug(state))
    }
}

/// Writes values as JSON, and reads replacement states back from JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDebuggerAdapter;

impl JsonDebuggerAdapter {
    /// Content type of everything this adapter writes.
    pub const CONTENT_TYPE: &'static str = "application/json";

    fn encode(value: &impl Serialize) -> Result<SerializedPayload, DebuggerError> {
        Ok(SerializedPayload {
            content: serde_json::to_string(value)?,
            content_type: Self::CONTENT_TYPE.to_string(),
        })
    }
}

impl<I, E, S> DebuggerAdapter<I, E, S> for JsonDebuggerAdapter
where
    I: Serialize,
    E: Serialize,
    S: Serialize + DeserializeOwned,
{
    fn serialize_input(&self, input: &I) -> Result<SerializedPayload, DebuggerError> {
        Self::encode(input)
    }

    fn serialize_event(&self, event: &E) -> Result<SerializedPayload, DebuggerError> {
        Self::encode(event)
    }

    fn serialize_state(&self, state: &S) -> Result<SerializedPayload, DebuggerError> {
        Self::encode(state)
    }

    fn deserialize_state(&self, content_type: &str, content: &str) -> Result<S, DebuggerError> {
        if content_type != Self::CONTENT_TYPE {
            return Err(DebuggerError::UnsupportedContentType(
                content_type.to_string(),
            ));
        }
        Ok(serde_json::from_str(content)?)
    }
}
