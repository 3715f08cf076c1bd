//! # Wire model
//!
//! JSON shapes exchanged with a debugger client. Every ViewModel notification
//! becomes one [`BallastDebuggerEvent`]; the client talks back with
//! [`BallastDebuggerAction`]s.
//!
//! Both are flat JSON objects: the envelope fields sit next to the payload
//! fields, and a `type` field names the payload.
//!
//! ```text
//! {
//!   "connectionId": "0b6f…",
//!   "viewModelName": "Counter",
//!   "uuid": "5d1c…",
//!   "timestamp": 1700000000000,
//!   "type": "InputQueued",
//!   "serializedInput": "Increment",
//!   "inputContentType": "text/plain"
//! }
//! ```

use serde::{Deserialize, Serialize};

/// One ViewModel notification, as sent to the debugger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallastDebuggerEvent {
    /// Identifies the interceptor that produced the event.
    pub connection_id: String,
    /// Name of the ViewModel that produced the event.
    pub view_model_name: String,
    /// Unique id of this event. Actions refer to earlier events by it.
    pub uuid: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// What happened.
    #[serde(flatten)]
    pub payload: DebuggerEventPayload,
}

/// What a [`BallastDebuggerEvent`] reports.
///
/// Values are sent as text produced by a
/// [`DebuggerAdapter`](crate::DebuggerAdapter), together with its content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum DebuggerEventPayload {
    ViewModelStatusChanged {
        status: String,
    },

    InputQueued {
        serialized_input: String,
        input_content_type: String,
    },
    InputAccepted {
        serialized_input: String,
        input_content_type: String,
    },
    InputRejected {
        serialized_input: String,
        input_content_type: String,
    },
    InputDropped {
        serialized_input: String,
        input_content_type: String,
    },
    InputHandledSuccessfully {
        serialized_input: String,
        input_content_type: String,
    },
    InputCancelled {
        serialized_input: String,
        input_content_type: String,
    },
    InputHandlerError {
        serialized_input: String,
        input_content_type: String,
        stacktrace: String,
    },

    EventQueued {
        serialized_event: String,
        event_content_type: String,
    },
    EventEmitted {
        serialized_event: String,
        event_content_type: String,
    },
    EventHandledSuccessfully {
        serialized_event: String,
        event_content_type: String,
    },
    EventHandlerError {
        serialized_event: String,
        event_content_type: String,
        stacktrace: String,
    },
    EventProcessingStarted,
    EventProcessingStopped,

    StateChanged {
        serialized_state: String,
        state_content_type: String,
    },

    SideJobQueued {
        key: String,
    },
    SideJobStarted {
        key: String,
        restart_state: String,
    },
    SideJobCompleted {
        key: String,
        restart_state: String,
    },
    SideJobCancelled {
        key: String,
        restart_state: String,
    },
    SideJobError {
        key: String,
        restart_state: String,
        stacktrace: String,
    },

    UnhandledError {
        stacktrace: String,
    },

    /// A refresh replay begins; the client should discard what it has.
    RefreshViewModelStart,
    /// A refresh replay is finished.
    RefreshViewModelComplete,
}

/// A request from the debugger client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallastDebuggerAction {
    /// The connection the request is meant for.
    pub connection_id: String,
    /// The ViewModel the request is meant for.
    pub view_model_name: String,
    /// What to do.
    #[serde(flatten)]
    pub payload: DebuggerActionPayload,
}

/// What a [`BallastDebuggerAction`] asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum DebuggerActionPayload {
    /// Replay the recorded history.
    RequestViewModelRefresh,
    /// Send the Input of an earlier event again.
    RequestResendInput {
        /// `uuid` of an event that carried the Input.
        input_uuid: String,
    },
    /// Restore the state reported by an earlier `StateChanged` event.
    RequestRestoreState {
        /// `uuid` of the `StateChanged` event.
        state_uuid: String,
    },
    /// Replace the state with one written by the client.
    RequestReplaceState {
        /// The new state, encoded as `state_content_type`.
        serialized_state: String,
        /// Encoding of `serialized_state`.
        state_content_type: String,
    },
}

impl BallastDebuggerEvent {
    /// The wire name of the payload, as in the `type` field.
    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }
}

impl DebuggerEventPayload {
    /// The wire name of this payload.
    pub fn kind(&self) -> &'static str {
        match self {
            DebuggerEventPayload::ViewModelStatusChanged { .. } => "ViewModelStatusChanged",
            DebuggerEventPayload::InputQueued { .. } => "InputQueued",
            DebuggerEventPayload::InputAccepted { .. } => "InputAccepted",
            DebuggerEventPayload::InputRejected { .. } => "InputRejected",
            DebuggerEventPayload::InputDropped { .. } => "InputDropped",
            DebuggerEventPayload::InputHandledSuccessfully { .. } => "InputHandledSuccessfully",
            DebuggerEventPayload::InputCancelled { .. } => "InputCancelled",
            DebuggerEventPayload::InputHandlerError { .. } => "InputHandlerError",
            DebuggerEventPayload::EventQueued { .. } => "EventQueued",
            DebuggerEventPayload::EventEmitted { .. } => "EventEmitted",
            DebuggerEventPayload::EventHandledSuccessfully { .. } => "EventHandledSuccessfully",
            DebuggerEventPayload::EventHandlerError { .. } => "EventHandlerError",
            DebuggerEventPayload::EventProcessingStarted => "EventProcessingStarted",
            DebuggerEventPayload::EventProcessingStopped => "EventProcessingStopped",
            DebuggerEventPayload::StateChanged { .. } => "StateChanged",
            DebuggerEventPayload::SideJobQueued { .. } => "SideJobQueued",
            DebuggerEventPayload::SideJobStarted { .. } => "SideJobStarted",
            DebuggerEventPayload::SideJobCompleted { .. } => "SideJobCompleted",
            DebuggerEventPayload::SideJobCancelled { .. } => "SideJobCancelled",
            DebuggerEventPayload::SideJobError { .. } => "SideJobError",
            DebuggerEventPayload::UnhandledError { .. } => "UnhandledError",
            DebuggerEventPayload::RefreshViewModelStart => "RefreshViewModelStart",
            DebuggerEventPayload::RefreshViewModelComplete => "RefreshViewModelComplete",
        }
    }
}
