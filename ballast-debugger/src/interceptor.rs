//! # Debugger interceptor
//!
//! Bridges a running ViewModel to a debugger client.
//!
//! ```text
//! ViewModel ──notification──▶ DebuggerInterceptor ──BallastDebuggerEvent──▶ DebuggerConnection
//!     ▲                              │  (history)                                   │
//!     └──── send / restore_state ────┴◀──────────── BallastDebuggerAction ──────────┘
//! ```
//!
//! The interceptor owns no transport. Whatever carries the traffic (a
//! websocket, a file, a test) reads events from the [`DebuggerConnection`]
//! and writes actions into it, encoding them with a
//! [`SerializerMapping`](crate::SerializerMapping).
//!
//! # Example
//!
//! ```rust,ignore
//! let (debugger, mut connection) = DebuggerInterceptor::new(JsonDebuggerAdapter);
//! let view_model = ViewModel::builder(state, handler)
//!     .interceptor(debugger)
//!     .build();
//! view_model.start();
//!
//! while let Some(event) = connection.next_event().await {
//!     socket.send(mapping.encode_event(&event)?).await?;
//! }
//! ```

use crate::{
    adapter::{DebuggerAdapter, SerializedPayload},
    error::DebuggerError,
    model::{BallastDebuggerAction, BallastDebuggerEvent, DebuggerActionPayload, DebuggerEventPayload},
};
use ballast::{BallastNotification, Interceptor, Message, ViewModelHandle};
use chrono::Utc;
use parking_lot::Mutex;
use std::{collections::VecDeque, sync::Arc};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Number of events kept for refresh, resend and restore requests.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Reports every notification to a debugger client and applies its requests.
pub struct DebuggerInterceptor<I: Message, E: Message, S: Message, A> {
    shared: Arc<Shared<I, E, S, A>>,
    actions: Mutex<Option<mpsc::UnboundedReceiver<BallastDebuggerAction>>>,
}

/// The client side of a [`DebuggerInterceptor`].
#[derive(Debug)]
pub struct DebuggerConnection {
    connection_id: String,
    events: mpsc::UnboundedReceiver<BallastDebuggerEvent>,
    actions: mpsc::UnboundedSender<BallastDebuggerAction>,
}

struct Shared<I, E, S, A> {
    adapter: A,
    connection_id: String,
    history_capacity: usize,
    history: Mutex<VecDeque<Recorded<I, E, S>>>,
    events: mpsc::UnboundedSender<BallastDebuggerEvent>,
}

struct Recorded<I, E, S> {
    event: BallastDebuggerEvent,
    notification: BallastNotification<I, E, S>,
}

impl<I, E, S, A> DebuggerInterceptor<I, E, S, A>
where
    I: Message,
    E: Message,
    S: Message,
    A: DebuggerAdapter<I, E, S>,
{
    /// Create an interceptor keeping [`DEFAULT_HISTORY_CAPACITY`] events.
    pub fn new(adapter: A) -> (Self, DebuggerConnection) {
        Self::with_history_capacity(adapter, DEFAULT_HISTORY_CAPACITY)
    }

    /// Create an interceptor keeping the last `capacity` events (at least one).
    pub fn with_history_capacity(adapter: A, capacity: usize) -> (Self, DebuggerConnection) {
        let connection_id = Uuid::new_v4().to_string();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let interceptor = Self {
            shared: Arc::new(Shared {
                adapter,
                connection_id: connection_id.clone(),
                history_capacity: capacity.max(1),
                history: Mutex::new(VecDeque::new()),
                events: event_tx,
            }),
            actions: Mutex::new(Some(action_rx)),
        };
        let connection = DebuggerConnection {
            connection_id,
            events: event_rx,
            actions: action_tx,
        };
        (interceptor, connection)
    }

    /// Identifies this interceptor in every event it sends.
    pub fn connection_id(&self) -> &str {
        &self.shared.connection_id
    }
}

impl<I, E, S, A> Interceptor<I, E, S> for DebuggerInterceptor<I, E, S, A>
where
    I: Message,
    E: Message,
    S: Message,
    A: DebuggerAdapter<I, E, S>,
{
    fn start(&self, view_model: &ViewModelHandle<I, E, S>) {
        let Some(mut actions) = self.actions.lock().take() else {
            return;
        };
        let shared = self.shared.clone();
        let target = view_model.clone();
        view_model.spawn(async move {
            while let Some(action) = actions.recv().await {
                shared.apply(action, &target).await;
            }
        });
    }

    async fn on_notification(
        &self,
        notification: &BallastNotification<I, E, S>,
        view_model: &ViewModelHandle<I, E, S>,
    ) {
        self.shared.record(notification, view_model.name());
    }
}

// ============================================================================
// Outgoing events
// ============================================================================

impl<I, E, S, A> Shared<I, E, S, A>
where
    I: Message,
    E: Message,
    S: Message,
    A: DebuggerAdapter<I, E, S>,
{
    fn event(&self, view_model_name: &str, payload: DebuggerEventPayload) -> BallastDebuggerEvent {
        BallastDebuggerEvent {
            connection_id: self.connection_id.clone(),
            view_model_name: view_model_name.to_string(),
            uuid: Uuid::new_v4().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            payload,
        }
    }

    fn record(&self, notification: &BallastNotification<I, E, S>, view_model_name: &str) {
        let event = self.event(view_model_name, self.payload(notification));

        // Sending under the lock keeps live events and refresh replays in one order.
        let mut history = self.history.lock();
        while history.len() >= self.history_capacity {
            history.pop_front();
        }
        history.push_back(Recorded {
            event: event.clone(),
            notification: notification.clone(),
        });
        self.send(event);
    }

    fn send(&self, event: BallastDebuggerEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!(connection_id = %self.connection_id, "debugger disconnected, event dropped");
        }
    }

    fn payload(&self, notification: &BallastNotification<I, E, S>) -> DebuggerEventPayload {
        use DebuggerEventPayload as P;

        match notification {
            BallastNotification::ViewModelStatusChanged(status) => P::ViewModelStatusChanged {
                status: status.to_string(),
            },

            BallastNotification::InputQueued(input) => {
                let input = self.input(input);
                P::InputQueued {
                    serialized_input: input.content,
                    input_content_type: input.content_type,
                }
            }
            BallastNotification::InputAccepted(input) => {
                let input = self.input(input);
                P::InputAccepted {
                    serialized_input: input.content,
                    input_content_type: input.content_type,
                }
            }
            BallastNotification::InputRejected(input) => {
                let input = self.input(input);
                P::InputRejected {
                    serialized_input: input.content,
                    input_content_type: input.content_type,
                }
            }
            BallastNotification::InputDropped(input) => {
                let input = self.input(input);
                P::InputDropped {
                    serialized_input: input.content,
                    input_content_type: input.content_type,
                }
            }
            BallastNotification::InputHandledSuccessfully(input) => {
                let input = self.input(input);
                P::InputHandledSuccessfully {
                    serialized_input: input.content,
                    input_content_type: input.content_type,
                }
            }
            BallastNotification::InputCancelled(input) => {
                let input = self.input(input);
                P::InputCancelled {
                    serialized_input: input.content,
                    input_content_type: input.content_type,
                }
            }
            BallastNotification::InputHandlerError(input, err) => {
                let input = self.input(input);
                P::InputHandlerError {
                    serialized_input: input.content,
                    input_content_type: input.content_type,
                    stacktrace: err.to_string(),
                }
            }

            BallastNotification::EventQueued(event) => {
                let event = self.event_payload(event);
                P::EventQueued {
                    serialized_event: event.content,
                    event_content_type: event.content_type,
                }
            }
            BallastNotification::EventEmitted(event) => {
                let event = self.event_payload(event);
                P::EventEmitted {
                    serialized_event: event.content,
                    event_content_type: event.content_type,
                }
            }
            BallastNotification::EventHandledSuccessfully(event) => {
                let event = self.event_payload(event);
                P::EventHandledSuccessfully {
                    serialized_event: event.content,
                    event_content_type: event.content_type,
                }
            }
            BallastNotification::EventHandlerError(event, err) => {
                let event = self.event_payload(event);
                P::EventHandlerError {
                    serialized_event: event.content,
                    event_content_type: event.content_type,
                    stacktrace: err.to_string(),
                }
            }
            BallastNotification::EventProcessingStarted => P::EventProcessingStarted,
            BallastNotification::EventProcessingStopped => P::EventProcessingStopped,

            BallastNotification::StateChanged(state) => {
                let state = self.state(state);
                P::StateChanged {
                    serialized_state: state.content,
                    state_content_type: state.content_type,
                }
            }

            BallastNotification::SideJobQueued(key) => P::SideJobQueued { key: key.clone() },
            BallastNotification::SideJobStarted(key, restart) => P::SideJobStarted {
                key: key.clone(),
                restart_state: format!("{restart:?}"),
            },
            BallastNotification::SideJobCompleted(key, restart) => P::SideJobCompleted {
                key: key.clone(),
                restart_state: format!("{restart:?}"),
            },
            BallastNotification::SideJobCancelled(key, restart) => P::SideJobCancelled {
                key: key.clone(),
                restart_state: format!("{restart:?}"),
            },
            BallastNotification::SideJobError(key, restart, err) => P::SideJobError {
                key: key.clone(),
                restart_state: format!("{restart:?}"),
                stacktrace: err.to_string(),
            },

            BallastNotification::UnhandledError(err) => P::UnhandledError {
                stacktrace: err.to_string(),
            },
        }
    }

    fn input(&self, input: &I) -> SerializedPayload {
        self.adapter.serialize_input(input).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "input not serializable, sending its Debug text");
            SerializedPayload::debug(input)
        })
    }

    fn event_payload(&self, event: &E) -> SerializedPayload {
        self.adapter.serialize_event(event).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "event not serializable, sending its Debug text");
            SerializedPayload::debug(event)
        })
    }

    fn state(&self, state: &S) -> SerializedPayload {
        self.adapter.serialize_state(state).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "state not serializable, sending its Debug text");
            SerializedPayload::debug(state)
        })
    }
}

// ============================================================================
// Incoming actions
// ============================================================================

impl<I, E, S, A> Shared<I, E, S, A>
where
    I: Message,
    E: Message,
    S: Message,
    A: DebuggerAdapter<I, E, S>,
{
    async fn apply(&self, action: BallastDebuggerAction, view_model: &ViewModelHandle<I, E, S>) {
        if action.connection_id != self.connection_id || action.view_model_name != view_model.name()
        {
            tracing::debug!(
                connection_id = %action.connection_id,
                view_model = %action.view_model_name,
                "ignoring debugger action addressed elsewhere"
            );
            return;
        }

        let result = match action.payload {
            DebuggerActionPayload::RequestViewModelRefresh => {
                self.refresh(view_model.name());
                Ok(())
            }
            DebuggerActionPayload::RequestResendInput { input_uuid } => {
                self.resend_input(&input_uuid, view_model).await
            }
            DebuggerActionPayload::RequestRestoreState { state_uuid } => {
                self.restore_state(&state_uuid, view_model).await
            }
            DebuggerActionPayload::RequestReplaceState {
                serialized_state,
                state_content_type,
            } => {
                self.replace_state(&state_content_type, &serialized_state, view_model)
                    .await
            }
        };

        if let Err(err) = result {
            tracing::warn!(view_model = %view_model.name(), error = %err, "debugger action failed");
        }
    }

    fn refresh(&self, view_model_name: &str) {
        let history = self.history.lock();
        self.send(self.event(view_model_name, DebuggerEventPayload::RefreshViewModelStart));
        for recorded in history.iter() {
            self.send(recorded.event.clone());
        }
        self.send(self.event(view_model_name, DebuggerEventPayload::RefreshViewModelComplete));
    }

    fn find<T>(
        &self,
        uuid: &str,
        pick: impl Fn(&BallastNotification<I, E, S>) -> Option<T>,
    ) -> Result<T, DebuggerError> {
        self.history
            .lock()
            .iter()
            .find(|recorded| recorded.event.uuid == uuid)
            .and_then(|recorded| pick(&recorded.notification))
            .ok_or_else(|| DebuggerError::UnknownEvent(uuid.to_string()))
    }

    async fn resend_input(
        &self,
        uuid: &str,
        view_model: &ViewModelHandle<I, E, S>,
    ) -> Result<(), DebuggerError> {
        let input = self.find(uuid, |notification| notification.input().cloned())?;
        view_model
            .send(input)
            .await
            .map_err(|_| DebuggerError::ViewModelClosed)
    }

    async fn restore_state(
        &self,
        uuid: &str,
        view_model: &ViewModelHandle<I, E, S>,
    ) -> Result<(), DebuggerError> {
        let state = self.find(uuid, |notification| match notification {
            BallastNotification::StateChanged(state) => Some(state.clone()),
            _ => None,
        })?;
        view_model
            .restore_state(state)
            .await
            .map_err(|_| DebuggerError::ViewModelClosed)
    }

    async fn replace_state(
        &self,
        content_type: &str,
        content: &str,
        view_model: &ViewModelHandle<I, E, S>,
    ) -> Result<(), DebuggerError> {
        let state = self.adapter.deserialize_state(content_type, content)?;
        view_model
            .restore_state(state)
            .await
            .map_err(|_| DebuggerError::ViewModelClosed)
    }
}

// ============================================================================
// Connection
// ============================================================================

impl DebuggerConnection {
    /// The id carried by every event from the paired interceptor.
    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    /// Wait for the next event. `None` once the interceptor is gone.
    pub async fn next_event(&mut self) -> Option<BallastDebuggerEvent> {
        self.events.recv().await
    }

    /// The next event, if one is already waiting.
    pub fn try_next_event(&mut self) -> Option<BallastDebuggerEvent> {
        self.events.try_recv().ok()
    }

    /// Forward an action decoded from the client.
    pub fn send_action(&self, action: BallastDebuggerAction) -> Result<(), DebuggerError> {
        self.actions
            .send(action)
            .map_err(|_| DebuggerError::Disconnected)
    }

    /// Build and forward an action for `view_model_name` on this connection.
    pub fn request(
        &self,
        view_model_name: impl Into<String>,
        payload: DebuggerActionPayload,
    ) -> Result<(), DebuggerError> {
        self.send_action(BallastDebuggerAction {
            connection_id: self.connection_id.clone(),
            view_model_name: view_model_name.into(),
            payload,
        })
    }
}
