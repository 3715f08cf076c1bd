//! # Lifecycle notifications
//!
//! The closed set of things a ViewModel reports while it runs. Interceptors
//! receive these in one total order that matches the order the effects
//! actually happened in.

use crate::{
    error::HandlerError,
    status::{RestartState, Status},
};
use std::sync::Arc;

/// A single lifecycle notification emitted by a ViewModel.
#[derive(Debug, Clone)]
pub enum BallastNotification<I, E, S> {
    /// The ViewModel moved to a new lifecycle status.
    ViewModelStatusChanged(Status),

    /// An Input was placed in the queue.
    InputQueued(I),
    /// An Input was taken from the queue and is about to be handled.
    InputAccepted(I),
    /// An Input was refused because the ViewModel is not accepting inputs or
    /// the queue was full.
    InputRejected(I),
    /// An Input was discarded from a full queue to make room for a newer one.
    InputDropped(I),
    /// The Input handler completed normally.
    InputHandledSuccessfully(I),
    /// The Input handler was cancelled before completing.
    InputCancelled(I),
    /// The Input handler failed.
    InputHandlerError(I, Arc<HandlerError>),

    /// An Event was placed in the event queue.
    EventQueued(E),
    /// An Event was taken from the event queue for handling.
    EventEmitted(E),
    /// The Event handler completed normally.
    EventHandledSuccessfully(E),
    /// The Event handler failed.
    EventHandlerError(E, Arc<HandlerError>),
    /// The event loop started.
    EventProcessingStarted,
    /// The event loop stopped after draining its queue.
    EventProcessingStopped,

    /// The state was replaced.
    StateChanged(S),

    /// A side job was posted by an Input handler.
    SideJobQueued(String),
    /// A side job was launched.
    SideJobStarted(String, RestartState),
    /// A side job ran to completion.
    SideJobCompleted(String, RestartState),
    /// A side job was cancelled (restarted, explicitly cancelled, or shut down).
    SideJobCancelled(String, RestartState),
    /// A side job failed.
    SideJobError(String, RestartState, Arc<HandlerError>),

    /// An error that could not be attributed to a specific Input, Event or side job.
    UnhandledError(Arc<HandlerError>),
}

impl<I, E, S> BallastNotification<I, E, S> {
    /// A short, stable name for this kind of notification.
    pub const fn kind(&self) -> &'static str {
        match self {
            BallastNotification::ViewModelStatusChanged(_) => "ViewModelStatusChanged",
            BallastNotification::InputQueued(_) => "InputQueued",
            BallastNotification::InputAccepted(_) => "InputAccepted",
            BallastNotification::InputRejected(_) => "InputRejected",
            BallastNotification::InputDropped(_) => "InputDropped",
            BallastNotification::InputHandledSuccessfully(_) => "InputHandledSuccessfully",
            BallastNotification::InputCancelled(_) => "InputCancelled",
            BallastNotification::InputHandlerError(..) => "InputHandlerError",
            BallastNotification::EventQueued(_) => "EventQueued",
            BallastNotification::EventEmitted(_) => "EventEmitted",
            BallastNotification::EventHandledSuccessfully(_) => "EventHandledSuccessfully",
            BallastNotification::EventHandlerError(..) => "EventHandlerError",
            BallastNotification::EventProcessingStarted => "EventProcessingStarted",
            BallastNotification::EventProcessingStopped => "EventProcessingStopped",
            BallastNotification::StateChanged(_) => "StateChanged",
            BallastNotification::SideJobQueued(_) => "SideJobQueued",
            BallastNotification::SideJobStarted(..) => "SideJobStarted",
            BallastNotification::SideJobCompleted(..) => "SideJobCompleted",
            BallastNotification::SideJobCancelled(..) => "SideJobCancelled",
            BallastNotification::SideJobError(..) => "SideJobError",
            BallastNotification::UnhandledError(_) => "UnhandledError",
        }
    }

    /// The Input this notification is about, if any.
    pub fn input(&self) -> Option<&I> {
        match self {
            BallastNotification::InputQueued(input)
            | BallastNotification::InputAccepted(input)
            | BallastNotification::InputRejected(input)
            | BallastNotification::InputDropped(input)
            | BallastNotification::InputHandledSuccessfully(input)
            | BallastNotification::InputCancelled(input)
            | BallastNotification::InputHandlerError(input, _) => Some(input),
            _ => None,
        }
    }

    /// The Event this notification is about, if any.
    pub fn event(&self) -> Option<&E> {
        match self {
            BallastNotification::EventQueued(event)
            | BallastNotification::EventEmitted(event)
            | BallastNotification::EventHandledSuccessfully(event)
            | BallastNotification::EventHandlerError(event, _) => Some(event),
            _ => None,
        }
    }

    /// The side-job key this notification is about, if any.
    pub fn side_job_key(&self) -> Option<&str> {
        match self {
            BallastNotification::SideJobQueued(key)
            | BallastNotification::SideJobStarted(key, _)
            | BallastNotification::SideJobCompleted(key, _)
            | BallastNotification::SideJobCancelled(key, _)
            | BallastNotification::SideJobError(key, _, _) => Some(key),
            _ => None,
        }
    }

    /// The error carried by this notification, if any.
    pub fn error(&self) -> Option<&Arc<HandlerError>> {
        match self {
            BallastNotification::InputHandlerError(_, err)
            | BallastNotification::EventHandlerError(_, err)
            | BallastNotification::SideJobError(_, _, err)
            | BallastNotification::UnhandledError(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Notification = BallastNotification<&'static str, u32, String>;

    #[test]
    fn test_accessors_pick_the_right_payload() {
        let queued: Notification = BallastNotification::InputQueued("load");
        assert_eq!(queued.input(), Some(&"load"));
        assert_eq!(queued.event(), None);
        assert_eq!(queued.kind(), "InputQueued");

        let emitted: Notification = BallastNotification::EventEmitted(7);
        assert_eq!(emitted.event(), Some(&7));
        assert_eq!(emitted.input(), None);

        let started: Notification =
            BallastNotification::SideJobStarted("poll".into(), RestartState::Initial);
        assert_eq!(started.side_job_key(), Some("poll"));
    }

    #[test]
    fn test_error_accessor() {
        let err = Arc::new(HandlerError::Panicked("boom".into()));
        let notification: Notification = BallastNotification::UnhandledError(err.clone());
        assert!(Arc::ptr_eq(notification.error().unwrap(), &err));
        assert!(BallastNotification::<(), (), ()>::EventProcessingStarted.error().is_none());
    }
}
