//! Error types for Ballast.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`GuardianError`] - Misuse of the handler scope (programmer errors)
//! - [`HandlerError`] - A handler body or side job did not complete normally
//! - [`SendError`] - A value could not be delivered to a ViewModel queue

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A violation of the Input handler usage contract.
///
/// These indicate bugs in handler code, not runtime data errors. They are
/// raised at the offending call so the mistake surfaces during development.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardianError {
    /// State access, state update, event posting or `no_op` happened after a
    /// side job was posted in the same invocation.
    #[error("Side-Jobs must be the last statements of the InputHandler")]
    SideJobsMustBeLast,

    /// The invocation finished without a primary action.
    #[error(
        "Input was not handled properly. To ensure you're following the MVI model properly, \
         make sure the handler reads or updates the state, posts an event, or calls `no_op()`, \
         and that any background work is executed in a `side_job` block."
    )]
    NotHandledProperly,

    /// The scope was used after the invocation finished.
    #[error("This InputHandlerScope has already been closed")]
    Closed,

    /// A parallel invocation touched the state more than once.
    #[error(
        "ParallelInputStrategy requires that inputs only access or update the state at most \
         once as a safeguard against race conditions."
    )]
    StateAccessedMoreThanOnce,
}

/// The reason a handler invocation or side job failed.
///
/// Notifications carry this behind an `Arc` so they remain cheap to clone.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The handler returned an error.
    #[error(transparent)]
    Failed(BoxError),

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),

    /// The handler broke the scope usage contract.
    #[error(transparent)]
    Guardian(#[from] GuardianError),
}

impl From<BoxError> for HandlerError {
    fn from(err: BoxError) -> Self {
        HandlerError::Failed(err)
    }
}

impl HandlerError {
    /// Build a [`HandlerError::Panicked`] from a caught unwind payload.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic payload".to_string()
        };
        HandlerError::Panicked(message)
    }
}

/// A value could not be sent into a ViewModel queue.
///
/// The rejected value is handed back to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError<T> {
    /// The ViewModel is shutting down or closed.
    #[error("the ViewModel is no longer accepting values")]
    Closed(T),

    /// The queue is at capacity and the caller chose not to wait.
    #[error("the ViewModel queue is full")]
    Full(T),
}

impl<T> SendError<T> {
    /// Recover the value that could not be sent.
    pub fn into_inner(self) -> T {
        match self {
            SendError::Closed(value) | SendError::Full(value) => value,
        }
    }
}
