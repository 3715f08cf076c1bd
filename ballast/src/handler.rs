//! # Handlers
//!
//! The user-supplied halves of a ViewModel contract.
//!
//! - [`InputHandler`] is invoked once per accepted Input, with an
//!   [`InputHandlerScope`] through which it reads and updates the state, posts
//!   Events and launches side jobs.
//! - [`EventHandler`] is invoked once per emitted Event, strictly in order,
//!   and may post further Inputs back into the ViewModel.
//!
//! Both traits use native `async fn` for static dispatch and have an
//! object-safe `Dyn*` twin implemented automatically, which is what the
//! coordinator stores.
//!
//! # Example
//!
//! ```rust,ignore
//! struct Counter;
//!
//! impl InputHandler<CounterInput, CounterEvent, u32> for Counter {
//!     async fn handle_input(
//!         &self,
//!         input: CounterInput,
//!         scope: &mut InputHandlerScope<CounterInput, CounterEvent, u32>,
//!     ) -> Result<(), BoxError> {
//!         match input {
//!             CounterInput::Increment => scope.update_state(|n| n + 1),
//!             CounterInput::Done => scope.post_event(CounterEvent::Finished).await?,
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use crate::scope::{EventHandlerScope, InputHandlerScope};
use ballast_core::{BoxError, Message};
use futures::future::BoxFuture;
use std::future::Future;

/// Handles the Inputs of a ViewModel.
///
/// Every invocation must perform exactly one primary action through the
/// scope (read the state, update the state, post an Event, or `no_op`), and
/// may end with one or more side jobs. Breaking that rule stops the
/// invocation and is reported as an `InputHandlerError`.
///
/// Returning an error is contained: it is reported to interceptors and the
/// ViewModel moves on to the next Input.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `InputHandler<{I}, {E}, {S}>`",
    label = "missing `InputHandler` implementation",
    note = "Input handlers must implement `handle_input` for the ViewModel's Input, Event and State types."
)]
pub trait InputHandler<I: Message, E: Message, S: Message>: Send + Sync + 'static {
    /// Handle one Input.
    fn handle_input(
        &self,
        input: I,
        scope: &mut InputHandlerScope<I, E, S>,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`InputHandler`].
pub trait DynInputHandler<I: Message, E: Message, S: Message>: Send + Sync + 'static {
    /// Handle one Input (dynamic dispatch version).
    fn handle_input_dyn<'a>(
        &'a self,
        input: I,
        scope: &'a mut InputHandlerScope<I, E, S>,
    ) -> BoxFuture<'a, Result<(), BoxError>>;
}

impl<I: Message, E: Message, S: Message, T: InputHandler<I, E, S>> DynInputHandler<I, E, S> for T {
    fn handle_input_dyn<'a>(
        &'a self,
        input: I,
        scope: &'a mut InputHandlerScope<I, E, S>,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(self.handle_input(input, scope))
    }
}

/// Handles the Events of a ViewModel.
///
/// Events are delivered one at a time, in the order they were posted,
/// regardless of the Input strategy.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `EventHandler<{I}, {E}, {S}>`",
    label = "missing `EventHandler` implementation",
    note = "Event handlers must implement `handle_event` for the ViewModel's Input, Event and State types."
)]
pub trait EventHandler<I: Message, E: Message, S: Message>: Send + Sync + 'static {
    /// Handle one Event.
    fn handle_event(
        &self,
        event: E,
        scope: &mut EventHandlerScope<I, E, S>,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`EventHandler`].
pub trait DynEventHandler<I: Message, E: Message, S: Message>: Send + Sync + 'static {
    /// Handle one Event (dynamic dispatch version).
    fn handle_event_dyn<'a>(
        &'a self,
        event: E,
        scope: &'a mut EventHandlerScope<I, E, S>,
    ) -> BoxFuture<'a, Result<(), BoxError>>;
}

impl<I: Message, E: Message, S: Message, T: EventHandler<I, E, S>> DynEventHandler<I, E, S> for T {
    fn handle_event_dyn<'a>(
        &'a self,
        event: E,
        scope: &'a mut EventHandlerScope<I, E, S>,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(self.handle_event(event, scope))
    }
}

/// An [`EventHandler`] that ignores every Event.
///
/// Used when a ViewModel is built without an event handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventHandler;

impl<I: Message, E: Message, S: Message> EventHandler<I, E, S> for NoOpEventHandler {
    async fn handle_event(
        &self,
        _event: E,
        _scope: &mut EventHandlerScope<I, E, S>,
    ) -> Result<(), BoxError> {
        Ok(())
    }
}
