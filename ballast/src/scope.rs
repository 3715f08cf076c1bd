//! # Handler scopes
//!
//! The capabilities a handler receives while it runs.
//!
//! - [`InputHandlerScope`] wraps exactly one Input invocation. Each operation
//!   asks the invocation's guardian first, then performs its effect, then the
//!   effect is reported to interceptors.
//! - [`EventHandlerScope`] lets an Event handler post Inputs back.
//! - [`SideJobScope`] is handed to a side job when it launches.
//!
//! # Cancellation
//!
//! An invocation is cancelled by dropping its future. The scope notices in
//! its `Drop` impl: if the invocation had not finished, the state it started
//! with is restored (when the strategy rolls back) and `InputCancelled` is
//! reported.

use crate::coordinator::Coordinator;
use crate::side_job::PendingSideJob;
use ballast_core::{
    BallastLogger, BallastNotification, BoxError, GuardianError, InputStrategyGuardian, Message,
    RestartState, SendError,
};
use std::{future::Future, sync::Arc};

#[derive(Debug, Clone, Copy)]
enum Check {
    StateAccess,
    StateUpdate,
    PostEvent,
    NoOp,
    SideJob,
}

/// The scope of a single Input handler invocation.
pub struct InputHandlerScope<I: Message, E: Message, S: Message> {
    coordinator: Arc<Coordinator<I, E, S>>,
    input: I,
    guardian: Box<dyn InputStrategyGuardian>,
    snapshot: Option<S>,
    state_updated: bool,
    side_jobs: Vec<PendingSideJob<I, E, S>>,
    violation: Option<GuardianError>,
    finished: bool,
}

impl<I: Message, E: Message, S: Message> InputHandlerScope<I, E, S> {
    pub(crate) fn new(coordinator: Arc<Coordinator<I, E, S>>, input: I) -> Self {
        let guardian = coordinator.create_guardian();
        let snapshot = coordinator
            .rollback_on_cancellation()
            .then(|| coordinator.current_state());
        Self {
            coordinator,
            input,
            guardian,
            snapshot,
            state_updated: false,
            side_jobs: Vec::new(),
            violation: None,
            finished: false,
        }
    }

    fn guard(&mut self, check: Check) {
        let guardian = &mut self.guardian;
        let outcome = match check {
            Check::StateAccess => guardian.check_state_access(),
            Check::StateUpdate => guardian.check_state_update(),
            Check::PostEvent => guardian.check_post_event(),
            Check::NoOp => guardian.check_no_op(),
            Check::SideJob => guardian.check_side_job(),
        };
        if let Err(violation) = outcome {
            self.violation = Some(violation);
            // Unwinds out of the handler; the coordinator reports it.
            panic!("{violation}");
        }
    }

    /// Read the current state.
    pub fn get_current_state(&mut self) -> S {
        self.guard(Check::StateAccess);
        self.coordinator.current_state()
    }

    /// Replace the state with `f(current)`.
    pub fn update_state(&mut self, f: impl FnOnce(S) -> S) {
        self.update_state_and_get(f);
    }

    /// Replace the state with `f(current)` and return the new state.
    pub fn update_state_and_get(&mut self, f: impl FnOnce(S) -> S) -> S {
        self.guard(Check::StateUpdate);
        self.state_updated = true;
        self.coordinator.update_state(f).1
    }

    /// Replace the state with `f(current)` and return the previous state.
    pub fn get_and_update_state(&mut self, f: impl FnOnce(S) -> S) -> S {
        self.guard(Check::StateUpdate);
        self.state_updated = true;
        self.coordinator.update_state(f).0
    }

    /// Queue an Event for the Event handler.
    ///
    /// Waits while the event queue is full.
    pub async fn post_event(&mut self, event: E) -> Result<(), SendError<E>> {
        self.guard(Check::PostEvent);
        self.coordinator.post_event(event).await
    }

    /// Explicitly do nothing for this Input.
    pub fn no_op(&mut self) {
        self.guard(Check::NoOp);
    }

    /// Post a side job under `key`.
    ///
    /// The job is launched once this invocation completes successfully. If a
    /// job is already running under the same key it is cancelled first, and
    /// the new one sees [`RestartState::Restarted`]. Side jobs must be the
    /// last statements of the handler.
    pub fn side_job<F, Fut>(&mut self, key: impl Into<String>, block: F)
    where
        F: FnOnce(SideJobScope<I, E, S>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.guard(Check::SideJob);
        let key = key.into();
        self.coordinator
            .notify(BallastNotification::SideJobQueued(key.clone()));
        self.side_jobs.push(PendingSideJob::new(key, block));
    }

    /// Cancel the side job running under `key`, if any.
    ///
    /// Counts as the invocation's primary action, like [`no_op`](Self::no_op).
    pub async fn cancel_side_job(&mut self, key: &str) {
        self.guard(Check::NoOp);
        self.coordinator.cancel_side_job(key).await;
    }

    /// The logger configured for this ViewModel.
    pub fn logger(&self) -> &dyn BallastLogger {
        self.coordinator.logger()
    }

    /// The Input being handled.
    pub fn input(&self) -> &I {
        &self.input
    }

    /// Verify the invocation was handled properly.
    pub(crate) fn close(&mut self) -> Result<(), GuardianError> {
        self.guardian.close()
    }

    /// The guardian violation that stopped the handler, if that is what happened.
    pub(crate) fn take_violation(&mut self) -> Option<GuardianError> {
        self.violation.take()
    }

    /// Mark the invocation as ended (no rollback) and hand back its side jobs.
    pub(crate) fn finish(&mut self) -> Vec<PendingSideJob<I, E, S>> {
        self.finished = true;
        std::mem::take(&mut self.side_jobs)
    }
}

impl<I: Message, E: Message, S: Message> Drop for InputHandlerScope<I, E, S> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if self.state_updated {
            if let Some(snapshot) = self.snapshot.take() {
                self.coordinator.update_state(|_| snapshot);
            }
        }
        self.coordinator
            .notify(BallastNotification::InputCancelled(self.input.clone()));
    }
}

/// The scope of a single Event handler invocation.
pub struct EventHandlerScope<I: Message, E: Message, S: Message> {
    coordinator: Arc<Coordinator<I, E, S>>,
}

impl<I: Message, E: Message, S: Message> EventHandlerScope<I, E, S> {
    pub(crate) fn new(coordinator: Arc<Coordinator<I, E, S>>) -> Self {
        Self { coordinator }
    }

    /// Queue an Input for the Input handler.
    pub async fn post_input(&self, input: I) -> Result<(), SendError<I>> {
        self.coordinator.send_input(input, None).await
    }

    /// The name of the ViewModel handling this Event.
    pub fn view_model_name(&self) -> &str {
        self.coordinator.name()
    }

    /// The logger configured for this ViewModel.
    pub fn logger(&self) -> &dyn BallastLogger {
        self.coordinator.logger()
    }
}

/// The scope handed to a running side job.
///
/// Side jobs outlive the invocation that posted them and run until they
/// finish, are restarted under the same key, or the ViewModel shuts down.
pub struct SideJobScope<I: Message, E: Message, S: Message> {
    coordinator: Arc<Coordinator<I, E, S>>,
    key: String,
    restart_state: RestartState,
    state_when_started: S,
}

impl<I: Message, E: Message, S: Message> SideJobScope<I, E, S> {
    pub(crate) fn new(
        coordinator: Arc<Coordinator<I, E, S>>,
        key: String,
        restart_state: RestartState,
    ) -> Self {
        let state_when_started = coordinator.current_state();
        Self {
            coordinator,
            key,
            restart_state,
            state_when_started,
        }
    }

    /// The key this job was posted under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether this is the first run under the key.
    pub fn restart_state(&self) -> RestartState {
        self.restart_state
    }

    /// The state at the moment the job launched.
    pub fn current_state_when_started(&self) -> &S {
        &self.state_when_started
    }

    /// Queue an Input for the Input handler.
    pub async fn post_input(&self, input: I) -> Result<(), SendError<I>> {
        self.coordinator.send_input(input, None).await
    }

    /// Queue an Event for the Event handler.
    pub async fn post_event(&self, event: E) -> Result<(), SendError<E>> {
        self.coordinator.post_event(event).await
    }

    /// Whether the ViewModel has been shut down.
    pub fn is_cancelled(&self) -> bool {
        self.coordinator.is_cancelled()
    }

    /// The logger configured for this ViewModel.
    pub fn logger(&self) -> &dyn BallastLogger {
        self.coordinator.logger()
    }
}
