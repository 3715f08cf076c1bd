//! Testing utilities for Ballast.
//!
//! This module provides utilities to make testing ViewModels easier.
//!
//! # Features
//!
//! - [`RecordingInterceptor`]: An interceptor that records every notification
//! - [`ViewModelTest`]: A given-state / running-inputs scenario harness
//! - [`TestResults`]: What a scenario produced, with convenience queries

use crate::{
    handler::{EventHandler, InputHandler},
    interceptor::Interceptor,
    strategy::{FifoInputStrategy, InputCompletion},
    view_model::{ViewModel, ViewModelHandle},
};
use ballast_core::{BallastNotification, HandlerError, Message, NoOpLogger, RestartState};
use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};
use tokio::sync::Notify;

// ============================================================================
// Recording Interceptor
// ============================================================================

/// An interceptor that records every notification it receives.
///
/// Clones share the same recording.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingInterceptor::new();
/// let view_model = ViewModel::builder(0, Counter)
///     .interceptor(recorder.clone())
///     .build();
///
/// // ... drive the ViewModel ...
///
/// recorder.wait_for(|seen| seen.len() >= 5).await;
/// assert_eq!(recorder.kinds()[0], "ViewModelStatusChanged");
/// ```
pub struct RecordingInterceptor<I: Message, E: Message, S: Message> {
    notifications: Arc<Mutex<Vec<BallastNotification<I, E, S>>>>,
    recorded: Arc<Notify>,
}

impl<I: Message, E: Message, S: Message> RecordingInterceptor<I, E, S> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self {
            notifications: Arc::new(Mutex::new(Vec::new())),
            recorded: Arc::new(Notify::new()),
        }
    }

    /// Get a clone of the recorded notifications.
    pub fn notifications(&self) -> Vec<BallastNotification<I, E, S>> {
        self.notifications.lock().clone()
    }

    /// The [`kind`](BallastNotification::kind) of every recorded notification, in order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.notifications
            .lock()
            .iter()
            .map(BallastNotification::kind)
            .collect()
    }

    /// Get the number of recorded notifications.
    pub fn count(&self) -> usize {
        self.notifications.lock().len()
    }

    /// Clear all recorded notifications.
    pub fn clear(&self) {
        self.notifications.lock().clear();
    }

    /// Wait until `predicate` holds for the notifications recorded so far.
    pub async fn wait_for(&self, predicate: impl Fn(&[BallastNotification<I, E, S>]) -> bool) {
        loop {
            let recorded = self.recorded.notified();
            tokio::pin!(recorded);
            recorded.as_mut().enable();

            if predicate(&self.notifications.lock()) {
                return;
            }
            recorded.await;
        }
    }
}

impl<I: Message, E: Message, S: Message> Default for RecordingInterceptor<I, E, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Message, E: Message, S: Message> Clone for RecordingInterceptor<I, E, S> {
    fn clone(&self) -> Self {
        Self {
            notifications: self.notifications.clone(),
            recorded: self.recorded.clone(),
        }
    }
}

impl<I: Message, E: Message, S: Message> Interceptor<I, E, S> for RecordingInterceptor<I, E, S> {
    async fn on_notification(
        &self,
        notification: &BallastNotification<I, E, S>,
        _view_model: &ViewModelHandle<I, E, S>,
    ) {
        self.notifications.lock().push(notification.clone());
        self.recorded.notify_waiters();
    }
}

// ============================================================================
// Scenario harness
// ============================================================================

/// Runs a list of Inputs through a fresh ViewModel and collects what happened.
///
/// Inputs are processed with the FIFO strategy, each one awaited to
/// completion before the next is sent. After the last Input the harness waits
/// (up to the configured timeout) for side jobs to finish, then shuts the
/// ViewModel down gracefully.
///
/// # Example
///
/// ```rust,ignore
/// let results = ViewModelTest::new(0_u32, Counter)
///     .given(5)
///     .running(CounterInput::Increment)
///     .running(CounterInput::Increment)
///     .run()
///     .await;
///
/// assert_eq!(results.final_state, 7);
/// assert_eq!(results.inputs_handled(), 2);
/// ```
pub struct ViewModelTest<I: Message, E: Message, S: Message, H, EH = crate::handler::NoOpEventHandler> {
    name: String,
    initial_state: S,
    input_handler: H,
    event_handler: EH,
    inputs: Vec<I>,
    side_job_timeout: Duration,
    _events: std::marker::PhantomData<fn() -> E>,
}

impl<I, E, S, H> ViewModelTest<I, E, S, H>
where
    I: Message,
    E: Message,
    S: Message,
    H: InputHandler<I, E, S>,
{
    /// Start a scenario for `input_handler`, beginning at `initial_state`.
    pub fn new(initial_state: S, input_handler: H) -> Self {
        Self {
            name: "test".to_string(),
            initial_state,
            input_handler,
            event_handler: crate::handler::NoOpEventHandler,
            inputs: Vec::new(),
            side_job_timeout: Duration::from_secs(5),
            _events: std::marker::PhantomData,
        }
    }
}

impl<I, E, S, H, EH> ViewModelTest<I, E, S, H, EH>
where
    I: Message,
    E: Message,
    S: Message,
    H: InputHandler<I, E, S>,
    EH: EventHandler<I, E, S>,
{
    /// Name the scenario (used as the ViewModel name).
    pub fn scenario(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Start from `state` instead of the initial state.
    pub fn given(mut self, state: S) -> Self {
        self.initial_state = state;
        self
    }

    /// Send `input` after the ones already listed.
    pub fn running(mut self, input: I) -> Self {
        self.inputs.push(input);
        self
    }

    /// How long to wait for side jobs before shutting down (5 seconds by default).
    pub fn side_job_timeout(mut self, timeout: Duration) -> Self {
        self.side_job_timeout = timeout;
        self
    }

    /// Handle Events with `event_handler`.
    pub fn event_handler<EH2: EventHandler<I, E, S>>(
        self,
        event_handler: EH2,
    ) -> ViewModelTest<I, E, S, H, EH2> {
        ViewModelTest {
            name: self.name,
            initial_state: self.initial_state,
            input_handler: self.input_handler,
            event_handler,
            inputs: self.inputs,
            side_job_timeout: self.side_job_timeout,
            _events: std::marker::PhantomData,
        }
    }

    /// Run the scenario.
    pub async fn run(self) -> TestResults<I, E, S> {
        let recorder = RecordingInterceptor::new();
        let view_model = ViewModel::builder(self.initial_state, self.input_handler)
            .name(self.name)
            .input_strategy(FifoInputStrategy)
            .event_handler(self.event_handler)
            .interceptor(recorder.clone())
            .logger(NoOpLogger)
            .build();
        view_model.start();

        let mut completions = Vec::with_capacity(self.inputs.len());
        for input in self.inputs {
            let completion = view_model
                .send_and_await_completion(input)
                .await
                .unwrap_or(InputCompletion::Cancelled);
            completions.push(completion);
        }

        let _ = tokio::time::timeout(self.side_job_timeout, async {
            while view_model.running_side_jobs() > 0 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await;

        view_model.shut_down_gracefully(Duration::from_secs(1)).await;

        TestResults {
            final_state: view_model.current_state(),
            completions,
            notifications: recorder.notifications(),
        }
    }
}

/// Everything a [`ViewModelTest`] scenario produced.
#[derive(Debug, Clone)]
pub struct TestResults<I, E, S> {
    /// The state after shutdown.
    pub final_state: S,
    /// How each Input ended, in the order they were sent.
    pub completions: Vec<InputCompletion>,
    /// The full notification stream.
    pub notifications: Vec<BallastNotification<I, E, S>>,
}

impl<I: Message, E: Message, S: Message> TestResults<I, E, S> {
    /// Number of Inputs handled successfully.
    pub fn inputs_handled(&self) -> usize {
        self.notifications
            .iter()
            .filter(|n| matches!(n, BallastNotification::InputHandledSuccessfully(_)))
            .count()
    }

    /// Every state published, in order.
    pub fn states(&self) -> Vec<S> {
        self.notifications
            .iter()
            .filter_map(|n| match n {
                BallastNotification::StateChanged(state) => Some(state.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every Event emitted to the Event handler, in order.
    pub fn events(&self) -> Vec<E> {
        self.notifications
            .iter()
            .filter_map(|n| match n {
                BallastNotification::EventEmitted(event) => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    /// Errors raised by Input handlers, with their Input.
    pub fn input_errors(&self) -> Vec<(I, Arc<HandlerError>)> {
        self.notifications
            .iter()
            .filter_map(|n| match n {
                BallastNotification::InputHandlerError(input, err) => {
                    Some((input.clone(), err.clone()))
                }
                _ => None,
            })
            .collect()
    }

    /// Side jobs that ran to completion, with their restart state.
    pub fn side_jobs_completed(&self) -> Vec<(String, RestartState)> {
        self.notifications
            .iter()
            .filter_map(|n| match n {
                BallastNotification::SideJobCompleted(key, restart) => {
                    Some((key.clone(), *restart))
                }
                _ => None,
            })
            .collect()
    }
}
