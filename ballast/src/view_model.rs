//! # ViewModel
//!
//! The owning handle of a running MVI coordinator, and the cloneable
//! [`ViewModelHandle`] given to interceptors and other collaborators.
//!
//! ```text
//! ViewModel::builder(..).build()   start()          shut_down_gracefully()
//!          │                         │                      │
//!          ▼                         ▼                      ▼
//!       Created ──────────▶ Started ──▶ Running ──▶ ShuttingDown ──▶ Closed
//!                                                                    ▲
//!                         shut_down() / drop ────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let view_model = ViewModel::builder(0_u32, Counter).build();
//! view_model.start();
//!
//! view_model.send(CounterInput::Increment).await?;
//! let completion = view_model
//!     .send_and_await_completion(CounterInput::Increment)
//!     .await?;
//! assert_eq!(completion, InputCompletion::Handled);
//!
//! view_model.shut_down_gracefully(Duration::from_secs(1)).await;
//! ```

use crate::{
    config::{ViewModelBuilder, ViewModelConfiguration},
    coordinator::Coordinator,
    handler::InputHandler,
    strategy::{InputCompletion, InputStrategy, LifoInputStrategy},
};
use ballast_core::{BallastLogger, Message, SendError, Status};
use std::{future::Future, sync::Arc, time::Duration};
use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
};

macro_rules! producer_api {
    () => {
        /// The ViewModel's name.
        pub fn name(&self) -> &str {
            self.coordinator.name()
        }

        /// The current lifecycle status.
        pub fn status(&self) -> Status {
            self.coordinator.status()
        }

        /// A snapshot of the current state.
        pub fn current_state(&self) -> S {
            self.coordinator.current_state()
        }

        /// Subscribe to state changes.
        pub fn observe_states(&self) -> watch::Receiver<S> {
            self.coordinator.observe_states()
        }

        /// The logger configured for this ViewModel.
        pub fn logger(&self) -> &dyn BallastLogger {
            self.coordinator.logger()
        }

        /// Queue an Input, waiting for room if the strategy suspends producers.
        pub async fn send(&self, input: I) -> Result<(), SendError<I>> {
            self.coordinator.send_input(input, None).await
        }

        /// Queue an Input without waiting.
        pub fn try_send(&self, input: I) -> Result<(), SendError<I>> {
            self.coordinator.try_send_input(input)
        }

        /// Queue an Input and wait until its invocation ends.
        ///
        /// Reports [`InputCompletion::Cancelled`] when the invocation was
        /// cancelled, dropped from a full queue, or never ran because the
        /// ViewModel shut down.
        pub async fn send_and_await_completion(
            &self,
            input: I,
        ) -> Result<InputCompletion, SendError<I>> {
            let (deferred, completion) = oneshot::channel();
            self.coordinator.send_input(input, Some(deferred)).await?;
            Ok(completion.await.unwrap_or(InputCompletion::Cancelled))
        }

        /// Queue a replacement of the whole state.
        ///
        /// It is applied in queue order, after the Inputs queued before it
        /// have been taken by the strategy.
        pub async fn restore_state(&self, state: S) -> Result<(), SendError<S>> {
            self.coordinator.restore_state(state).await
        }

        /// Finish queued work within `grace`, then close.
        pub async fn shut_down_gracefully(&self, grace: Duration) {
            self.coordinator.shut_down_gracefully(grace).await;
        }
    };
}

/// A running (or ready to run) ViewModel.
///
/// Dropping the `ViewModel` shuts it down immediately.
pub struct ViewModel<I: Message, E: Message, S: Message> {
    coordinator: Arc<Coordinator<I, E, S>>,
}

impl<I: Message, E: Message, S: Message> ViewModel<I, E, S> {
    /// Start configuring a ViewModel with its initial state and Input handler.
    pub fn builder(
        initial_state: S,
        input_handler: impl InputHandler<I, E, S>,
    ) -> ViewModelBuilder<I, E, S, LifoInputStrategy> {
        ViewModelBuilder::new(initial_state, input_handler)
    }

    /// Build a ViewModel in the `Created` state.
    pub fn from_configuration<T: InputStrategy>(config: ViewModelConfiguration<I, E, S, T>) -> Self {
        Self {
            coordinator: Coordinator::new(config),
        }
    }

    /// Spawn the Input loop, Event loop and interceptors.
    ///
    /// Inputs sent before `start` are buffered. Returns `false` if the
    /// ViewModel had already been started or shut down.
    pub fn start(&self) -> bool {
        self.coordinator.start()
    }

    /// Cancel everything now, rolling back in-flight work where the strategy
    /// does so.
    pub fn shut_down(&self) {
        self.coordinator.shut_down();
    }

    /// A cloneable handle to this ViewModel.
    pub fn handle(&self) -> ViewModelHandle<I, E, S> {
        ViewModelHandle::new(self.coordinator.clone())
    }

    /// Number of side jobs still running.
    pub fn running_side_jobs(&self) -> usize {
        self.coordinator.running_side_jobs()
    }

    producer_api!();
}

impl<I: Message, E: Message, S: Message> Drop for ViewModel<I, E, S> {
    fn drop(&mut self) {
        self.coordinator.shut_down();
    }
}

/// A cloneable reference to a ViewModel.
///
/// Handles do not keep the ViewModel alive in the lifecycle sense: once the
/// owning [`ViewModel`] is dropped or shut down, sends are rejected.
pub struct ViewModelHandle<I: Message, E: Message, S: Message> {
    coordinator: Arc<Coordinator<I, E, S>>,
}

impl<I: Message, E: Message, S: Message> Clone for ViewModelHandle<I, E, S> {
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
        }
    }
}

impl<I: Message, E: Message, S: Message> ViewModelHandle<I, E, S> {
    pub(crate) fn new(coordinator: Arc<Coordinator<I, E, S>>) -> Self {
        Self { coordinator }
    }

    /// Run `task` on the interceptor dispatcher until it finishes or the
    /// ViewModel shuts down, whichever comes first.
    pub fn spawn<F>(&self, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.coordinator.cancellation_token();
        self.coordinator
            .dispatchers()
            .interceptor
            .spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = task => {}
                }
            })
    }

    /// Whether the ViewModel has been shut down.
    pub fn is_cancelled(&self) -> bool {
        self.coordinator.is_cancelled()
    }

    /// Wait until the ViewModel has been shut down.
    pub async fn cancelled(&self) {
        self.coordinator.cancellation_token().cancelled().await;
    }

    producer_api!();
}

impl<I: Message, E: Message, S: Message> std::fmt::Debug for ViewModelHandle<I, E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewModelHandle")
            .field("name", &self.coordinator.name())
            .field("status", &self.coordinator.status())
            .finish()
    }
}
