//! # Ballast
//!
//! An MVI (Model-View-Intent) ViewModel runtime for Tokio.
//!
//! A ViewModel owns one immutable State, accepts Inputs from any number of
//! producers, and runs them through a user-supplied [`InputHandler`] under a
//! pluggable [`InputStrategy`]. Handlers emit Events for one-shot effects and
//! launch keyed side jobs for background work. Every step is reported to
//! interceptors as a [`BallastNotification`].
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ ViewModel / ViewModelHandle   (producer API, lifecycle)     │
//! ├────────────────────────────────────────────────────────────┤
//! │ Coordinator                                                │
//! │   Input queue ─▶ InputStrategy ─▶ InputHandler + Guardian   │
//! │   Event queue ─▶ EventHandler (always FIFO)                 │
//! │   Side jobs (keyed, restartable)                            │
//! ├────────────────────────────────────────────────────────────┤
//! │ Interceptors  (one ordered lane each)                       │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Strategies
//!
//! | Strategy | When to use |
//! |----------|-------------|
//! | [`LifoInputStrategy`] (default) | UIs: the newest Input cancels stale work |
//! | [`FifoInputStrategy`] | Background work where nothing may be dropped |
//! | [`ParallelInputStrategy`] | Independent Inputs that each touch state once |
//!
//! # Example
//!
//! ```rust,ignore
//! use ballast::prelude::*;
//!
//! #[derive(Debug, Clone)]
//! enum Input { Increment, Reset }
//!
//! struct Counter;
//!
//! impl InputHandler<Input, (), u32> for Counter {
//!     async fn handle_input(
//!         &self,
//!         input: Input,
//!         scope: &mut InputHandlerScope<Input, (), u32>,
//!     ) -> Result<(), BoxError> {
//!         match input {
//!             Input::Increment => scope.update_state(|n| n + 1),
//!             Input::Reset => scope.update_state(|_| 0),
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let view_model = ViewModel::builder(0, Counter).build();
//! view_model.start();
//! view_model.send(Input::Increment).await?;
//! ```
//!
//! # Error Handling
//!
//! Handler errors and panics never take the ViewModel down: they are
//! reported as `InputHandlerError`, `EventHandlerError` or `SideJobError` and
//! processing continues. Misusing the handler scope is a programming error;
//! it stops the invocation at the offending call and is reported as an
//! `InputHandlerError` carrying [`HandlerError::Guardian`].

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod config;
mod coordinator;
mod handler;
mod scope;
mod side_job;
mod state;
mod view_model;

pub mod interceptor;
pub mod queue;
pub mod strategy;
pub mod testing;

pub use ballast_core as core;

// Re-exports
pub use ballast_core::{
    BallastLogger, BallastNotification, BoxError, DefaultGuardian, GuardianError, HandlerError,
    InputStrategyGuardian, Message, NoOpLogger, ParallelGuardian, PrintlnLogger, RestartState,
    SendError, Status, TracingLogger,
};
pub use config::{DEFAULT_VIEW_MODEL_NAME, Dispatchers, ViewModelBuilder, ViewModelConfiguration};
pub use handler::{DynEventHandler, DynInputHandler, EventHandler, InputHandler, NoOpEventHandler};
pub use interceptor::{DynInterceptor, Interceptor};
pub use queue::{BufferOverflow, DEFAULT_BUFFER_CAPACITY};
pub use scope::{EventHandlerScope, InputHandlerScope, SideJobScope};
pub use strategy::{
    FifoInputStrategy, InputCompletion, InputStrategy, LifoInputStrategy, ParallelInputStrategy,
};
pub use view_model::{ViewModel, ViewModelHandle};

/// Convenient imports for implementing and running ViewModels.
pub mod prelude {
    pub use crate::interceptor::{
        BootstrapInterceptor, DelegatingInterceptor, FilterInterceptor, KillSwitch,
        KillSwitchTrigger, LoggingInterceptor,
    };
    pub use crate::{
        BallastNotification, BoxError, EventHandler, EventHandlerScope, FifoInputStrategy,
        InputCompletion, InputHandler, InputHandlerScope, Interceptor, LifoInputStrategy,
        ParallelInputStrategy, RestartState, SendError, SideJobScope, Status, ViewModel,
        ViewModelHandle,
    };
}
