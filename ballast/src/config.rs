//! # ViewModel configuration
//!
//! Everything a ViewModel needs, collected by [`ViewModelBuilder`].
//!
//! # Example
//!
//! ```rust,ignore
//! let view_model = ViewModel::builder(CounterState::default(), CounterHandler)
//!     .name("Counter")
//!     .input_strategy(FifoInputStrategy)
//!     .event_handler(CounterEvents)
//!     .interceptor(LoggingInterceptor::new())
//!     .input_capacity(16)
//!     .build();
//!
//! view_model.start();
//! ```

use crate::{
    handler::{DynEventHandler, DynInputHandler, EventHandler, InputHandler, NoOpEventHandler},
    interceptor::{DynInterceptor, Interceptor},
    queue::DEFAULT_BUFFER_CAPACITY,
    strategy::{InputStrategy, LifoInputStrategy},
    view_model::ViewModel,
};
use ballast_core::{BallastLogger, Message, TracingLogger};
use std::sync::Arc;
use tokio::runtime::{Handle, TryCurrentError};

/// Name used when none is configured.
pub const DEFAULT_VIEW_MODEL_NAME: &str = "ViewModel";

/// The runtimes a ViewModel schedules its work on.
///
/// Each concern gets an explicit [`Handle`]; there is no ambient scheduler.
#[derive(Debug, Clone)]
pub struct Dispatchers {
    /// Runs the Input loop and the invocations it spawns.
    pub input: Handle,
    /// Runs the Event loop.
    pub event: Handle,
    /// Runs side jobs.
    pub side_job: Handle,
    /// Runs interceptors and tasks spawned through a `ViewModelHandle`.
    pub interceptor: Handle,
}

impl Dispatchers {
    /// Use one runtime for everything.
    pub fn from_handle(handle: Handle) -> Self {
        Self {
            input: handle.clone(),
            event: handle.clone(),
            side_job: handle.clone(),
            interceptor: handle,
        }
    }

    /// Use the runtime the caller is running on.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime, like [`Handle::current`].
    pub fn current() -> Self {
        Self::from_handle(Handle::current())
    }

    /// Use the runtime the caller is running on, if any.
    pub fn try_current() -> Result<Self, TryCurrentError> {
        Handle::try_current().map(Self::from_handle)
    }
}

/// The complete configuration of one ViewModel.
pub struct ViewModelConfiguration<I: Message, E: Message, S: Message, T: InputStrategy> {
    /// Shows up in logs and debugger connections.
    pub name: String,
    /// The state before any Input is handled.
    pub initial_state: S,
    /// Handles Inputs.
    pub input_handler: Arc<dyn DynInputHandler<I, E, S>>,
    /// Handles Events.
    pub event_handler: Arc<dyn DynEventHandler<I, E, S>>,
    /// Schedules Inputs.
    pub input_strategy: T,
    /// Observers of the notification stream, in registration order.
    pub interceptors: Vec<Arc<dyn DynInterceptor<I, E, S>>>,
    /// Where the runtime and handlers log to.
    pub logger: Arc<dyn BallastLogger>,
    /// Capacity of the Input queue.
    pub input_capacity: usize,
    /// Capacity of the Event queue.
    pub event_capacity: usize,
    /// Where work is scheduled; `None` means the runtime current at build time.
    pub dispatchers: Option<Dispatchers>,
}

/// Builder for a [`ViewModel`].
///
/// Created by [`ViewModel::builder`]. The Input strategy is part of the
/// builder's type so strategies keep their static dispatch.
pub struct ViewModelBuilder<I: Message, E: Message, S: Message, T: InputStrategy = LifoInputStrategy> {
    config: ViewModelConfiguration<I, E, S, T>,
    logger: Option<Arc<dyn BallastLogger>>,
}

impl<I: Message, E: Message, S: Message> ViewModelBuilder<I, E, S, LifoInputStrategy> {
    pub(crate) fn new(initial_state: S, input_handler: impl InputHandler<I, E, S>) -> Self {
        Self {
            config: ViewModelConfiguration {
                name: DEFAULT_VIEW_MODEL_NAME.to_string(),
                initial_state,
                input_handler: Arc::new(input_handler),
                event_handler: Arc::new(NoOpEventHandler),
                input_strategy: LifoInputStrategy,
                interceptors: Vec::new(),
                logger: Arc::new(TracingLogger::new(DEFAULT_VIEW_MODEL_NAME)),
                input_capacity: DEFAULT_BUFFER_CAPACITY,
                event_capacity: DEFAULT_BUFFER_CAPACITY,
                dispatchers: None,
            },
            logger: None,
        }
    }
}

impl<I: Message, E: Message, S: Message, T: InputStrategy> ViewModelBuilder<I, E, S, T> {
    /// Name the ViewModel.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Replace the Input strategy (LIFO by default).
    pub fn input_strategy<U: InputStrategy>(self, strategy: U) -> ViewModelBuilder<I, E, S, U> {
        let ViewModelConfiguration {
            name,
            initial_state,
            input_handler,
            event_handler,
            input_strategy: _,
            interceptors,
            logger,
            input_capacity,
            event_capacity,
            dispatchers,
        } = self.config;
        ViewModelBuilder {
            config: ViewModelConfiguration {
                name,
                initial_state,
                input_handler,
                event_handler,
                input_strategy: strategy,
                interceptors,
                logger,
                input_capacity,
                event_capacity,
                dispatchers,
            },
            logger: self.logger,
        }
    }

    /// Handle Events with `handler` (Events are ignored by default).
    pub fn event_handler(mut self, handler: impl EventHandler<I, E, S>) -> Self {
        self.config.event_handler = Arc::new(handler);
        self
    }

    /// Register an interceptor.
    pub fn interceptor(mut self, interceptor: impl Interceptor<I, E, S>) -> Self {
        self.config.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Register an already shared interceptor.
    pub fn shared_interceptor(mut self, interceptor: Arc<dyn DynInterceptor<I, E, S>>) -> Self {
        self.config.interceptors.push(interceptor);
        self
    }

    /// Log through `logger` (a [`TracingLogger`] tagged with the name by default).
    pub fn logger(mut self, logger: impl BallastLogger) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Capacity of the Input queue (64 by default).
    pub fn input_capacity(mut self, capacity: usize) -> Self {
        self.config.input_capacity = capacity;
        self
    }

    /// Capacity of the Event queue (64 by default).
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    /// Schedule work on `dispatchers` instead of the current runtime.
    pub fn dispatchers(mut self, dispatchers: Dispatchers) -> Self {
        self.config.dispatchers = Some(dispatchers);
        self
    }

    /// Finish configuring without building.
    pub fn configuration(self) -> ViewModelConfiguration<I, E, S, T> {
        let mut config = self.config;
        config.logger = match self.logger {
            Some(logger) => logger,
            None => Arc::new(TracingLogger::new(config.name.clone())),
        };
        config
    }

    /// Build the ViewModel in the `Created` state.
    ///
    /// # Panics
    ///
    /// Panics when no [`Dispatchers`] were configured and this is called
    /// outside of a Tokio runtime.
    pub fn build(self) -> ViewModel<I, E, S> {
        ViewModel::from_configuration(self.configuration())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scope::InputHandlerScope, strategy::FifoInputStrategy};
    use ballast_core::{BoxError, NoOpLogger};

    struct Ignore;

    impl InputHandler<u8, u8, u8> for Ignore {
        async fn handle_input(
            &self,
            _input: u8,
            scope: &mut InputHandlerScope<u8, u8, u8>,
        ) -> Result<(), BoxError> {
            scope.no_op();
            Ok(())
        }
    }

    #[test]
    fn test_defaults() {
        let config = ViewModelBuilder::new(0_u8, Ignore).configuration();
        assert_eq!(config.name, DEFAULT_VIEW_MODEL_NAME);
        assert_eq!(config.input_capacity, DEFAULT_BUFFER_CAPACITY);
        assert_eq!(config.event_capacity, DEFAULT_BUFFER_CAPACITY);
        assert_eq!(config.input_strategy.name(), "LIFO");
        assert!(config.interceptors.is_empty());
        assert!(config.dispatchers.is_none());
    }

    #[test]
    fn test_strategy_change_keeps_other_settings() {
        let config = ViewModelBuilder::new(0_u8, Ignore)
            .name("Counter")
            .input_capacity(3)
            .logger(NoOpLogger)
            .input_strategy(FifoInputStrategy)
            .configuration();
        assert_eq!(config.name, "Counter");
        assert_eq!(config.input_capacity, 3);
        assert_eq!(config.input_strategy.name(), "FIFO");
    }
}
