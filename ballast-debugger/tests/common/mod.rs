#![allow(dead_code)]

use ballast::{
    BoxError, FifoInputStrategy, InputHandler, InputHandlerScope, NoOpLogger, ViewModel,
};
use ballast_debugger::{
    BallastDebuggerEvent, DebuggerConnection, DebuggerInterceptor, JsonDebuggerAdapter,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Test Contract
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CounterInput {
    Increment,
    Announce(String),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CounterState {
    pub count: u32,
}

pub type CounterViewModel = ViewModel<CounterInput, String, CounterState>;

pub struct CounterHandler;

impl InputHandler<CounterInput, String, CounterState> for CounterHandler {
    async fn handle_input(
        &self,
        input: CounterInput,
        scope: &mut InputHandlerScope<CounterInput, String, CounterState>,
    ) -> Result<(), BoxError> {
        match input {
            CounterInput::Increment => scope.update_state(|s| CounterState { count: s.count + 1 }),
            CounterInput::Announce(message) => scope.post_event(message).await?,
        }
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// A running "Counter" ViewModel reporting to the returned connection.
pub fn start_debugged(history_capacity: usize) -> (CounterViewModel, DebuggerConnection) {
    let (debugger, connection) =
        DebuggerInterceptor::with_history_capacity(JsonDebuggerAdapter, history_capacity);
    let view_model = ViewModel::builder(CounterState::default(), CounterHandler)
        .name("Counter")
        .input_strategy(FifoInputStrategy)
        .interceptor(debugger)
        .logger(NoOpLogger)
        .build();
    view_model.start();
    (view_model, connection)
}

/// Every event up to and including the first one of `kind`.
pub async fn events_until(
    connection: &mut DebuggerConnection,
    kind: &str,
) -> Vec<BallastDebuggerEvent> {
    let mut events = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(event) = connection.next_event().await {
            let done = event.kind() == kind;
            events.push(event);
            if done {
                break;
            }
        }
    })
    .await
    .expect("timed out waiting for a debugger event");
    events
}

/// Wait until the state satisfies `predicate`.
pub async fn wait_for_state(
    view_model: &CounterViewModel,
    predicate: impl FnMut(&CounterState) -> bool,
) {
    let mut states = view_model.observe_states();
    tokio::time::timeout(Duration::from_secs(5), states.wait_for(predicate))
        .await
        .expect("timed out waiting for the state")
        .expect("state channel closed");
}
