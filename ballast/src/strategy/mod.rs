//! # Input strategies
//!
//! An input strategy decides how queued Inputs are scheduled onto the Input
//! handler: ordering, concurrency, and what happens to in-flight work when
//! something newer arrives.
//!
//! | Strategy | Ordering | Concurrency | Preempts | Rollback | Full queue |
//! |----------|----------|-------------|----------|----------|------------|
//! | [`LifoInputStrategy`] | newest wins | one at a time | yes | yes | drop oldest |
//! | [`FifoInputStrategy`] | arrival order | one at a time | no | yes | producer waits |
//! | [`ParallelInputStrategy`] | none | unbounded | no | no | producer waits |

mod fifo;
mod lifo;
mod parallel;

pub use fifo::FifoInputStrategy;
pub use lifo::LifoInputStrategy;
pub use parallel::ParallelInputStrategy;

use crate::queue::{BoundedQueue, BufferOverflow};
use ballast_core::InputStrategyGuardian;
use std::{future::Future, sync::Arc};
use tokio::{runtime::Handle, sync::oneshot};

/// How a single Input invocation ended, reported to
/// [`send_and_await_completion`](crate::ViewModel::send_and_await_completion).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCompletion {
    /// The handler completed normally.
    Handled,
    /// The handler returned an error, panicked, or broke the scope contract.
    Failed,
    /// The invocation was cancelled before it could complete.
    Cancelled,
}

/// A unit of work on the Input queue.
#[derive(Debug)]
pub enum Queued<I, S> {
    /// Run the Input handler for `input`.
    HandleInput {
        /// The Input to handle.
        input: I,
        /// Signalled once the invocation ends.
        deferred: Option<oneshot::Sender<InputCompletion>>,
    },
    /// Atomically replace the state.
    RestoreState(S),
    /// Stop processing once everything queued before this marker is done.
    ShutDownGracefully,
}

impl<I, S> Queued<I, S> {
    /// Whether this item is the graceful-shutdown marker.
    pub fn is_shut_down(&self) -> bool {
        matches!(self, Queued::ShutDownGracefully)
    }
}

/// A scheduling policy for queued Inputs.
///
/// The strategy owns the processing loop: it pulls items from the queue and
/// hands each one to `accept`, which runs the whole invocation (guardian,
/// handler, notifications, rollback). The future returned by `accept` may be
/// dropped at any await point; dropping it is how an invocation is cancelled.
///
/// # Implementing
///
/// Loops must stop pulling when they see [`Queued::ShutDownGracefully`], let
/// in-flight invocations finish, and then return.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `InputStrategy`",
    label = "missing `InputStrategy` implementation",
    note = "Use `LifoInputStrategy`, `FifoInputStrategy` or `ParallelInputStrategy`, or implement the trait."
)]
pub trait InputStrategy: Clone + Send + Sync + 'static {
    /// Human-readable name, used in logs.
    fn name(&self) -> &'static str;

    /// Overflow policy for the Input queue.
    fn buffer_overflow(&self) -> BufferOverflow;

    /// Whether a cancelled invocation restores the state it started with.
    fn rollback_on_cancellation(&self) -> bool;

    /// A fresh guardian for one invocation.
    fn create_guardian(&self) -> Box<dyn InputStrategyGuardian>;

    /// Run the processing loop until the queue closes or a shutdown marker arrives.
    ///
    /// `runtime` is where concurrent invocations are spawned.
    fn process_inputs<I, S, F, Fut>(
        self,
        queue: Arc<BoundedQueue<Queued<I, S>>>,
        runtime: Handle,
        accept: F,
    ) -> impl Future<Output = ()> + Send + 'static
    where
        I: Send + 'static,
        S: Send + 'static,
        F: Fn(Queued<I, S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static;
}
