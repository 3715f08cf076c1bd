use super::{InputStrategy, Queued};
use crate::queue::{BoundedQueue, BufferOverflow};
use ballast_core::{InputStrategyGuardian, ParallelGuardian};
use std::{future::Future, sync::Arc};
use tokio::{runtime::Handle, task::JoinSet};

/// Every Input gets its own concurrent invocation.
///
/// There is no ordering between Inputs and no mutual exclusion around the
/// state. To bound the races this allows, each invocation may read or write
/// the state at most once (see [`ParallelGuardian`]).
///
/// Cancelled invocations are **not** rolled back: an Input cancelled by a
/// shutdown may leave the state half-updated. This is an accepted trade-off of
/// the strategy, not something the runtime tries to repair.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelInputStrategy;

impl InputStrategy for ParallelInputStrategy {
    fn name(&self) -> &'static str {
        "Parallel"
    }

    fn buffer_overflow(&self) -> BufferOverflow {
        BufferOverflow::Suspend
    }

    fn rollback_on_cancellation(&self) -> bool {
        false
    }

    fn create_guardian(&self) -> Box<dyn InputStrategyGuardian> {
        Box::new(ParallelGuardian::new())
    }

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
        Fut: Future<Output = ()> + Send + 'static,
    {
        async move {
            let mut in_flight = JoinSet::new();

            while let Some(item) = queue.recv().await {
                if item.is_shut_down() {
                    break;
                }
                in_flight.spawn_on(accept(item), &runtime);

                // Reap finished invocations so the set does not grow unbounded.
                while in_flight.try_join_next().is_some() {}
            }

            while in_flight.join_next().await.is_some() {}
        }
    }
}
