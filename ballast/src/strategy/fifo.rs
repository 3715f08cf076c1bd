use super::{InputStrategy, Queued};
use crate::queue::{BoundedQueue, BufferOverflow};
use ballast_core::{DefaultGuardian, InputStrategyGuardian};
use std::{future::Future, sync::Arc};
use tokio::runtime::Handle;

/// Processes Inputs strictly one at a time, in arrival order.
///
/// Nothing is ever dropped: producers wait when the queue is full. Suited to
/// background or offline processing where every Input matters. A slow handler
/// holds up everything queued behind it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FifoInputStrategy;

impl InputStrategy for FifoInputStrategy {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn buffer_overflow(&self) -> BufferOverflow {
        BufferOverflow::Suspend
    }

    fn rollback_on_cancellation(&self) -> bool {
        true
    }

    fn create_guardian(&self) -> Box<dyn InputStrategyGuardian> {
        Box::new(DefaultGuardian::new())
    }

    fn process_inputs<I, S, F, Fut>(
        self,
        queue: Arc<BoundedQueue<Queued<I, S>>>,
        _runtime: Handle,
        accept: F,
    ) -> impl Future<Output = ()> + Send + 'static
    where
        I: Send + 'static,
        S: Send + 'static,
        F: Fn(Queued<I, S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        async move {
            while let Some(item) = queue.recv().await {
                if item.is_shut_down() {
                    break;
                }
                // Awaited inline: cancelling the loop drops the invocation too.
                accept(item).await;
            }
        }
    }
}
