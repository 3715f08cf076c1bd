use super::{InputStrategy, Queued};
use crate::queue::{BoundedQueue, BufferOverflow};
use ballast_core::{DefaultGuardian, InputStrategyGuardian};
use std::{future::Future, sync::Arc};
use tokio::{runtime::Handle, task::JoinSet};

/// The newest Input wins.
///
/// When an Input arrives while another is still being handled, the in-flight
/// invocation is cancelled (and its state changes rolled back) before the new
/// one starts. Producers never wait: a full queue discards its oldest entry.
///
/// This is the default strategy, tuned for responsive UIs where stale work
/// must never hold up the latest intent.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifoInputStrategy;

impl InputStrategy for LifoInputStrategy {
    fn name(&self) -> &'static str {
        "LIFO"
    }

    fn buffer_overflow(&self) -> BufferOverflow {
        BufferOverflow::DropOldest
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
            // Holds at most one invocation; dropping the set aborts it.
            let mut in_flight = JoinSet::new();

            while let Some(item) = queue.recv().await {
                if item.is_shut_down() {
                    break;
                }

                in_flight.abort_all();
                while in_flight.join_next().await.is_some() {}

                in_flight.spawn_on(accept(item), &runtime);
            }

            while in_flight.join_next().await.is_some() {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_newer_item_cancels_in_flight_item() {
        let queue = Arc::new(BoundedQueue::new(8, BufferOverflow::DropOldest));
        let finished = Arc::new(Mutex::new(Vec::new()));

        let recorder = finished.clone();
        let looping = tokio::spawn(LifoInputStrategy.process_inputs(
            queue.clone(),
            Handle::current(),
            move |item: Queued<&'static str, ()>| {
                let recorder = recorder.clone();
                async move {
                    if let Queued::HandleInput { input, .. } = item {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        recorder.lock().push(input);
                    }
                }
            },
        ));

        queue
            .send(Queued::HandleInput {
                input: "first",
                deferred: None,
            })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        queue
            .send(Queued::HandleInput {
                input: "second",
                deferred: None,
            })
            .await
            .unwrap();
        queue.close_with(Queued::ShutDownGracefully).unwrap();

        looping.await.unwrap();
        assert_eq!(*finished.lock(), vec!["second"]);
    }
}
