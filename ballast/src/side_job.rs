//! Keyed side-job bookkeeping.
//!
//! A side job is launched as its own task, parented to the ViewModel's
//! cancellation token rather than to the invocation that posted it. One task
//! is tracked per key; posting a key again cancels the running task, waits
//! for it to wind down, and launches the replacement with the next
//! [`RestartState`]. The restart count survives completed runs.

use crate::coordinator::Coordinator;
use crate::scope::SideJobScope;
use ballast_core::{BallastNotification, BoxError, HandlerError, Message, RestartState};
use futures::{FutureExt, future::BoxFuture};
use parking_lot::Mutex;
use std::{collections::HashMap, future::Future, panic::AssertUnwindSafe, sync::Arc};
use tokio::task::JoinHandle;

type SideJobBlock<I, E, S> =
    Box<dyn FnOnce(SideJobScope<I, E, S>) -> BoxFuture<'static, Result<(), BoxError>> + Send>;

/// A side job posted during an invocation, waiting for the invocation to succeed.
pub(crate) struct PendingSideJob<I: Message, E: Message, S: Message> {
    key: String,
    block: SideJobBlock<I, E, S>,
}

impl<I: Message, E: Message, S: Message> PendingSideJob<I, E, S> {
    pub(crate) fn new<F, Fut>(key: String, block: F) -> Self
    where
        F: FnOnce(SideJobScope<I, E, S>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self {
            key,
            block: Box::new(move |scope| Box::pin(block(scope))),
        }
    }
}

struct SideJobEntry {
    restart_state: RestartState,
    task: Option<JoinHandle<()>>,
}

/// Running side jobs by key.
#[derive(Default)]
pub(crate) struct SideJobs {
    jobs: Mutex<HashMap<String, SideJobEntry>>,
}

impl SideJobs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of side-job tasks that have not finished yet.
    pub(crate) fn running(&self) -> usize {
        self.jobs
            .lock()
            .values()
            .filter(|entry| entry.task.as_ref().is_some_and(|task| !task.is_finished()))
            .count()
    }

    /// Cancel the task under `key` and wait for it to stop.
    pub(crate) async fn cancel(&self, key: &str) {
        let task = self
            .jobs
            .lock()
            .get_mut(key)
            .and_then(|entry| entry.task.take());
        if let Some(task) = task {
            task.abort();
            let _ = task.await;
        }
    }

    /// Cancel every task and wait for all of them to stop.
    pub(crate) async fn cancel_all(&self) {
        let tasks: Vec<_> = self
            .jobs
            .lock()
            .values_mut()
            .filter_map(|entry| entry.task.take())
            .collect();
        for task in &tasks {
            task.abort();
        }
        for task in tasks {
            let _ = task.await;
        }
    }
}

/// Launch `pending`, replacing whatever runs under its key.
pub(crate) async fn launch<I: Message, E: Message, S: Message>(
    coordinator: &Arc<Coordinator<I, E, S>>,
    pending: PendingSideJob<I, E, S>,
) {
    let PendingSideJob { key, block } = pending;
    let side_jobs = coordinator.side_jobs();

    side_jobs.cancel(&key).await;

    let restart_state = side_jobs
        .jobs
        .lock()
        .get(&key)
        .map_or(RestartState::Initial, |entry| entry.restart_state.next());

    coordinator.notify(BallastNotification::SideJobStarted(key.clone(), restart_state));

    let scope = SideJobScope::new(coordinator.clone(), key.clone(), restart_state);
    let job = block(scope);
    let mut report = SideJobReport {
        coordinator: coordinator.clone(),
        key: key.clone(),
        restart_state,
        finished: false,
    };
    let token = coordinator.cancellation_token();
    let task = coordinator.dispatchers().side_job.spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            outcome = AssertUnwindSafe(job).catch_unwind() => {
                let outcome = match outcome {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(err)) => Err(HandlerError::Failed(err)),
                    Err(panic) => Err(HandlerError::from_panic(panic)),
                };
                report.finish(outcome);
            }
        }
    });

    let replaced = side_jobs.jobs.lock().insert(
        key,
        SideJobEntry {
            restart_state,
            task: Some(task),
        },
    );
    // A concurrent launch under the same key may have slipped in.
    if let Some(task) = replaced.and_then(|entry| entry.task) {
        task.abort();
    }
}

/// Reports how a side-job task ended; reports cancellation when dropped unfinished.
struct SideJobReport<I: Message, E: Message, S: Message> {
    coordinator: Arc<Coordinator<I, E, S>>,
    key: String,
    restart_state: RestartState,
    finished: bool,
}

impl<I: Message, E: Message, S: Message> SideJobReport<I, E, S> {
    fn finish(&mut self, outcome: Result<(), HandlerError>) {
        self.finished = true;
        let key = self.key.clone();
        match outcome {
            Ok(()) => self
                .coordinator
                .notify(BallastNotification::SideJobCompleted(key, self.restart_state)),
            Err(err) => {
                self.coordinator.logger().error(&err);
                self.coordinator.notify(BallastNotification::SideJobError(
                    key,
                    self.restart_state,
                    Arc::new(err),
                ));
            }
        }
    }
}

impl<I: Message, E: Message, S: Message> Drop for SideJobReport<I, E, S> {
    fn drop(&mut self) {
        if !self.finished {
            self.coordinator.notify(BallastNotification::SideJobCancelled(
                self.key.clone(),
                self.restart_state,
            ));
        }
    }
}
