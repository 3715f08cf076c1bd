//! # Coordinator (the ViewModel core)
//!
//! Owns the state cell, the Input and Event queues, the side jobs and the
//! notification stream of one ViewModel, and runs its loops.
//!
//! ```text
//!                ┌──────────── Input queue ────────────┐
//! producers ───▶ │ HandleInput / RestoreState / ShutDown │ ──▶ InputStrategy ──▶ InputHandler
//!                └──────────────────────────────────────┘                        │
//!                ┌──────────── Event queue ─────────────┐ ◀── post_event ─────────┤
//!                │                  E                   │ ──▶ EventHandler (FIFO) │
//!                └──────────────────────────────────────┘                        ▼
//!                                                                          side jobs
//! ```
//!
//! All notifications go through one unbounded channel to a dispatcher task
//! that fans them out to one lane per interceptor. Notifications about an
//! enqueue are sent under the queue lock and `StateChanged` under the state
//! lock, so the stream order matches the order effects happened.

use crate::{
    config::{Dispatchers, ViewModelConfiguration},
    handler::{DynEventHandler, DynInputHandler},
    interceptor::DynInterceptor,
    queue::{BoundedQueue, BufferOverflow, QueueError},
    scope::{EventHandlerScope, InputHandlerScope},
    side_job::{self, SideJobs},
    state::StateCell,
    strategy::{InputCompletion, InputStrategy, Queued},
    view_model::ViewModelHandle,
};
use ballast_core::{
    BallastLogger, BallastNotification, HandlerError, InputStrategyGuardian, Message, SendError,
    Status,
};
use futures::{FutureExt, future::BoxFuture};
use parking_lot::Mutex;
use std::{
    future::Future,
    panic::AssertUnwindSafe,
    sync::{
        Arc,
        atomic::{AtomicU8, Ordering},
    },
    time::Duration,
};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::{JoinHandle, JoinSet},
    time::{Instant, timeout_at},
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

type GuardianFactory = Box<dyn Fn() -> Box<dyn InputStrategyGuardian> + Send + Sync>;
type Lane<I, E, S> = mpsc::WeakUnboundedSender<BallastNotification<I, E, S>>;
type InputLoop<I, E, S> = Box<dyn FnOnce(Arc<Coordinator<I, E, S>>) -> BoxFuture<'static, ()> + Send>;

pub(crate) enum Dispatch<I, E, S> {
    Notify(BallastNotification<I, E, S>),
    Stop,
}

/// Everything `start` consumes.
struct Launch<I: Message, E: Message, S: Message> {
    input_loop: InputLoop<I, E, S>,
    interceptors: Vec<Arc<dyn DynInterceptor<I, E, S>>>,
    notifications: mpsc::UnboundedReceiver<Dispatch<I, E, S>>,
}

#[derive(Default)]
struct Tasks {
    input_loop: Option<JoinHandle<()>>,
    event_loop: Option<JoinHandle<()>>,
    dispatcher: Option<JoinHandle<()>>,
}

pub(crate) struct Coordinator<I: Message, E: Message, S: Message> {
    name: String,
    state: StateCell<S>,
    inputs: Arc<BoundedQueue<Queued<I, S>>>,
    events: BoundedQueue<E>,
    side_jobs: SideJobs,
    notifications: mpsc::UnboundedSender<Dispatch<I, E, S>>,
    status: AtomicU8,
    token: CancellationToken,
    closed: CancellationToken,
    invocations: TaskTracker,
    dispatchers: Dispatchers,
    logger: Arc<dyn BallastLogger>,
    input_handler: Arc<dyn DynInputHandler<I, E, S>>,
    event_handler: Arc<dyn DynEventHandler<I, E, S>>,
    strategy_name: &'static str,
    rollback_on_cancellation: bool,
    guardians: GuardianFactory,
    launch: Mutex<Option<Launch<I, E, S>>>,
    tasks: Mutex<Tasks>,
}

impl<I: Message, E: Message, S: Message> Coordinator<I, E, S> {
    pub(crate) fn new<T: InputStrategy>(config: ViewModelConfiguration<I, E, S, T>) -> Arc<Self> {
        let ViewModelConfiguration {
            name,
            initial_state,
            input_handler,
            event_handler,
            input_strategy,
            interceptors,
            logger,
            input_capacity,
            event_capacity,
            dispatchers,
        } = config;

        let (notifications, receiver) = mpsc::unbounded_channel();
        let guardian_strategy = input_strategy.clone();
        let loop_strategy = input_strategy.clone();
        let input_loop: InputLoop<I, E, S> = Box::new(move |coordinator| {
            let queue = coordinator.inputs.clone();
            let runtime = coordinator.dispatchers.input.clone();
            Box::pin(loop_strategy.process_inputs(queue, runtime, move |item| {
                coordinator
                    .invocations
                    .track_future(coordinator.clone().process(item))
            }))
        });

        let coordinator = Arc::new(Self {
            name,
            state: StateCell::new(initial_state),
            inputs: Arc::new(BoundedQueue::new(
                input_capacity,
                input_strategy.buffer_overflow(),
            )),
            events: BoundedQueue::new(event_capacity, BufferOverflow::Suspend),
            side_jobs: SideJobs::new(),
            notifications,
            status: AtomicU8::new(Status::Created as u8),
            token: CancellationToken::new(),
            closed: CancellationToken::new(),
            invocations: TaskTracker::new(),
            dispatchers: dispatchers.unwrap_or_else(Dispatchers::current),
            logger,
            input_handler,
            event_handler,
            strategy_name: input_strategy.name(),
            rollback_on_cancellation: input_strategy.rollback_on_cancellation(),
            guardians: Box::new(move || guardian_strategy.create_guardian()),
            launch: Mutex::new(Some(Launch {
                input_loop,
                interceptors,
                notifications: receiver,
            })),
            tasks: Mutex::new(Tasks::default()),
        });
        coordinator.notify(BallastNotification::ViewModelStatusChanged(Status::Created));
        coordinator
    }

    // ====================================================================
    // Accessors
    // ====================================================================

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn logger(&self) -> &dyn BallastLogger {
        self.logger.as_ref()
    }

    pub(crate) fn dispatchers(&self) -> &Dispatchers {
        &self.dispatchers
    }

    pub(crate) fn side_jobs(&self) -> &SideJobs {
        &self.side_jobs
    }

    pub(crate) fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn status(&self) -> Status {
        Status::from_u8(self.status.load(Ordering::SeqCst))
    }

    pub(crate) fn create_guardian(&self) -> Box<dyn InputStrategyGuardian> {
        (self.guardians)()
    }

    pub(crate) fn rollback_on_cancellation(&self) -> bool {
        self.rollback_on_cancellation
    }

    pub(crate) fn current_state(&self) -> S {
        self.state.get()
    }

    pub(crate) fn observe_states(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }

    pub(crate) fn running_side_jobs(&self) -> usize {
        self.side_jobs.running()
    }

    // ====================================================================
    // Effects
    // ====================================================================

    pub(crate) fn notify(&self, notification: BallastNotification<I, E, S>) {
        // Closed once the dispatcher is gone; late notifications have no audience.
        let _ = self.notifications.send(Dispatch::Notify(notification));
    }

    fn set_status(&self, status: Status) {
        let previous = Status::from_u8(self.status.swap(status as u8, Ordering::SeqCst));
        if previous != status {
            self.logger.debug(&format!("{} is now {status}", self.name));
            self.notify(BallastNotification::ViewModelStatusChanged(status));
        }
    }

    /// Replace the state with `f(current)`, returning the previous and new values.
    pub(crate) fn update_state(&self, f: impl FnOnce(S) -> S) -> (S, S) {
        self.state.update(f, |next| {
            self.notify(BallastNotification::StateChanged(next.clone()));
        })
    }

    fn input_enqueued(&self, item: &Queued<I, S>, displaced: Option<&Queued<I, S>>) {
        if let Some(Queued::HandleInput { input, .. }) = displaced {
            self.logger
                .debug(&format!("dropped input to make room: {input:?}"));
            self.notify(BallastNotification::InputDropped(input.clone()));
        }
        if let Queued::HandleInput { input, .. } = item {
            self.notify(BallastNotification::InputQueued(input.clone()));
        }
    }

    fn reject_input(&self, input: &I) {
        self.logger.debug(&format!("rejected input: {input:?}"));
        self.notify(BallastNotification::InputRejected(input.clone()));
    }

    /// Queue an Input, waiting for room when the strategy suspends producers.
    pub(crate) async fn send_input(
        &self,
        input: I,
        deferred: Option<oneshot::Sender<InputCompletion>>,
    ) -> Result<(), SendError<I>> {
        if !self.status().is_accepting() {
            self.reject_input(&input);
            return Err(SendError::Closed(input));
        }
        let echo = input.clone();
        let outcome = self
            .inputs
            .send_with(Queued::HandleInput { input, deferred }, |item, displaced| {
                self.input_enqueued(item, displaced)
            })
            .await;
        self.settle_input(echo, outcome.map(drop))
    }

    /// Queue an Input without waiting.
    pub(crate) fn try_send_input(&self, input: I) -> Result<(), SendError<I>> {
        if !self.status().is_accepting() {
            self.reject_input(&input);
            return Err(SendError::Closed(input));
        }
        let echo = input.clone();
        let outcome = self.inputs.try_send_with(
            Queued::HandleInput {
                input,
                deferred: None,
            },
            |item, displaced| self.input_enqueued(item, displaced),
        );
        self.settle_input(echo, outcome.map(drop))
    }

    fn settle_input(
        &self,
        input: I,
        outcome: Result<(), QueueError<Queued<I, S>>>,
    ) -> Result<(), SendError<I>> {
        match outcome {
            Ok(()) => Ok(()),
            Err(QueueError::Closed(_)) => {
                self.reject_input(&input);
                Err(SendError::Closed(input))
            }
            Err(QueueError::Full(_)) => {
                self.reject_input(&input);
                Err(SendError::Full(input))
            }
        }
    }

    /// Queue a state replacement behind the Inputs already queued.
    pub(crate) async fn restore_state(&self, state: S) -> Result<(), SendError<S>> {
        if !self.status().is_accepting() {
            return Err(SendError::Closed(state));
        }
        let echo = state.clone();
        match self
            .inputs
            .send_with(Queued::RestoreState(state), |item, displaced| {
                self.input_enqueued(item, displaced)
            })
            .await
        {
            Ok(_) => Ok(()),
            Err(QueueError::Closed(_)) => Err(SendError::Closed(echo)),
            Err(QueueError::Full(_)) => Err(SendError::Full(echo)),
        }
    }

    /// Queue an Event, waiting while the event queue is full.
    pub(crate) async fn post_event(&self, event: E) -> Result<(), SendError<E>> {
        let outcome = self
            .events
            .send_with(event, |event, _| {
                self.notify(BallastNotification::EventQueued(event.clone()));
            })
            .await;
        match outcome {
            Ok(_) => Ok(()),
            Err(QueueError::Closed(event)) => {
                self.logger
                    .debug(&format!("event posted after shutdown: {event:?}"));
                Err(SendError::Closed(event))
            }
            Err(QueueError::Full(event)) => Err(SendError::Full(event)),
        }
    }

    pub(crate) async fn cancel_side_job(&self, key: &str) {
        self.side_jobs.cancel(key).await;
    }

    // ====================================================================
    // Processing
    // ====================================================================

    async fn process(self: Arc<Self>, item: Queued<I, S>) {
        match item {
            Queued::HandleInput { input, deferred } => {
                self.handle_input(input, deferred).await;
            }
            Queued::RestoreState(state) => {
                self.update_state(|_| state);
            }
            Queued::ShutDownGracefully => {}
        }
    }

    /// Run one Input handler invocation to the end.
    ///
    /// Dropping the returned future cancels the invocation; the scope then
    /// rolls back and reports the cancellation. Once the handler has returned
    /// successfully the outcome is settled and no longer cancellable.
    async fn handle_input(
        self: &Arc<Self>,
        input: I,
        deferred: Option<oneshot::Sender<InputCompletion>>,
    ) {
        self.notify(BallastNotification::InputAccepted(input.clone()));

        let mut scope = InputHandlerScope::new(self.clone(), input.clone());
        let outcome = AssertUnwindSafe(
            self.input_handler
                .handle_input_dyn(input.clone(), &mut scope),
        )
        .catch_unwind()
        .await;

        let result = match outcome {
            Ok(Ok(())) => scope.close().map_err(HandlerError::from),
            Ok(Err(err)) => Err(HandlerError::Failed(err)),
            Err(panic) => Err(match scope.take_violation() {
                Some(violation) => HandlerError::Guardian(violation),
                None => HandlerError::from_panic(panic),
            }),
        };
        let side_jobs = scope.finish();
        drop(scope);

        match result {
            Ok(()) if side_jobs.is_empty() => self.input_handled(input, deferred),
            Ok(()) => {
                // Runs as its own task: aborting this invocation must not lose launches.
                let coordinator = self.clone();
                let settled = self.invocations.spawn_on(
                    async move {
                        for pending in side_jobs {
                            side_job::launch(&coordinator, pending).await;
                        }
                        coordinator.input_handled(input, deferred);
                    },
                    &self.dispatchers.side_job,
                );
                let _ = settled.await;
            }
            Err(err) => {
                self.logger.error(&err);
                self.notify(BallastNotification::InputHandlerError(input, Arc::new(err)));
                if let Some(deferred) = deferred {
                    let _ = deferred.send(InputCompletion::Failed);
                }
            }
        }
    }

    fn input_handled(&self, input: I, deferred: Option<oneshot::Sender<InputCompletion>>) {
        self.notify(BallastNotification::InputHandledSuccessfully(input));
        if let Some(deferred) = deferred {
            let _ = deferred.send(InputCompletion::Handled);
        }
    }

    async fn run_events(self: Arc<Self>) {
        self.notify(BallastNotification::EventProcessingStarted);
        while let Some(event) = self.events.recv().await {
            self.notify(BallastNotification::EventEmitted(event.clone()));

            let mut scope = EventHandlerScope::new(self.clone());
            let outcome = AssertUnwindSafe(
                self.event_handler
                    .handle_event_dyn(event.clone(), &mut scope),
            )
            .catch_unwind()
            .await;

            let err = match outcome {
                Ok(Ok(())) => {
                    self.notify(BallastNotification::EventHandledSuccessfully(event));
                    continue;
                }
                Ok(Err(err)) => HandlerError::Failed(err),
                Err(panic) => HandlerError::from_panic(panic),
            };
            self.logger.error(&err);
            self.notify(BallastNotification::EventHandlerError(event, Arc::new(err)));
        }
        self.notify(BallastNotification::EventProcessingStopped);
    }

    // ====================================================================
    // Lifecycle
    // ====================================================================

    /// Spawn the loops and start the interceptors. Returns `false` when the
    /// ViewModel was already started or shut down.
    pub(crate) fn start(self: &Arc<Self>) -> bool {
        if self
            .status
            .compare_exchange(
                Status::Created as u8,
                Status::Started as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            return false;
        }
        let Some(Launch {
            input_loop,
            interceptors,
            notifications,
        }) = self.launch.lock().take()
        else {
            return false;
        };

        let view_model = ViewModelHandle::new(self.clone());
        // Not tied to the token: it runs until told to stop, so the last
        // notifications of a shutdown still reach the interceptors.
        let dispatcher = self.dispatchers.interceptor.spawn(dispatch(
            notifications,
            interceptors.clone(),
            view_model.clone(),
            self.dispatchers.interceptor.clone(),
        ));
        let input_loop = self
            .dispatchers
            .input
            .spawn(cancel_with(self.token.clone(), input_loop(self.clone())));
        let event_loop = self
            .dispatchers
            .event
            .spawn(cancel_with(self.token.clone(), self.clone().run_events()));
        *self.tasks.lock() = Tasks {
            input_loop: Some(input_loop),
            event_loop: Some(event_loop),
            dispatcher: Some(dispatcher),
        };

        self.logger.info(&format!(
            "{} started with the {} input strategy",
            self.name, self.strategy_name
        ));
        self.notify(BallastNotification::ViewModelStatusChanged(Status::Started));

        for interceptor in &interceptors {
            (**interceptor).start_dyn(&view_model);
        }
        // A shutdown may have raced the interceptors' start.
        if self
            .status
            .compare_exchange(
                Status::Started as u8,
                Status::Running as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
        {
            self.notify(BallastNotification::ViewModelStatusChanged(Status::Running));
        }
        true
    }

    /// Finish queued work within `grace`, then close everything.
    ///
    /// 1. Stop accepting Inputs and let the Input loop drain up to the deadline.
    /// 2. Report anything still queued as rejected.
    /// 3. Drain the Event queue.
    /// 4. Cancel side jobs.
    /// 5. Deliver the remaining notifications, then cancel the ViewModel scope.
    pub(crate) async fn shut_down_gracefully(self: &Arc<Self>, grace: Duration) {
        let previous = self
            .status
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |status| {
                Status::from_u8(status)
                    .is_accepting()
                    .then_some(Status::ShuttingDown as u8)
            });
        match previous.map(Status::from_u8) {
            Err(_) => {
                // Someone else is already shutting down.
                self.closed.cancelled().await;
                return;
            }
            Ok(Status::Created) => {
                self.notify(BallastNotification::ViewModelStatusChanged(Status::ShuttingDown));
                let _ = self.close_now().await;
                return;
            }
            Ok(_) => {}
        }
        self.notify(BallastNotification::ViewModelStatusChanged(Status::ShuttingDown));
        self.logger
            .info(&format!("{} shutting down gracefully", self.name));

        let deadline = Instant::now() + grace;
        let _ = self.inputs.close_with(Queued::ShutDownGracefully);
        let tasks = std::mem::take(&mut *self.tasks.lock());

        if let Some(task) = tasks.input_loop {
            join_until(task, deadline).await;
        }
        self.invocations.close();
        self.invocations.wait().await;
        self.reject_remaining_inputs();

        self.events.close();
        if let Some(task) = tasks.event_loop {
            join_until(task, deadline).await;
        }

        self.side_jobs.cancel_all().await;
        self.set_status(Status::Closed);

        let _ = self.notifications.send(Dispatch::Stop);
        if let Some(task) = tasks.dispatcher {
            join_until(task, Instant::now() + grace).await;
        }
        self.token.cancel();
        self.closed.cancel();
    }

    /// Cancel everything now. Queued Inputs are rejected, in-flight
    /// invocations are cancelled (and rolled back where the strategy does so)
    /// and side jobs are cancelled.
    ///
    /// The status is `Closed` on return. Interceptors still receive every one
    /// of those effects, followed by the `Closed` status change, from a
    /// finishing task.
    pub(crate) fn shut_down(self: &Arc<Self>) {
        let previous = self
            .status
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |status| {
                Status::from_u8(status)
                    .is_accepting()
                    .then_some(Status::Closed as u8)
            });
        match previous.map_err(Status::from_u8) {
            Ok(_) => drop(self.close_now()),
            // The graceful shutdown in progress stops at its next step and finishes the job.
            Err(Status::ShuttingDown) => self.token.cancel(),
            Err(_) => {}
        }
    }

    fn close_now(self: &Arc<Self>) -> JoinHandle<()> {
        self.status.store(Status::Closed as u8, Ordering::SeqCst);
        self.logger.info(&format!("{} shutting down now", self.name));

        self.inputs.close();
        self.events.close();
        self.reject_remaining_inputs();
        self.token.cancel();

        let tasks = std::mem::take(&mut *self.tasks.lock());
        let coordinator = self.clone();
        self.dispatchers.interceptor.spawn(async move {
            // Cancelled invocations report (and roll back) as their scopes drop.
            for task in [tasks.input_loop, tasks.event_loop].into_iter().flatten() {
                let _ = task.await;
            }
            coordinator.invocations.close();
            coordinator.invocations.wait().await;
            coordinator.side_jobs.cancel_all().await;

            coordinator
                .logger
                .debug(&format!("{} is now {}", coordinator.name, Status::Closed));
            coordinator.notify(BallastNotification::ViewModelStatusChanged(Status::Closed));
            let _ = coordinator.notifications.send(Dispatch::Stop);
            if let Some(task) = tasks.dispatcher {
                let _ = task.await;
            }
            coordinator.closed.cancel();
        })
    }

    fn reject_remaining_inputs(&self) {
        for item in self.inputs.drain() {
            if let Queued::HandleInput { input, .. } = item {
                self.reject_input(&input);
            }
        }
    }
}

async fn cancel_with(token: CancellationToken, work: impl Future<Output = ()>) {
    tokio::select! {
        _ = token.cancelled() => {}
        _ = work => {}
    }
}

async fn join_until(mut task: JoinHandle<()>, deadline: Instant) {
    if timeout_at(deadline, &mut task).await.is_err() {
        task.abort();
        let _ = task.await;
    }
}

/// Fan notifications out to one lane per interceptor until told to stop.
async fn dispatch<I: Message, E: Message, S: Message>(
    mut notifications: mpsc::UnboundedReceiver<Dispatch<I, E, S>>,
    interceptors: Vec<Arc<dyn DynInterceptor<I, E, S>>>,
    view_model: ViewModelHandle<I, E, S>,
    runtime: tokio::runtime::Handle,
) {
    let (lanes, receivers): (Vec<_>, Vec<_>) = interceptors
        .iter()
        .map(|_| mpsc::unbounded_channel::<BallastNotification<I, E, S>>())
        .unzip();
    // Weak, so dropping `lanes` still ends every lane.
    let peers: Arc<[Lane<I, E, S>]> = lanes.iter().map(mpsc::UnboundedSender::downgrade).collect();

    let mut running = JoinSet::new();
    for (index, (interceptor, receiver)) in interceptors.into_iter().zip(receivers).enumerate() {
        let lane = intercept(interceptor, receiver, view_model.clone(), index, peers.clone());
        running.spawn_on(lane, &runtime);
    }

    while let Some(dispatch) = notifications.recv().await {
        match dispatch {
            Dispatch::Notify(notification) => {
                for lane in &lanes {
                    let _ = lane.send(notification.clone());
                }
            }
            Dispatch::Stop => break,
        }
    }

    drop(lanes);
    while running.join_next().await.is_some() {}
}

/// Deliver notifications to one interceptor in order.
///
/// A panicking interceptor is reported to every other lane as
/// `UnhandledError`. Panics while handling an `UnhandledError` are only
/// logged, so two failing interceptors cannot feed each other.
async fn intercept<I: Message, E: Message, S: Message>(
    interceptor: Arc<dyn DynInterceptor<I, E, S>>,
    mut notifications: mpsc::UnboundedReceiver<BallastNotification<I, E, S>>,
    view_model: ViewModelHandle<I, E, S>,
    index: usize,
    peers: Arc<[Lane<I, E, S>]>,
) {
    while let Some(notification) = notifications.recv().await {
        let delivered = AssertUnwindSafe((*interceptor).on_notification_dyn(&notification, &view_model))
            .catch_unwind()
            .await;
        let Err(panic) = delivered else {
            continue;
        };
        let err = Arc::new(HandlerError::from_panic(panic));
        view_model.logger().error(&*err);
        if matches!(notification, BallastNotification::UnhandledError(_)) {
            continue;
        }
        for (position, peer) in peers.iter().enumerate() {
            if position == index {
                continue;
            }
            if let Some(peer) = peer.upgrade() {
                let _ = peer.send(BallastNotification::UnhandledError(err.clone()));
            }
        }
    }
}
