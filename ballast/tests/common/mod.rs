#![allow(dead_code)]

use ballast::{
    BallastNotification, BoxError, EventHandler, EventHandlerScope, InputHandler,
    InputHandlerScope, InputStrategy, NoOpLogger, SideJobScope, ViewModel,
    testing::RecordingInterceptor,
};
use std::time::Duration;

// ============================================================================
// Test Contract
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum TestInput {
    Increment,
    Set(u32),
    /// Set the value, then keep running for `wait_ms`.
    SetThenWait { value: u32, wait_ms: u64 },
    /// Wait `wait_ms`, then append `n` to `seen`.
    Record { n: u32, wait_ms: u64 },
    Emit(String),
    Fail,
    Panic,
    UpdateTwice,
    SideJobThenRead,
    DoNothing,
    /// Side job posting `ticks` increments, 10ms apart.
    Ticker { key: String, ticks: u32 },
    /// Side job that only ends when cancelled.
    LongJob { key: String },
    /// Side job that emits "<key>:<restart state>".
    ReportRestart { key: String },
    CancelJob { key: String },
    /// Side job that returns an error right away.
    FailingJob { key: String },
    /// Side job that panics right away.
    PanickingJob { key: String },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TestState {
    pub value: u32,
    pub seen: Vec<u32>,
}

pub type TestNotification = BallastNotification<TestInput, String, TestState>;
pub type TestRecorder = RecordingInterceptor<TestInput, String, TestState>;
pub type TestViewModel = ViewModel<TestInput, String, TestState>;

// ============================================================================
// Test Handlers
// ============================================================================

pub struct TestHandler;

impl InputHandler<TestInput, String, TestState> for TestHandler {
    async fn handle_input(
        &self,
        input: TestInput,
        scope: &mut InputHandlerScope<TestInput, String, TestState>,
    ) -> Result<(), BoxError> {
        match input {
            TestInput::Increment => scope.update_state(|s| TestState {
                value: s.value + 1,
                ..s
            }),
            TestInput::Set(value) => scope.update_state(|s| TestState { value, ..s }),
            TestInput::SetThenWait { value, wait_ms } => {
                scope.update_state(|s| TestState { value, ..s });
                tokio::time::sleep(Duration::from_millis(wait_ms)).await;
            }
            TestInput::Record { n, wait_ms } => {
                tokio::time::sleep(Duration::from_millis(wait_ms)).await;
                scope.update_state(|mut s| {
                    s.seen.push(n);
                    s
                });
            }
            TestInput::Emit(event) => scope.post_event(event).await?,
            TestInput::Fail => {
                scope.no_op();
                return Err("boom".into());
            }
            TestInput::Panic => panic!("kaboom"),
            TestInput::UpdateTwice => {
                scope.update_state(|s| TestState {
                    value: s.value + 1,
                    ..s
                });
                scope.update_state(|s| TestState {
                    value: s.value + 1,
                    ..s
                });
            }
            TestInput::SideJobThenRead => {
                scope.no_op();
                scope.side_job("late", finish_immediately);
                let _ = scope.get_current_state();
            }
            TestInput::DoNothing => {}
            TestInput::Ticker { key, ticks } => {
                scope.no_op();
                scope.side_job(key, move |job| tick(job, ticks));
            }
            TestInput::LongJob { key } => {
                scope.no_op();
                scope.side_job(key, run_for_an_hour);
            }
            TestInput::ReportRestart { key } => {
                scope.no_op();
                scope.side_job(key, report_restart);
            }
            TestInput::CancelJob { key } => scope.cancel_side_job(&key).await,
            TestInput::FailingJob { key } => {
                scope.no_op();
                scope.side_job(key, fail_job);
            }
            TestInput::PanickingJob { key } => {
                scope.no_op();
                scope.side_job(key, panic_in_job);
            }
        }
        Ok(())
    }
}

type TestJob = SideJobScope<TestInput, String, TestState>;

async fn finish_immediately(_job: TestJob) -> Result<(), BoxError> {
    Ok(())
}

async fn tick(job: TestJob, ticks: u32) -> Result<(), BoxError> {
    for _ in 0..ticks {
        tokio::time::sleep(Duration::from_millis(10)).await;
        job.post_input(TestInput::Increment).await?;
    }
    Ok(())
}

async fn run_for_an_hour(_job: TestJob) -> Result<(), BoxError> {
    tokio::time::sleep(Duration::from_secs(3600)).await;
    Ok(())
}

async fn report_restart(job: TestJob) -> Result<(), BoxError> {
    let report = format!("{}:{}", job.key(), job.restart_state());
    job.post_event(report).await?;
    Ok(())
}

async fn fail_job(_job: TestJob) -> Result<(), BoxError> {
    Err("job failed".into())
}

async fn panic_in_job(_job: TestJob) -> Result<(), BoxError> {
    panic!("job exploded")
}

/// Turns a "ping" Event into an Increment Input; accepts everything else.
pub struct PingEventHandler;

impl EventHandler<TestInput, String, TestState> for PingEventHandler {
    async fn handle_event(
        &self,
        event: String,
        scope: &mut EventHandlerScope<TestInput, String, TestState>,
    ) -> Result<(), BoxError> {
        match event.as_str() {
            "ping" => scope.post_input(TestInput::Increment).await?,
            "explode" => return Err("event failed".into()),
            _ => {}
        }
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// A started ViewModel with a recorder attached.
pub fn start_view_model<T: InputStrategy>(strategy: T) -> (TestViewModel, TestRecorder) {
    let (view_model, recorder) = build_view_model(strategy, 64);
    view_model.start();
    (view_model, recorder)
}

/// A ViewModel in the `Created` state with a recorder attached.
pub fn build_view_model<T: InputStrategy>(
    strategy: T,
    capacity: usize,
) -> (TestViewModel, TestRecorder) {
    let recorder = TestRecorder::new();
    let view_model = ViewModel::builder(TestState::default(), TestHandler)
        .name("Test")
        .input_strategy(strategy)
        .event_handler(PingEventHandler)
        .interceptor(recorder.clone())
        .input_capacity(capacity)
        .logger(NoOpLogger)
        .build();
    (view_model, recorder)
}

pub fn count(notifications: &[TestNotification], kind: &str) -> usize {
    notifications.iter().filter(|n| n.kind() == kind).count()
}

pub fn states(notifications: &[TestNotification]) -> Vec<u32> {
    notifications
        .iter()
        .filter_map(|n| match n {
            BallastNotification::StateChanged(state) => Some(state.value),
            _ => None,
        })
        .collect()
}
