use ballast::{
    BallastNotification, FifoInputStrategy, Interceptor, NoOpLogger, PrintlnLogger, Status,
    ViewModel, ViewModelHandle,
    interceptor::{
        BootstrapInterceptor, DelegatingInterceptor, FilterInterceptor, KillSwitch,
        LoggingInterceptor,
    },
};
use std::{sync::Arc, time::Duration};

mod common;
use common::{
    TestHandler, TestInput, TestNotification, TestRecorder, TestState, count, start_view_model,
};

struct PanickingInterceptor;

impl Interceptor<TestInput, String, TestState> for PanickingInterceptor {
    async fn on_notification(
        &self,
        _notification: &TestNotification,
        _view_model: &ViewModelHandle<TestInput, String, TestState>,
    ) {
        panic!("interceptor bug");
    }
}

#[tokio::test]
async fn test_bootstrap_sends_initial_input_once_running() {
    let recorder = TestRecorder::new();
    let view_model = ViewModel::builder(TestState::default(), TestHandler)
        .input_strategy(FifoInputStrategy)
        .interceptor(BootstrapInterceptor::new(|| TestInput::Set(42)))
        .interceptor(recorder.clone())
        .logger(NoOpLogger)
        .build();
    view_model.start();

    recorder
        .wait_for(|seen| count(seen, "InputHandledSuccessfully") == 1)
        .await;
    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    assert_eq!(view_model.current_state().value, 42);
    assert_eq!(count(&recorder.notifications(), "InputQueued"), 1);
}

#[tokio::test]
async fn test_kill_switch_shuts_down_gracefully() {
    let recorder = TestRecorder::new();
    let (kill_switch, trigger) = KillSwitch::new(Duration::from_secs(1));
    let view_model = ViewModel::builder(TestState::default(), TestHandler)
        .input_strategy(FifoInputStrategy)
        .interceptor(kill_switch)
        .interceptor(recorder.clone())
        .logger(NoOpLogger)
        .build();
    view_model.start();
    view_model.send(TestInput::Increment).await.unwrap();

    trigger.shut_down();
    view_model.handle().cancelled().await;

    assert_eq!(view_model.status(), Status::Closed);
    assert_eq!(view_model.current_state().value, 1);
    let seen = recorder.notifications();
    assert_eq!(count(&seen, "InputHandledSuccessfully"), 1);
    assert!(seen.iter().any(|n| matches!(
        n,
        BallastNotification::ViewModelStatusChanged(Status::ShuttingDown)
    )));
}

#[tokio::test]
async fn test_filter_forwards_matching_notifications() {
    let errors = TestRecorder::new();
    let all = TestRecorder::new();
    let view_model = ViewModel::builder(TestState::default(), TestHandler)
        .input_strategy(FifoInputStrategy)
        .interceptor(FilterInterceptor::new(
            errors.clone(),
            |n: &TestNotification| n.error().is_some(),
        ))
        .interceptor(all.clone())
        .logger(NoOpLogger)
        .build();
    view_model.start();

    for input in [TestInput::Increment, TestInput::Fail, TestInput::Panic] {
        view_model.send_and_await_completion(input).await.unwrap();
    }
    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    assert_eq!(errors.kinds(), vec!["InputHandlerError", "InputHandlerError"]);
    assert!(all.count() > errors.count());
}

#[tokio::test]
async fn test_delegating_fans_out_to_every_delegate() {
    let first = TestRecorder::new();
    let second = TestRecorder::new();
    let delegating = DelegatingInterceptor::new()
        .with(first.clone())
        .with(second.clone());
    assert_eq!(delegating.len(), 2);

    let view_model = ViewModel::builder(TestState::default(), TestHandler)
        .input_strategy(FifoInputStrategy)
        .interceptor(delegating)
        .logger(NoOpLogger)
        .build();
    view_model.start();
    view_model
        .send_and_await_completion(TestInput::Increment)
        .await
        .unwrap();
    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    assert!(!first.kinds().is_empty());
    assert_eq!(first.kinds(), second.kinds());
}

#[tokio::test]
async fn test_panicking_interceptor_does_not_disturb_others() {
    let recorder = TestRecorder::new();
    let view_model = ViewModel::builder(TestState::default(), TestHandler)
        .input_strategy(FifoInputStrategy)
        .interceptor(PanickingInterceptor)
        .shared_interceptor(Arc::new(recorder.clone()))
        .logger(NoOpLogger)
        .build();
    view_model.start();
    view_model
        .send_and_await_completion(TestInput::Increment)
        .await
        .unwrap();
    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    let seen = recorder.notifications();
    assert_eq!(count(&seen, "InputHandledSuccessfully"), 1);
    // The other lanes hear about the panic.
    assert!(seen.iter().any(|n| matches!(
        n,
        BallastNotification::UnhandledError(err)
            if err.to_string() == "handler panicked: interceptor bug"
    )));
    assert!(matches!(
        seen.iter().rev().find(|n| n.kind() != "UnhandledError"),
        Some(BallastNotification::ViewModelStatusChanged(Status::Closed))
    ));
}

#[tokio::test]
async fn test_logging_interceptor_observes_without_side_effects() {
    let view_model = ViewModel::builder(TestState::default(), TestHandler)
        .input_strategy(FifoInputStrategy)
        .interceptor(LoggingInterceptor::new())
        .logger(PrintlnLogger::new("logging-test"))
        .build();
    view_model.start();
    view_model
        .send_and_await_completion(TestInput::Fail)
        .await
        .unwrap();
    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    assert_eq!(view_model.current_state(), TestState::default());
}

#[tokio::test]
async fn test_interceptors_see_the_same_ordered_stream() {
    let (view_model, recorder) = start_view_model(FifoInputStrategy);
    for n in 0..3 {
        view_model.send(TestInput::Set(n)).await.unwrap();
    }
    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    let kinds = recorder.kinds();
    let first_queued = kinds.iter().position(|k| *k == "InputQueued").unwrap();
    let first_accepted = kinds.iter().position(|k| *k == "InputAccepted").unwrap();
    assert!(first_queued < first_accepted);
    assert_eq!(common::states(&recorder.notifications()), vec![0, 1, 2]);
}
