use ballast::{
    BallastNotification, FifoInputStrategy, GuardianError, HandlerError, InputCompletion,
    LifoInputStrategy, ParallelInputStrategy, SendError,
};
use std::time::Duration;
use tokio::time::Instant;

mod common;
use common::{TestInput, build_view_model, count, start_view_model, states};

// ============================================================================
// LIFO
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_lifo_newer_input_cancels_and_rolls_back() {
    let (view_model, recorder) = start_view_model(LifoInputStrategy);

    let handle = view_model.handle();
    let first = tokio::spawn(async move {
        handle
            .send_and_await_completion(TestInput::SetThenWait {
                value: 10,
                wait_ms: 100,
            })
            .await
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    let second = view_model
        .send_and_await_completion(TestInput::Increment)
        .await
        .unwrap();
    assert_eq!(second, InputCompletion::Handled);
    assert_eq!(first.await.unwrap().unwrap(), InputCompletion::Cancelled);

    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    let seen = recorder.notifications();
    assert_eq!(states(&seen), vec![10, 0, 1]);
    assert_eq!(count(&seen, "InputCancelled"), 1);
    assert_eq!(view_model.current_state().value, 1);
}

#[tokio::test]
async fn test_lifo_full_queue_drops_oldest() {
    let (view_model, recorder) = build_view_model(LifoInputStrategy, 1);

    view_model.try_send(TestInput::Set(1)).unwrap();
    view_model.try_send(TestInput::Set(2)).unwrap();

    view_model.start();
    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    let seen = recorder.notifications();
    assert!(
        seen.iter()
            .any(|n| matches!(n, BallastNotification::InputDropped(TestInput::Set(1))))
    );
    assert_eq!(count(&seen, "InputAccepted"), 1);
    assert_eq!(view_model.current_state().value, 2);
}

#[tokio::test]
async fn test_lifo_dropped_input_reports_cancelled() {
    let (view_model, _recorder) = build_view_model(LifoInputStrategy, 1);

    let handle = view_model.handle();
    let dropped = tokio::spawn(async move {
        handle.send_and_await_completion(TestInput::Set(1)).await
    });
    // Let the spawned producer queue its Input first.
    tokio::task::yield_now().await;
    view_model.try_send(TestInput::Set(2)).unwrap();

    view_model.start();
    assert_eq!(dropped.await.unwrap().unwrap(), InputCompletion::Cancelled);
    view_model.shut_down_gracefully(Duration::from_secs(1)).await;
}

// ============================================================================
// FIFO
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_fifo_handles_inputs_in_order() {
    let (view_model, recorder) = start_view_model(FifoInputStrategy);

    for n in 0..5 {
        view_model
            .send(TestInput::Record {
                n,
                wait_ms: u64::from(5 - n) * 10,
            })
            .await
            .unwrap();
    }
    view_model.shut_down_gracefully(Duration::from_secs(5)).await;

    assert_eq!(view_model.current_state().seen, vec![0, 1, 2, 3, 4]);
    let seen = recorder.notifications();
    assert_eq!(count(&seen, "InputHandledSuccessfully"), 5);
    assert_eq!(count(&seen, "InputDropped"), 0);
    assert_eq!(count(&seen, "InputCancelled"), 0);
}

#[tokio::test]
async fn test_fifo_try_send_on_full_queue_is_rejected() {
    let (view_model, recorder) = build_view_model(FifoInputStrategy, 2);

    view_model
        .try_send(TestInput::Record { n: 0, wait_ms: 0 })
        .unwrap();
    view_model
        .try_send(TestInput::Record { n: 1, wait_ms: 0 })
        .unwrap();
    let overflow = view_model.try_send(TestInput::Record { n: 2, wait_ms: 0 });
    assert!(matches!(
        overflow,
        Err(SendError::Full(TestInput::Record { n: 2, .. }))
    ));

    view_model.start();
    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    assert_eq!(view_model.current_state().seen, vec![0, 1]);
    let seen = recorder.notifications();
    assert_eq!(count(&seen, "InputRejected"), 1);
    assert_eq!(count(&seen, "InputQueued"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fifo_send_waits_for_room() {
    let (view_model, _recorder) = build_view_model(FifoInputStrategy, 1);
    view_model.start();

    let started = Instant::now();
    for n in 0..3 {
        view_model
            .send(TestInput::Record { n, wait_ms: 50 })
            .await
            .unwrap();
    }
    // The third send only finds room once the first invocation is done.
    assert!(started.elapsed() >= Duration::from_millis(50));

    view_model.shut_down_gracefully(Duration::from_secs(1)).await;
    assert_eq!(view_model.current_state().seen, vec![0, 1, 2]);
}

// ============================================================================
// Parallel
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_parallel_runs_inputs_concurrently() {
    let (view_model, _recorder) = start_view_model(ParallelInputStrategy);

    let started = Instant::now();
    let completions = futures::future::join_all((0..4).map(|n| {
        view_model.send_and_await_completion(TestInput::Record { n, wait_ms: 100 })
    }))
    .await;

    assert!(started.elapsed() < Duration::from_millis(200));
    for completion in completions {
        assert_eq!(completion.unwrap(), InputCompletion::Handled);
    }

    view_model.shut_down_gracefully(Duration::from_secs(1)).await;
    let mut seen = view_model.current_state().seen;
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn test_parallel_rejects_second_state_touch() {
    let (view_model, recorder) = start_view_model(ParallelInputStrategy);

    let twice = view_model
        .send_and_await_completion(TestInput::UpdateTwice)
        .await
        .unwrap();
    let once = view_model
        .send_and_await_completion(TestInput::Increment)
        .await
        .unwrap();
    assert_eq!(twice, InputCompletion::Failed);
    assert_eq!(once, InputCompletion::Handled);

    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    let seen = recorder.notifications();
    let error = seen
        .iter()
        .find_map(|n| match n {
            BallastNotification::InputHandlerError(TestInput::UpdateTwice, err) => {
                Some(err.clone())
            }
            _ => None,
        })
        .unwrap();
    assert!(matches!(
        error.as_ref(),
        HandlerError::Guardian(GuardianError::StateAccessedMoreThanOnce)
    ));
    // No rollback: the first update of the failed invocation stays.
    assert_eq!(view_model.current_state().value, 2);
}
