use ballast::{
    BallastNotification, FifoInputStrategy, InputCompletion, LifoInputStrategy, RestartState,
    Status,
};
use std::time::Duration;

mod common;
use common::{TestInput, TestNotification, count, start_view_model};

#[tokio::test]
async fn test_side_job_posts_inputs_back() {
    let (view_model, recorder) = start_view_model(FifoInputStrategy);

    let completion = view_model
        .send_and_await_completion(TestInput::Ticker {
            key: "ticker".into(),
            ticks: 3,
        })
        .await
        .unwrap();
    assert_eq!(completion, InputCompletion::Handled);

    recorder
        .wait_for(|seen| count(seen, "SideJobCompleted") == 1)
        .await;
    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    assert_eq!(view_model.current_state().value, 3);
    let seen = recorder.notifications();
    assert!(seen.iter().any(|n| matches!(
        n,
        BallastNotification::SideJobCompleted(key, RestartState::Initial) if key == "ticker"
    )));
    assert_eq!(count(&seen, "SideJobQueued"), 1);
}

#[tokio::test]
async fn test_relaunch_cancels_previous_run() {
    let (view_model, recorder) = start_view_model(FifoInputStrategy);

    for _ in 0..2 {
        view_model
            .send_and_await_completion(TestInput::LongJob { key: "job".into() })
            .await
            .unwrap();
    }
    assert_eq!(view_model.running_side_jobs(), 1);

    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    let started: Vec<_> = recorder
        .notifications()
        .into_iter()
        .filter_map(|n| match n {
            BallastNotification::SideJobStarted(_, restart) => Some(restart),
            _ => None,
        })
        .collect();
    assert_eq!(started, vec![RestartState::Initial, RestartState::Restarted(1)]);

    let cancelled: Vec<_> = recorder
        .notifications()
        .into_iter()
        .filter_map(|n| match n {
            BallastNotification::SideJobCancelled(_, restart) => Some(restart),
            _ => None,
        })
        .collect();
    // Replaced by the second launch, then cut short by shutdown.
    assert_eq!(cancelled, vec![RestartState::Initial, RestartState::Restarted(1)]);
    assert_eq!(view_model.running_side_jobs(), 0);
}

#[tokio::test]
async fn test_restart_count_survives_completion() {
    let (view_model, recorder) = start_view_model(FifoInputStrategy);

    view_model
        .send_and_await_completion(TestInput::ReportRestart { key: "r".into() })
        .await
        .unwrap();
    recorder
        .wait_for(|seen| count(seen, "SideJobCompleted") == 1)
        .await;
    view_model
        .send_and_await_completion(TestInput::ReportRestart { key: "r".into() })
        .await
        .unwrap();
    recorder
        .wait_for(|seen| count(seen, "SideJobCompleted") == 2)
        .await;

    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    let emitted: Vec<String> = recorder
        .notifications()
        .into_iter()
        .filter_map(|n| match n {
            BallastNotification::EventEmitted(event) => Some(event),
            _ => None,
        })
        .collect();
    assert_eq!(emitted, vec!["r:Initial", "r:Restarted(1)"]);
}

#[tokio::test]
async fn test_cancel_side_job_by_key() {
    let (view_model, recorder) = start_view_model(FifoInputStrategy);

    view_model
        .send_and_await_completion(TestInput::LongJob { key: "job".into() })
        .await
        .unwrap();
    let completion = view_model
        .send_and_await_completion(TestInput::CancelJob { key: "job".into() })
        .await
        .unwrap();
    assert_eq!(completion, InputCompletion::Handled);
    assert_eq!(view_model.running_side_jobs(), 0);

    recorder
        .wait_for(|seen| count(seen, "SideJobCancelled") == 1)
        .await;
    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    assert_eq!(count(&recorder.notifications(), "SideJobCancelled"), 1);
}

fn side_job_errors(seen: &[TestNotification], key: &str) -> Vec<(RestartState, String)> {
    seen.iter()
        .filter_map(|n| match n {
            BallastNotification::SideJobError(job, restart, err) if job == key => {
                Some((*restart, err.to_string()))
            }
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_failing_side_job_is_reported_and_contained() {
    let (view_model, recorder) = start_view_model(FifoInputStrategy);

    view_model
        .send_and_await_completion(TestInput::FailingJob { key: "flaky".into() })
        .await
        .unwrap();
    recorder
        .wait_for(|seen| count(seen, "SideJobError") == 1)
        .await;

    let completion = view_model
        .send_and_await_completion(TestInput::Increment)
        .await
        .unwrap();
    assert_eq!(completion, InputCompletion::Handled);
    assert_eq!(view_model.current_state().value, 1);
    assert_eq!(view_model.status(), Status::Running);

    // The key can be launched again after a failure.
    view_model
        .send_and_await_completion(TestInput::FailingJob { key: "flaky".into() })
        .await
        .unwrap();
    recorder
        .wait_for(|seen| count(seen, "SideJobError") == 2)
        .await;
    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    let seen = recorder.notifications();
    assert_eq!(
        side_job_errors(&seen, "flaky"),
        vec![
            (RestartState::Initial, "job failed".to_string()),
            (RestartState::Restarted(1), "job failed".to_string()),
        ]
    );
    assert_eq!(count(&seen, "SideJobCompleted"), 0);
    assert_eq!(count(&seen, "UnhandledError"), 0);
}

#[tokio::test]
async fn test_panicking_side_job_is_reported_and_contained() {
    let (view_model, recorder) = start_view_model(FifoInputStrategy);

    view_model
        .send_and_await_completion(TestInput::PanickingJob { key: "bomb".into() })
        .await
        .unwrap();
    recorder
        .wait_for(|seen| count(seen, "SideJobError") == 1)
        .await;

    let completion = view_model
        .send_and_await_completion(TestInput::Increment)
        .await
        .unwrap();
    assert_eq!(completion, InputCompletion::Handled);
    assert_eq!(view_model.current_state().value, 1);
    assert_eq!(view_model.running_side_jobs(), 0);

    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    assert_eq!(
        side_job_errors(&recorder.notifications(), "bomb"),
        vec![(
            RestartState::Initial,
            "handler panicked: job exploded".to_string()
        )]
    );
}

#[tokio::test]
async fn test_side_jobs_launch_before_input_is_reported_handled() {
    let (view_model, recorder) = start_view_model(FifoInputStrategy);

    view_model
        .send_and_await_completion(TestInput::LongJob { key: "job".into() })
        .await
        .unwrap();
    assert_eq!(view_model.running_side_jobs(), 1);
    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    let kinds = recorder.kinds();
    let started = kinds.iter().position(|kind| *kind == "SideJobStarted");
    let handled = kinds.iter().position(|kind| *kind == "InputHandledSuccessfully");
    assert!(started.is_some() && started < handled, "{kinds:?}");
}

#[tokio::test]
async fn test_lifo_never_loses_side_jobs_of_handled_inputs() {
    let (view_model, recorder) = start_view_model(LifoInputStrategy);

    for _ in 0..20 {
        view_model
            .try_send(TestInput::LongJob { key: "job".into() })
            .unwrap();
    }
    let completion = view_model
        .send_and_await_completion(TestInput::LongJob { key: "job".into() })
        .await
        .unwrap();
    assert_eq!(completion, InputCompletion::Handled);

    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    let seen = recorder.notifications();
    let handled = count(&seen, "InputHandledSuccessfully");
    assert!(handled >= 1);
    assert_eq!(count(&seen, "SideJobStarted"), handled);
    assert_eq!(
        count(&seen, "InputCancelled") + handled,
        count(&seen, "InputAccepted")
    );
    assert_eq!(view_model.running_side_jobs(), 0);
}
