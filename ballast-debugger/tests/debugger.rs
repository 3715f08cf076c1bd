use ballast::InputCompletion;
use ballast_debugger::{
    BallastDebuggerEvent, DEFAULT_HISTORY_CAPACITY, DebuggerActionPayload, DebuggerEventPayload,
    SerializerMapping,
};
use std::{collections::HashSet, time::Duration};

mod common;
use common::{CounterInput, events_until, start_debugged, wait_for_state};

fn kinds(events: &[BallastDebuggerEvent]) -> Vec<&'static str> {
    events.iter().map(BallastDebuggerEvent::kind).collect()
}

fn uuid_of(events: &[BallastDebuggerEvent], kind: &str) -> String {
    events
        .iter()
        .find(|event| event.kind() == kind)
        .map(|event| event.uuid.clone())
        .unwrap()
}

// ============================================================================
// Outgoing events
// ============================================================================

#[tokio::test]
async fn test_events_mirror_notifications() {
    let (view_model, mut connection) = start_debugged(DEFAULT_HISTORY_CAPACITY);
    view_model
        .send_and_await_completion(CounterInput::Increment)
        .await
        .unwrap();
    view_model
        .send_and_await_completion(CounterInput::Announce("hi".into()))
        .await
        .unwrap();
    view_model.shut_down_gracefully(Duration::from_secs(1)).await;

    let mut events = Vec::new();
    while let Some(event) = connection.try_next_event() {
        events.push(event);
    }

    let kinds = kinds(&events);
    for expected in [
        "ViewModelStatusChanged",
        "InputQueued",
        "InputAccepted",
        "StateChanged",
        "InputHandledSuccessfully",
        "EventQueued",
        "EventEmitted",
        "EventHandledSuccessfully",
    ] {
        assert!(kinds.contains(&expected), "missing {expected} in {kinds:?}");
    }
    assert_eq!(
        events.last().map(|event| event.payload.clone()),
        Some(DebuggerEventPayload::ViewModelStatusChanged {
            status: "Closed".into()
        })
    );

    let state = events
        .iter()
        .find_map(|event| match &event.payload {
            DebuggerEventPayload::StateChanged {
                serialized_state,
                state_content_type,
            } => Some((serialized_state.as_str(), state_content_type.as_str())),
            _ => None,
        })
        .unwrap();
    assert_eq!(state, (r#"{"count":1}"#, "application/json"));

    assert!(events.iter().any(|event| event.payload
        == DebuggerEventPayload::EventEmitted {
            serialized_event: r#""hi""#.into(),
            event_content_type: "application/json".into(),
        }));

    assert!(events.iter().all(|event| {
        event.connection_id == connection.connection_id() && event.view_model_name == "Counter"
    }));
    let uuids: HashSet<&str> = events.iter().map(|event| event.uuid.as_str()).collect();
    assert_eq!(uuids.len(), events.len());
}

#[tokio::test]
async fn test_events_encode_for_negotiated_client() {
    let (view_model, mut connection) = start_debugged(DEFAULT_HISTORY_CAPACITY);
    let event = connection.next_event().await.unwrap();

    let mapping = SerializerMapping::negotiate("3.2.2").unwrap();
    assert_eq!(mapping, SerializerMapping::V3);
    let text = mapping.encode_event(&event).unwrap();
    assert!(text.contains("\"type\":\"ViewModelStatusChanged\""));
    assert!(text.contains(&format!("\"connectionId\":\"{}\"", connection.connection_id())));

    assert!(SerializerMapping::Unsupported.encode_event(&event).is_err());
    view_model.shut_down();
}

// ============================================================================
// Incoming actions
// ============================================================================

#[tokio::test]
async fn test_refresh_replays_history() {
    let (view_model, mut connection) = start_debugged(DEFAULT_HISTORY_CAPACITY);
    view_model
        .send_and_await_completion(CounterInput::Increment)
        .await
        .unwrap();
    let live = events_until(&mut connection, "InputHandledSuccessfully").await;

    connection
        .request("Counter", DebuggerActionPayload::RequestViewModelRefresh)
        .unwrap();
    let mut after = events_until(&mut connection, "RefreshViewModelComplete").await;

    let start = after
        .iter()
        .position(|event| event.kind() == "RefreshViewModelStart")
        .unwrap();
    let mut seen = live;
    seen.extend(after.drain(..start));
    let replayed = &after[1..after.len() - 1];
    assert_eq!(replayed, seen.as_slice());

    view_model.shut_down_gracefully(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_history_is_bounded() {
    let (view_model, mut connection) = start_debugged(3);
    view_model
        .send_and_await_completion(CounterInput::Increment)
        .await
        .unwrap();
    events_until(&mut connection, "InputHandledSuccessfully").await;

    connection
        .request("Counter", DebuggerActionPayload::RequestViewModelRefresh)
        .unwrap();
    let events = events_until(&mut connection, "RefreshViewModelComplete").await;
    let start = events
        .iter()
        .position(|event| event.kind() == "RefreshViewModelStart")
        .unwrap();
    assert_eq!(events.len() - start - 2, 3);

    view_model.shut_down_gracefully(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_resend_input() {
    let (view_model, mut connection) = start_debugged(DEFAULT_HISTORY_CAPACITY);
    view_model
        .send_and_await_completion(CounterInput::Increment)
        .await
        .unwrap();
    let events = events_until(&mut connection, "InputHandledSuccessfully").await;

    connection
        .request(
            "Counter",
            DebuggerActionPayload::RequestResendInput {
                input_uuid: uuid_of(&events, "InputQueued"),
            },
        )
        .unwrap();
    wait_for_state(&view_model, |state| state.count == 2).await;

    view_model.shut_down_gracefully(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_restore_state_by_uuid() {
    let (view_model, mut connection) = start_debugged(DEFAULT_HISTORY_CAPACITY);
    view_model
        .send_and_await_completion(CounterInput::Increment)
        .await
        .unwrap();
    let first = events_until(&mut connection, "StateChanged").await;
    for _ in 0..2 {
        view_model
            .send_and_await_completion(CounterInput::Increment)
            .await
            .unwrap();
    }
    wait_for_state(&view_model, |state| state.count == 3).await;

    connection
        .request(
            "Counter",
            DebuggerActionPayload::RequestRestoreState {
                state_uuid: uuid_of(&first, "StateChanged"),
            },
        )
        .unwrap();
    wait_for_state(&view_model, |state| state.count == 1).await;

    view_model.shut_down_gracefully(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_replace_state_from_json() {
    let (view_model, connection) = start_debugged(DEFAULT_HISTORY_CAPACITY);
    connection
        .request(
            "Counter",
            DebuggerActionPayload::RequestReplaceState {
                serialized_state: r#"{"count":42}"#.into(),
                state_content_type: "application/json".into(),
            },
        )
        .unwrap();
    wait_for_state(&view_model, |state| state.count == 42).await;

    let completion = view_model
        .send_and_await_completion(CounterInput::Increment)
        .await
        .unwrap();
    assert_eq!(completion, InputCompletion::Handled);
    assert_eq!(view_model.current_state().count, 43);

    view_model.shut_down_gracefully(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_misaddressed_and_invalid_actions_are_ignored() {
    let (view_model, mut connection) = start_debugged(DEFAULT_HISTORY_CAPACITY);
    let replace = |serialized_state: &str, state_content_type: &str| {
        DebuggerActionPayload::RequestReplaceState {
            serialized_state: serialized_state.into(),
            state_content_type: state_content_type.into(),
        }
    };

    connection
        .request("Other", replace(r#"{"count":42}"#, "application/json"))
        .unwrap();
    connection
        .request("Counter", replace(r#"{"count":42}"#, "text/plain"))
        .unwrap();
    connection
        .request("Counter", replace("not json", "application/json"))
        .unwrap();
    connection
        .request(
            "Counter",
            DebuggerActionPayload::RequestResendInput {
                input_uuid: "missing".into(),
            },
        )
        .unwrap();

    // Actions are applied in order, so the refresh completes after the others.
    connection
        .request("Counter", DebuggerActionPayload::RequestViewModelRefresh)
        .unwrap();
    events_until(&mut connection, "RefreshViewModelComplete").await;

    assert_eq!(view_model.current_state().count, 0);
    view_model.shut_down_gracefully(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_connection_reports_closed_view_model() {
    let (view_model, connection) = start_debugged(DEFAULT_HISTORY_CAPACITY);
    view_model.shut_down_gracefully(Duration::from_secs(1)).await;
    drop(view_model);

    // The action loop ends with the ViewModel; give it a moment to drop its receiver.
    tokio::time::timeout(Duration::from_secs(5), async {
        while connection
            .request("Counter", DebuggerActionPayload::RequestViewModelRefresh)
            .is_ok()
        {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}
