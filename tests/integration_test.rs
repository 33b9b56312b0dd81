use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use quizcast::api;
use quizcast::protocol::{ClientMessage, ServerMessage};
use quizcast::scoring::ScoringRules;
use quizcast::state::AppState;
use quizcast::store::MemoryStore;
use quizcast::types::{default_questions, AnswerRecord, ScoreTable, SessionPhase};
use quizcast::ws::handlers::handle_message;
use std::sync::Arc;
use tokio::sync::broadcast::Receiver;
use tower::ServiceExt;

fn memory_state() -> Arc<AppState> {
    Arc::new(AppState::new(
        default_questions(),
        ScoringRules::default(),
        Arc::new(MemoryStore::<Vec<AnswerRecord>>::new()),
        Arc::new(MemoryStore::<ScoreTable>::new()),
    ))
}

fn submit(name: &str, answer: &str, t: f64) -> ClientMessage {
    ClientMessage::SubmitAnswer {
        name: name.to_string(),
        answer: answer.to_string(),
        timestamp: "2024-05-01T10:00:00.000Z".to_string(),
        time_answered: t,
    }
}

fn drain(rx: &mut Receiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

async fn get_json(state: Arc<AppState>, uri: &str) -> serde_json::Value {
    let app = api::router(state, api::cors_layer(None));
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// End-to-end flow: join, play all questions, read the summary
#[tokio::test]
async fn test_full_quiz_flow() {
    let state = memory_state();
    let mut rx = state.broadcast.subscribe();

    // 1. Players join
    handle_message(
        ClientMessage::Join {
            name: "Alice".to_string(),
        },
        "conn-alice",
        &state,
    )
    .await;
    handle_message(
        ClientMessage::Join {
            name: "Bob".to_string(),
        },
        "conn-bob",
        &state,
    )
    .await;

    let events = drain(&mut rx);
    assert_eq!(
        events.last(),
        Some(&ServerMessage::Roster {
            names: vec!["Alice".to_string(), "Bob".to_string()]
        })
    );

    // 2. Start
    handle_message(ClientMessage::Start, "conn-host", &state).await;
    let events = drain(&mut rx);
    assert_eq!(events[0], ServerMessage::SessionStarted { total_questions: 3 });
    assert!(matches!(events[1], ServerMessage::Question { index: 0, .. }));

    // 3. Question 1: both correct, Bob faster
    let alice = handle_message(submit("Alice", "Paris", 6.0), "conn-alice", &state).await;
    let bob = handle_message(submit("Bob", "Paris", 3.0), "conn-bob", &state).await;
    assert_eq!(
        alice,
        Some(ServerMessage::AnswerResult {
            is_correct: true,
            score: Some(40),
            message: None
        })
    );
    assert_eq!(
        bob,
        Some(ServerMessage::AnswerResult {
            is_correct: true,
            score: Some(45),
            message: None
        })
    );

    // 4. Question 2: Alice wrong, Bob right at the halfway mark
    handle_message(ClientMessage::Next, "conn-host", &state).await;
    handle_message(submit("Alice", "5", 2.0), "conn-alice", &state).await;
    handle_message(submit("Bob", "4", 15.0), "conn-bob", &state).await;

    // 5. Question 3 and then past the end
    handle_message(ClientMessage::Next, "conn-host", &state).await;
    handle_message(submit("Alice", "Bangkok", 0.0), "conn-alice", &state).await;
    handle_message(ClientMessage::Next, "conn-host", &state).await;

    let events = drain(&mut rx);
    assert!(matches!(events[0], ServerMessage::Question { index: 1, .. }));
    assert!(matches!(events[1], ServerMessage::Question { index: 2, .. }));
    assert_eq!(events[2], ServerMessage::SessionEnded);
    assert_eq!(events.len(), 3);
    assert_eq!(state.get_phase().await, SessionPhase::Ended);

    // 6. Summary
    let summary = get_json(state.clone(), "/summary").await;
    let entries = summary.as_array().unwrap();
    assert_eq!(entries.len(), 4);

    assert_eq!(entries[0]["correctUsers"][0]["name"], "Bob");
    assert_eq!(entries[0]["correctUsers"][1]["name"], "Alice");
    assert_eq!(entries[0]["fastestAnswer"]["name"], "Bob");
    assert_eq!(entries[1]["correctUsers"].as_array().unwrap().len(), 1);
    assert_eq!(entries[2]["fastestAnswer"]["name"], "Alice");

    assert_eq!(entries[3]["question"], "Scores");
    assert_eq!(entries[3]["correctUsers"][0]["name"], "Alice");
    assert_eq!(entries[3]["correctUsers"][0]["score"], 90);
    assert_eq!(entries[3]["correctUsers"][1]["name"], "Bob");
    assert_eq!(entries[3]["correctUsers"][1]["score"], 70);
}

#[tokio::test]
async fn test_double_submission_changes_score_once() {
    let state = memory_state();
    handle_message(ClientMessage::Start, "host", &state).await;

    let first = handle_message(submit("Alice", "Paris", 0.0), "c1", &state).await;
    let second = handle_message(submit("Alice", "London", 0.0), "c2", &state).await;

    assert!(matches!(
        first,
        Some(ServerMessage::AnswerResult {
            is_correct: true,
            score: Some(50),
            ..
        })
    ));
    match second {
        Some(ServerMessage::AnswerResult {
            is_correct: false,
            score: None,
            message: Some(message),
        }) => assert!(message.contains("already submitted")),
        other => panic!("Expected duplicate rejection, got {:?}", other),
    }

    assert_eq!(state.score_store.load().get("Alice"), Some(&50));
    assert_eq!(state.answer_store.load().len(), 1);
}

#[tokio::test]
async fn test_retreat_does_not_resurrect_ended_session() {
    let state = memory_state();
    handle_message(ClientMessage::Start, "host", &state).await;
    handle_message(ClientMessage::End, "host", &state).await;

    let mut rx = state.broadcast.subscribe();
    handle_message(ClientMessage::Prev, "host", &state).await;

    assert!(drain(&mut rx).is_empty());
    assert_eq!(state.get_phase().await, SessionPhase::Ended);
}

#[tokio::test]
async fn test_disconnect_updates_roster() {
    let state = memory_state();
    state.join("c1", "Alice".to_string()).await;
    state.join("c2", "Alice".to_string()).await;
    assert_eq!(state.get_roster().await, vec!["Alice", "Alice"]);

    let mut rx = state.broadcast.subscribe();
    state.leave("c1").await;
    assert_eq!(
        drain(&mut rx),
        vec![ServerMessage::Roster {
            names: vec!["Alice".to_string()]
        }]
    );
}

#[tokio::test]
async fn test_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let state = Arc::new(AppState::with_data_dir(
            default_questions(),
            ScoringRules::default(),
            dir.path(),
        ));
        handle_message(ClientMessage::Start, "host", &state).await;
        handle_message(submit("Alice", "Paris", 3.0), "c1", &state).await;
    }

    assert!(dir.path().join("answers.json").is_file());
    assert!(dir.path().join("scores.json").is_file());

    let state = Arc::new(AppState::with_data_dir(
        default_questions(),
        ScoringRules::default(),
        dir.path(),
    ));
    handle_message(ClientMessage::Start, "host", &state).await;
    let reply = handle_message(submit("Alice", "Paris", 1.0), "c1", &state).await;
    assert!(matches!(
        reply,
        Some(ServerMessage::AnswerResult {
            message: Some(_),
            ..
        })
    ));

    let summary = get_json(state, "/summary").await;
    assert_eq!(summary[0]["fastestAnswer"]["timeAnswered"], 3.0);
    assert_eq!(summary[3]["correctUsers"][0]["score"], 45);
}

#[tokio::test]
async fn test_root_endpoint() {
    let app = api::router(memory_state(), api::cors_layer(None));
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], api::WELCOME_TEXT.as_bytes());
}

#[tokio::test]
async fn test_summary_on_empty_store() {
    let summary = get_json(memory_state(), "/summary").await;
    let entries = summary.as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries[0]["fastestAnswer"].is_null());
    assert!(entries[3]["correctUsers"].as_array().unwrap().is_empty());
}
