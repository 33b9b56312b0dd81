//! WebSocket message dispatch
//!
//! Session commands fan out through the broadcast channel; the returned
//! message, if any, goes back to the sending connection only.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use std::sync::Arc;

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    connection_id: &str,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::Join { name } => {
            state.join(connection_id, name).await;
            None
        }

        ClientMessage::Start => {
            tracing::info!("Start requested by {}", connection_id);
            state.start().await;
            None
        }

        ClientMessage::End => {
            tracing::info!("End requested by {}", connection_id);
            state.end().await;
            None
        }

        ClientMessage::Next => {
            state.advance().await;
            None
        }

        ClientMessage::Prev => {
            state.retreat().await;
            None
        }

        ClientMessage::SubmitAnswer {
            name,
            answer,
            timestamp,
            time_answered,
        } => state
            .submit_answer(connection_id, name, answer, timestamp, time_answered)
            .await
            .into_reply(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoringRules;
    use crate::store::MemoryStore;
    use crate::types::*;

    fn test_state() -> Arc<AppState> {
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
            timestamp: "2024-05-01T10:00:00Z".to_string(),
            time_answered: t,
        }
    }

    #[tokio::test]
    async fn test_commands_have_no_direct_reply() {
        let state = test_state();
        for msg in [
            ClientMessage::Join {
                name: "Alice".to_string(),
            },
            ClientMessage::Start,
            ClientMessage::Next,
            ClientMessage::Prev,
            ClientMessage::End,
        ] {
            assert!(handle_message(msg, "c1", &state).await.is_none());
        }
    }

    #[tokio::test]
    async fn test_submit_before_start_is_silent() {
        let state = test_state();
        let reply = handle_message(submit("Alice", "Paris", 1.0), "c1", &state).await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn test_submit_reply_goes_to_sender() {
        let state = test_state();
        handle_message(ClientMessage::Start, "host", &state).await;
        let mut rx = state.broadcast.subscribe();

        let reply = handle_message(submit("Alice", "Paris", 15.0), "c1", &state).await;
        assert_eq!(
            reply,
            Some(ServerMessage::AnswerResult {
                is_correct: true,
                score: Some(25),
                message: None,
            })
        );
        // Nothing leaks to other connections
        assert!(rx.try_recv().is_err());
    }
}
