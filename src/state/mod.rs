mod roster;
mod session;

pub use roster::Roster;
pub use session::{Session, SubmitOutcome};

use crate::protocol::ServerMessage;
use crate::scoring::ScoringRules;
use crate::store::{AnswerStore, JsonFileStore, ScoreStore, ANSWERS_FILE, SCORES_FILE};
use crate::summary::{build_summary, SummaryEntry};
use crate::types::*;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

/// Shared application state
///
/// All mutations go through the single `session` lock, so commands and
/// submissions are applied strictly one at a time. Broadcasts are sent while
/// the lock is held, which keeps the event order identical to the state order.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<Session>>,
    pub questions: Arc<Vec<Question>>,
    pub answer_store: Arc<AnswerStore>,
    pub score_store: Arc<ScoreStore>,
    /// Broadcast channel for sending messages to all clients
    pub broadcast: broadcast::Sender<ServerMessage>,
}

impl AppState {
    pub fn new(
        questions: Vec<Question>,
        rules: ScoringRules,
        answer_store: Arc<AnswerStore>,
        score_store: Arc<ScoreStore>,
    ) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        let session = Session::new(
            questions.clone(),
            rules,
            answer_store.clone(),
            score_store.clone(),
        );
        Self {
            session: Arc::new(Mutex::new(session)),
            questions: Arc::new(questions),
            answer_store,
            score_store,
            broadcast: tx,
        }
    }

    /// State backed by JSON files in `data_dir`
    pub fn with_data_dir(questions: Vec<Question>, rules: ScoringRules, data_dir: &Path) -> Self {
        let answer_store: Arc<AnswerStore> =
            Arc::new(JsonFileStore::with_path(data_dir.join(ANSWERS_FILE)));
        let score_store: Arc<ScoreStore> =
            Arc::new(JsonFileStore::with_path(data_dir.join(SCORES_FILE)));
        Self::new(questions, rules, answer_store, score_store)
    }

    fn broadcast_all(&self, messages: Vec<ServerMessage>) {
        for msg in messages {
            // Ignore send errors (no receivers connected is fine)
            let _ = self.broadcast.send(msg);
        }
    }

    /// Messages a new connection should see before any broadcast
    pub async fn greeting(&self) -> Vec<ServerMessage> {
        let session = self.session.lock().await;
        let mut messages = vec![session.welcome()];
        if let Some(question) = session.current_question() {
            messages.push(ServerMessage::question(question, session.current_index()));
        }
        messages
    }

    pub async fn join(&self, connection_id: &str, name: String) {
        let mut session = self.session.lock().await;
        let events = session.join(connection_id, name);
        self.broadcast_all(events);
    }

    pub async fn leave(&self, connection_id: &str) {
        let mut session = self.session.lock().await;
        let events = session.leave(connection_id);
        self.broadcast_all(events);
    }

    pub async fn start(&self) {
        let mut session = self.session.lock().await;
        let events = session.start();
        self.broadcast_all(events);
    }

    /// Returns true if the cursor moved (or the quiz ended)
    pub async fn advance(&self) -> bool {
        let mut session = self.session.lock().await;
        let events = session.advance();
        let applied = !events.is_empty();
        self.broadcast_all(events);
        applied
    }

    pub async fn retreat(&self) -> bool {
        let mut session = self.session.lock().await;
        let events = session.retreat();
        let applied = !events.is_empty();
        self.broadcast_all(events);
        applied
    }

    pub async fn end(&self) {
        let mut session = self.session.lock().await;
        let events = session.end();
        self.broadcast_all(events);
    }

    pub async fn submit_answer(
        &self,
        connection_id: &str,
        name: String,
        answer: String,
        timestamp: String,
        time_answered: f64,
    ) -> SubmitOutcome {
        self.session
            .lock()
            .await
            .submit(connection_id, name, answer, timestamp, time_answered)
    }

    pub async fn get_phase(&self) -> SessionPhase {
        self.session.lock().await.phase()
    }

    pub async fn get_current_index(&self) -> usize {
        self.session.lock().await.current_index()
    }

    pub async fn get_roster(&self) -> Vec<String> {
        self.session.lock().await.roster().names()
    }

    /// Build the summary report from what is currently on disk
    pub fn summary(&self) -> Vec<SummaryEntry> {
        let answers = self.answer_store.load();
        let scores = self.score_store.load();
        build_summary(&self.questions, &answers, &scores)
    }
}
