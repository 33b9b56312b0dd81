//! The quiz session state machine.
//!
//! `Session` is the single owner of the question cursor, the roster and the
//! in-memory mirrors of the answer log and score table. Every operation returns
//! the messages that must be broadcast to all connections; the caller is
//! responsible for fan-out. Store writes happen synchronously inside the
//! operation that caused them.

use std::sync::Arc;

use super::roster::Roster;
use crate::protocol::{ServerMessage, ALREADY_SUBMITTED_MSG};
use crate::scoring::ScoringRules;
use crate::store::{AnswerStore, ScoreStore};
use crate::types::*;

/// Result of a submission, surfaced to the submitter only
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// No quiz is running
    Ignored,
    /// This name already answered the current question
    Duplicate,
    Accepted { is_correct: bool, score: i64 },
}

impl SubmitOutcome {
    pub fn into_reply(self) -> Option<ServerMessage> {
        match self {
            SubmitOutcome::Ignored => None,
            SubmitOutcome::Duplicate => Some(ServerMessage::AnswerResult {
                is_correct: false,
                score: None,
                message: Some(ALREADY_SUBMITTED_MSG.to_string()),
            }),
            SubmitOutcome::Accepted { is_correct, score } => Some(ServerMessage::AnswerResult {
                is_correct,
                score: Some(score),
                message: None,
            }),
        }
    }
}

pub struct Session {
    phase: SessionPhase,
    current_index: usize,
    questions: Vec<Question>,
    rules: ScoringRules,
    roster: Roster,
    answers: Vec<AnswerRecord>,
    scores: ScoreTable,
    answer_store: Arc<AnswerStore>,
    score_store: Arc<ScoreStore>,
}

impl Session {
    /// Create an idle session, restoring answers and scores from the stores
    pub fn new(
        questions: Vec<Question>,
        rules: ScoringRules,
        answer_store: Arc<AnswerStore>,
        score_store: Arc<ScoreStore>,
    ) -> Self {
        let answers = answer_store.load();
        let scores = score_store.load();
        tracing::info!(
            "Session loaded: {} questions, {} stored answers, {} scored players",
            questions.len(),
            answers.len(),
            scores.len()
        );

        Self {
            phase: SessionPhase::Idle,
            current_index: 0,
            questions,
            rules,
            roster: Roster::new(),
            answers,
            scores,
            answer_store,
            score_store,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.phase != SessionPhase::Running {
            return None;
        }
        self.questions.get(self.current_index)
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn scores(&self) -> &ScoreTable {
        &self.scores
    }

    /// Snapshot sent to a freshly connected client
    pub fn welcome(&self) -> ServerMessage {
        ServerMessage::Welcome {
            protocol: crate::protocol::PROTOCOL_VERSION.to_string(),
            phase: self.phase,
            index: self.current_index,
            total_questions: self.questions.len(),
            server_now: chrono::Utc::now().to_rfc3339(),
        }
    }

    // =========================================================================
    // Presence
    // =========================================================================

    pub fn join(&mut self, connection_id: &str, name: String) -> Vec<ServerMessage> {
        tracing::info!("Player joined: {} ({})", name, connection_id);

        if !self.scores.contains_key(&name) {
            self.scores.insert(name.clone(), 0);
            self.persist_scores();
        }
        self.roster.join(connection_id, name);

        vec![self.roster_message()]
    }

    /// Drop a disconnected connection. Returns nothing if it never joined.
    pub fn leave(&mut self, connection_id: &str) -> Vec<ServerMessage> {
        match self.roster.leave(connection_id) {
            Some(name) => {
                tracing::info!("Player left: {} ({})", name, connection_id);
                vec![self.roster_message()]
            }
            None => Vec::new(),
        }
    }

    fn roster_message(&self) -> ServerMessage {
        ServerMessage::Roster {
            names: self.roster.names(),
        }
    }

    // =========================================================================
    // Progression
    // =========================================================================

    pub fn start(&mut self) -> Vec<ServerMessage> {
        tracing::info!("Quiz started with {} questions", self.questions.len());
        self.phase = SessionPhase::Running;
        self.current_index = 0;

        let mut events = vec![ServerMessage::SessionStarted {
            total_questions: self.questions.len(),
        }];
        events.extend(self.current_question_or_end());
        events
    }

    pub fn advance(&mut self) -> Vec<ServerMessage> {
        if self.phase != SessionPhase::Running {
            tracing::debug!("Ignoring next: session is {:?}", self.phase);
            return Vec::new();
        }
        self.current_index += 1;
        self.current_question_or_end()
    }

    pub fn retreat(&mut self) -> Vec<ServerMessage> {
        if self.phase != SessionPhase::Running {
            tracing::debug!("Ignoring prev: session is {:?}", self.phase);
            return Vec::new();
        }
        self.current_index = self.current_index.saturating_sub(1);
        self.current_question_or_end()
    }

    pub fn end(&mut self) -> Vec<ServerMessage> {
        tracing::info!("Quiz ended at question {}", self.current_index);
        self.phase = SessionPhase::Ended;
        vec![ServerMessage::SessionEnded]
    }

    /// The question at the cursor, or the terminal transition when past the end
    fn current_question_or_end(&mut self) -> Vec<ServerMessage> {
        match self.questions.get(self.current_index) {
            Some(question) => vec![ServerMessage::question(question, self.current_index)],
            None => self.end(),
        }
    }

    // =========================================================================
    // Submissions
    // =========================================================================

    pub fn submit(
        &mut self,
        connection_id: &str,
        name: String,
        answer: String,
        timestamp: String,
        time_answered: f64,
    ) -> SubmitOutcome {
        let Some(question) = self.current_question() else {
            tracing::debug!("Ignoring answer from {}: no question is live", name);
            return SubmitOutcome::Ignored;
        };
        let question_text = question.text.clone();
        let is_correct = question.is_correct(&answer);

        if self.answers.iter().any(|a| a.answers(&name, &question_text)) {
            tracing::warn!(
                "Duplicate answer from {} ({}) for question {}",
                name,
                connection_id,
                self.current_index
            );
            return SubmitOutcome::Duplicate;
        }

        let score = self.rules.score(time_answered, is_correct);
        tracing::info!(
            "Answer from {} for question {}: correct={}, score={}",
            name,
            self.current_index,
            is_correct,
            score
        );

        self.answers.push(AnswerRecord {
            name: name.clone(),
            question: question_text,
            answer,
            timestamp,
            time_answered,
        });
        self.persist_answers();

        *self.scores.entry(name).or_insert(0) += score;
        self.persist_scores();

        SubmitOutcome::Accepted { is_correct, score }
    }

    fn persist_answers(&self) {
        if let Err(e) = self.answer_store.save(&self.answers) {
            tracing::error!("Failed to save answer log: {}", e);
        }
    }

    fn persist_scores(&self) {
        if let Err(e) = self.score_store.save(&self.scores) {
            tracing::error!("Failed to save score table: {}", e);
        }
    }
}
