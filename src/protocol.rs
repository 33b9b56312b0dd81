use crate::types::*;
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "1.0";

pub const ALREADY_SUBMITTED_MSG: &str = "You have already submitted an answer for this question.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    Join {
        name: String,
    },
    /// Start (or restart) the quiz from the first question
    Start,
    /// Force the quiz to end
    End,
    /// Advance to the next question
    Next,
    /// Go back to the previous question
    Prev,
    #[serde(rename_all = "camelCase")]
    SubmitAnswer {
        name: String,
        answer: String,
        timestamp: String,
        time_answered: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    Welcome {
        protocol: String,
        phase: SessionPhase,
        index: usize,
        total_questions: usize,
        server_now: String,
    },
    Roster {
        names: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    SessionStarted {
        total_questions: usize,
    },
    Question {
        question: String,
        index: usize,
        choices: Vec<String>,
    },
    SessionEnded,
    #[serde(rename_all = "camelCase")]
    AnswerResult {
        is_correct: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        score: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl ServerMessage {
    pub fn question(question: &Question, index: usize) -> Self {
        ServerMessage::Question {
            question: question.text.clone(),
            index,
            choices: question.choices.clone(),
        }
    }
}
