use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque ID types for type safety
pub type ConnectionId = String;

/// Cumulative score per participant name
pub type ScoreTable = BTreeMap<String, i64>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionPhase {
    #[default]
    Idle,
    Running,
    Ended,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub choices: Vec<String>,
    pub correct_answer: String,
}

impl Question {
    pub fn new(text: &str, choices: &[&str], correct_answer: &str) -> Self {
        Self {
            text: text.to_string(),
            choices: choices.iter().map(|c| c.to_string()).collect(),
            correct_answer: correct_answer.to_string(),
        }
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}

/// A single accepted submission. Append-only; `(name, question)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub name: String,
    /// Question text, used as the natural key
    pub question: String,
    pub answer: String,
    /// Client-reported wall clock time of the submission
    pub timestamp: String,
    /// Client-reported seconds elapsed since the question was shown
    pub time_answered: f64,
}

impl AnswerRecord {
    pub fn answers(&self, name: &str, question: &str) -> bool {
        self.name == name && self.question == question
    }
}

/// Built-in question set used when no questions file is configured
pub fn default_questions() -> Vec<Question> {
    vec![
        Question::new(
            "What is the capital of France?",
            &["Paris", "London", "Berlin", "Madrid"],
            "Paris",
        ),
        Question::new("What is 2 + 2?", &["3", "4", "5", "6"], "4"),
        Question::new(
            "What is the capital of Thailand?",
            &["Bangkok", "Hanoi", "Tokyo", "Jakarta"],
            "Bangkok",
        ),
    ]
}
