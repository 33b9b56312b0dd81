//! Post-hoc summary of a quiz, derived from the stored answer log and score table.

use serde::{Deserialize, Serialize};

use crate::types::{AnswerRecord, Question, ScoreTable};

/// Title of the synthetic entry that carries the final score table
pub const SCORES_ENTRY_TITLE: &str = "Scores";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Respondent {
    pub name: String,
    pub timestamp: String,
    pub time_answered: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerScore {
    pub name: String,
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SummaryEntry {
    #[serde(rename_all = "camelCase")]
    Question {
        question: String,
        correct_users: Vec<Respondent>,
        fastest_answer: Option<Respondent>,
    },
    #[serde(rename_all = "camelCase")]
    Scores {
        question: String,
        correct_users: Vec<PlayerScore>,
    },
}

/// One entry per question (correct respondents, fastest first), then the scores
pub fn build_summary(
    questions: &[Question],
    answers: &[AnswerRecord],
    scores: &ScoreTable,
) -> Vec<SummaryEntry> {
    let mut summary: Vec<SummaryEntry> = questions
        .iter()
        .map(|question| {
            let mut correct: Vec<&AnswerRecord> = answers
                .iter()
                .filter(|a| a.question == question.text && question.is_correct(&a.answer))
                .collect();
            correct.sort_by(|a, b| a.time_answered.total_cmp(&b.time_answered));

            let correct_users: Vec<Respondent> = correct
                .into_iter()
                .map(|a| Respondent {
                    name: a.name.clone(),
                    timestamp: a.timestamp.clone(),
                    time_answered: a.time_answered,
                })
                .collect();

            SummaryEntry::Question {
                question: question.text.clone(),
                fastest_answer: correct_users.first().cloned(),
                correct_users,
            }
        })
        .collect();

    summary.push(SummaryEntry::Scores {
        question: SCORES_ENTRY_TITLE.to_string(),
        correct_users: scores
            .iter()
            .map(|(name, score)| PlayerScore {
                name: name.clone(),
                score: *score,
            })
            .collect(),
    });

    summary
}
