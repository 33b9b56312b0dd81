//! Server configuration from environment variables

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::scoring::ScoringRules;
use crate::types::{default_questions, Question};

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidVar { var: &'static str, value: String },

    #[error("Failed to read questions file {path:?}: {source}")]
    QuestionsIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse questions file {path:?}: {source}")]
    QuestionsParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid question set: {0}")]
    InvalidQuestions(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Directory holding answers.json and scores.json
    pub data_dir: PathBuf,
    /// Optional JSON file with the question set (built-in set when unset)
    pub questions_file: Option<PathBuf>,
    pub scoring: ScoringRules,
    /// Allowed CORS origin (None = permissive)
    pub cors_origin: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            questions_file: None,
            scoring: ScoringRules::default(),
            cors_origin: None,
        }
    }
}

/// Read an env var, treating empty/whitespace values as unset
fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_var<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env_var(var) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar { var, value }),
        None => Ok(None),
    }
}

impl AppConfig {
    /// Load config from environment variables
    ///
    /// PORT, DATA_DIR, QUESTIONS_FILE, QUIZ_TOTAL_TIME_SECS, QUIZ_BONUS_POINTS, CORS_ORIGIN
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let total_time = match parse_var::<u64>("QUIZ_TOTAL_TIME_SECS")? {
            Some(0) => {
                return Err(ConfigError::InvalidVar {
                    var: "QUIZ_TOTAL_TIME_SECS",
                    value: "0".to_string(),
                })
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.scoring.total_time,
        };

        let bonus_points = match parse_var::<i64>("QUIZ_BONUS_POINTS")? {
            Some(points) if points < 0 => {
                return Err(ConfigError::InvalidVar {
                    var: "QUIZ_BONUS_POINTS",
                    value: points.to_string(),
                })
            }
            Some(points) => points,
            None => defaults.scoring.bonus_points,
        };

        Ok(Self {
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            data_dir: env_var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            questions_file: env_var("QUESTIONS_FILE").map(PathBuf::from),
            scoring: ScoringRules {
                total_time,
                bonus_points,
            },
            cors_origin: env_var("CORS_ORIGIN"),
        })
    }

    /// Question set from `questions_file`, or the built-in set
    pub fn load_questions(&self) -> Result<Vec<Question>, ConfigError> {
        let questions = match &self.questions_file {
            Some(path) => read_questions(path)?,
            None => default_questions(),
        };
        validate_questions(&questions)?;
        Ok(questions)
    }
}

fn read_questions(path: &Path) -> Result<Vec<Question>, ConfigError> {
    let data = std::fs::read_to_string(path).map_err(|source| ConfigError::QuestionsIo {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| ConfigError::QuestionsParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Question texts key the answer log, so they must be unique
pub fn validate_questions(questions: &[Question]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for (i, q) in questions.iter().enumerate() {
        if q.text.trim().is_empty() {
            return Err(ConfigError::InvalidQuestions(format!(
                "question {} has no text",
                i
            )));
        }
        if !q.choices.contains(&q.correct_answer) {
            return Err(ConfigError::InvalidQuestions(format!(
                "correct answer {:?} of {:?} is not one of its choices",
                q.correct_answer, q.text
            )));
        }
        if !seen.insert(q.text.as_str()) {
            return Err(ConfigError::InvalidQuestions(format!(
                "duplicate question {:?}",
                q.text
            )));
        }
    }
    Ok(())
}
