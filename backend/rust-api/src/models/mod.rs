use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

pub mod health;
pub mod question_record;
pub mod video;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub tiktok_handle: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single multiple-choice question. Options are index-based; storage
/// representations are converted at the boundary (see `question_record`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_correct_answer"))]
pub struct Question {
    #[validate(length(min = 1, message = "Question id must not be empty"))]
    pub id: String,
    #[validate(length(min = 1, message = "Question text must not be empty"))]
    pub text: String,
    #[validate(length(min = 2, message = "A question needs at least two options"))]
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: Option<String>,
    #[validate(range(min = 1, message = "Time limit must be at least 1ms"))]
    pub time_limit_ms: u32,
    pub points: u32,
}

fn validate_correct_answer(question: &Question) -> Result<(), ValidationError> {
    if question.correct_answer >= question.options.len() {
        let mut err = ValidationError::new("correct_answer_out_of_range");
        err.message = Some("Correct answer index must point at an option".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("Invalid question {id}: {source}")]
    Invalid {
        id: String,
        #[source]
        source: ValidationErrors,
    },
}

impl Question {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        options: Vec<String>,
        correct_answer: usize,
        time_limit_ms: u32,
        points: u32,
    ) -> Result<Self, QuestionError> {
        let question = Self {
            id: id.into(),
            text: text.into(),
            options,
            correct_answer,
            explanation: None,
            time_limit_ms,
            points,
        };
        question.check()?;
        Ok(question)
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Runs validation and wraps failures with the question id.
    pub fn check(&self) -> Result<(), QuestionError> {
        self.validate().map_err(|source| QuestionError::Invalid {
            id: self.id.clone(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
    pub created_by: String,
    pub difficulty: Difficulty,
    pub categories: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quiz {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswer {
    pub question_id: String,
    pub selected_answer: usize,
    pub is_correct: bool,
    pub time_spent_ms: u64,
    pub points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    Abandoned,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
        }
    }
}

/// One user's attempt at a quiz. `score` is always the sum of `answers[*].points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub id: String,
    pub quiz_id: String,
    pub user_id: String,
    pub score: u64,
    pub current_question_index: usize,
    pub answers: Vec<UserAnswer>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, message = "quizId must not be empty"))]
    pub quiz_id: String,
    #[validate(length(min = 1, message = "userId must not be empty"))]
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub question_id: String,
    pub selected_answer: usize,
    pub time_spent_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub answer: UserAnswer,
    pub session: GameSession,
}
