use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Difficulty, Question, QuestionError, Quiz};

/// Correct answer letter as stored in the `questions` collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrectAnswer {
    A,
    B,
    C,
    D,
}

impl CorrectAnswer {
    pub fn index(self) -> usize {
        match self {
            CorrectAnswer::A => 0,
            CorrectAnswer::B => 1,
            CorrectAnswer::C => 2,
            CorrectAnswer::D => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(CorrectAnswer::A),
            1 => Some(CorrectAnswer::B),
            2 => Some(CorrectAnswer::C),
            3 => Some(CorrectAnswer::D),
            _ => None,
        }
    }
}

/// Question as stored in MongoDB "questions" collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: CorrectAnswer,
    pub difficulty: Difficulty,
    pub category: String,
}

impl QuestionRecord {
    pub fn options(&self) -> Vec<String> {
        vec![
            self.option_a.clone(),
            self.option_b.clone(),
            self.option_c.clone(),
            self.option_d.clone(),
        ]
    }

    /// Time limit and points live on the quiz, not on the stored question.
    pub fn into_question(self, time_limit_ms: u32, points: u32) -> Result<Question, QuestionError> {
        let options = self.options();
        Question::new(
            self.id,
            self.text,
            options,
            self.correct_answer.index(),
            time_limit_ms,
            points,
        )
    }
}

/// Quiz as stored in MongoDB "quizzes" collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub room_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub question_ids: Vec<String>,
    pub time_per_question_ms: u32,
    pub points_per_question: u32,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub categories: Vec<String>,
    pub created_by: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuizRecord {
    /// Builds the quiz from already-resolved question records, in `question_ids` order.
    pub fn into_quiz(self, records: Vec<QuestionRecord>) -> Result<Quiz, QuestionError> {
        let questions = records
            .into_iter()
            .map(|record| record.into_question(self.time_per_question_ms, self.points_per_question))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Quiz {
            id: self.id,
            title: self.title,
            description: self.description,
            questions,
            created_by: self.created_by,
            difficulty: self.difficulty,
            categories: self.categories,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
