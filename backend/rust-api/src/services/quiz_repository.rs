use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::Database;
use std::collections::HashMap;
use thiserror::Error;

use crate::models::question_record::{QuestionRecord, QuizRecord};
use crate::models::{QuestionError, Quiz};

pub const QUESTIONS_COLLECTION: &str = "questions";
pub const QUIZZES_COLLECTION: &str = "quizzes";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Quiz {quiz_id} references missing question {question_id}")]
    MissingQuestion { quiz_id: String, question_id: String },

    #[error(transparent)]
    InvalidQuestion(#[from] QuestionError),
}

/// Read-only access to quiz reference data.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn get_quiz(&self, quiz_id: &str) -> Result<Option<Quiz>, RepositoryError>;
}

pub struct MongoQuizRepository {
    mongo: Database,
}

impl MongoQuizRepository {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    async fn fetch_questions(&self, quiz: &QuizRecord) -> Result<Vec<QuestionRecord>, RepositoryError> {
        let collection = self.mongo.collection::<QuestionRecord>(QUESTIONS_COLLECTION);
        let mut cursor = collection
            .find(doc! { "_id": { "$in": quiz.question_ids.clone() } })
            .await?;

        let mut by_id = HashMap::with_capacity(quiz.question_ids.len());
        while cursor.advance().await? {
            let record = cursor.deserialize_current()?;
            by_id.insert(record.id.clone(), record);
        }

        // Keep the quiz's ordering, not the collection's
        quiz.question_ids
            .iter()
            .map(|question_id| {
                by_id
                    .remove(question_id)
                    .ok_or_else(|| RepositoryError::MissingQuestion {
                        quiz_id: quiz.id.clone(),
                        question_id: question_id.clone(),
                    })
            })
            .collect()
    }
}

#[async_trait]
impl QuizRepository for MongoQuizRepository {
    async fn get_quiz(&self, quiz_id: &str) -> Result<Option<Quiz>, RepositoryError> {
        let collection = self.mongo.collection::<QuizRecord>(QUIZZES_COLLECTION);

        // Accept either the quiz id or its room code (e.g. DEMO123)
        let record = collection
            .find_one(doc! { "$or": [ { "_id": quiz_id }, { "room_id": quiz_id } ] })
            .await?;

        let Some(record) = record else {
            tracing::debug!("Quiz {} not found", quiz_id);
            return Ok(None);
        };

        let questions = self.fetch_questions(&record).await?;
        let quiz = record.into_quiz(questions)?;

        tracing::debug!(
            "Loaded quiz {} with {} questions",
            quiz.id,
            quiz.question_count()
        );

        Ok(Some(quiz))
    }
}

#[derive(Default)]
pub struct InMemoryQuizRepository {
    quizzes: HashMap<String, Quiz>,
}

impl InMemoryQuizRepository {
    pub fn new(quizzes: impl IntoIterator<Item = Quiz>) -> Self {
        Self {
            quizzes: quizzes
                .into_iter()
                .map(|quiz| (quiz.id.clone(), quiz))
                .collect(),
        }
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn get_quiz(&self, quiz_id: &str) -> Result<Option<Quiz>, RepositoryError> {
        Ok(self.quizzes.get(quiz_id).cloned())
    }
}
