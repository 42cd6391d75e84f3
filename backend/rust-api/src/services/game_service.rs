use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::game_engine;
use super::quiz_repository::{QuizRepository, RepositoryError};
use super::session_store::{SessionStore, StoreError};
use crate::metrics::{ANSWERS_REJECTED_TOTAL, ANSWERS_SUBMITTED_TOTAL, SESSION_LOCKS, SESSIONS_TOTAL};
use crate::models::{GameSession, Quiz, SessionStatus, SubmitAnswerRequest, User, UserAnswer};

#[derive(Debug, Error)]
pub enum GameError {
    #[error("Session {0} not found")]
    SessionNotFound(String),

    #[error("Quiz {0} not found")]
    QuizNotFound(String),

    #[error("Quiz {0} is not active")]
    QuizInactive(String),

    #[error("Session {id} is already {}", .status.as_str())]
    SessionClosed { id: String, status: SessionStatus },

    #[error("Session {id} has answered every question")]
    QuizExhausted { id: String },

    #[error("Expected an answer for question {expected}, got {got}")]
    OutOfOrderAnswer { expected: String, got: String },

    #[error("Only {answered} of {total} questions answered")]
    UnansweredQuestions { answered: usize, total: usize },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Checked session lifecycle on top of `game_engine`.
///
/// Read-modify-write cycles for one session id are serialized through a
/// per-session lock, so two concurrent submissions cannot both append at the
/// same index. The lock lives in this process only and its entry is dropped
/// as soon as no request for that session is in flight.
pub struct GameService {
    quizzes: Arc<dyn QuizRepository>,
    store: Arc<dyn SessionStore>,
    session_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl GameService {
    pub fn new(quizzes: Arc<dyn QuizRepository>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            quizzes,
            store,
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn start_session(&self, quiz_id: &str, user_id: &str) -> Result<GameSession, GameError> {
        let quiz = self.load_quiz(quiz_id).await?;
        if !quiz.is_active {
            return Err(GameError::QuizInactive(quiz.id));
        }

        // Sessions reference the canonical quiz id even when started by room code
        let session = game_engine::start_game_session(&quiz.id, user_id);
        self.store.store_session(&session).await?;

        SESSIONS_TOTAL.with_label_values(&["started"]).inc();

        tracing::info!(
            "Session started: {} for user: {} on quiz: {} ({} questions)",
            session.id,
            user_id,
            quiz.id,
            quiz.question_count()
        );

        Ok(session)
    }

    pub async fn get_session(&self, session_id: &str) -> Result<GameSession, GameError> {
        self.store
            .fetch_session(session_id)
            .await?
            .ok_or_else(|| GameError::SessionNotFound(session_id.to_string()))
    }

    pub async fn submit_answer(
        &self,
        session_id: &str,
        req: &SubmitAnswerRequest,
    ) -> Result<(UserAnswer, GameSession), GameError> {
        let guard = self.lock_session(session_id).await;
        let result = match self.get_session(session_id).await {
            Ok(session) => self.apply_answer(&session, req).await,
            Err(err) => Err(err),
        };
        self.release_session(session_id, guard).await;

        if let Err(err) = &result {
            let reason = match err {
                GameError::SessionClosed { .. } => "session_closed",
                GameError::QuizExhausted { .. } => "quiz_exhausted",
                GameError::OutOfOrderAnswer { .. } => "out_of_order",
                _ => "other",
            };
            ANSWERS_REJECTED_TOTAL.with_label_values(&[reason]).inc();
        }

        result
    }

    async fn apply_answer(
        &self,
        session: &GameSession,
        req: &SubmitAnswerRequest,
    ) -> Result<(UserAnswer, GameSession), GameError> {
        ensure_in_progress(session)?;

        let quiz = self.load_quiz(&session.quiz_id).await?;
        let question = quiz
            .questions
            .get(session.current_question_index)
            .ok_or_else(|| GameError::QuizExhausted {
                id: session.id.clone(),
            })?;

        if question.id != req.question_id {
            return Err(GameError::OutOfOrderAnswer {
                expected: question.id.clone(),
                got: req.question_id.clone(),
            });
        }

        let answer = game_engine::evaluate_answer(question, req.selected_answer, req.time_spent_ms);
        let updated = game_engine::update_game_session(session, answer.clone());
        self.store.store_session(&updated).await?;

        let correct_label = if answer.is_correct { "true" } else { "false" };
        ANSWERS_SUBMITTED_TOTAL
            .with_label_values(&[correct_label])
            .inc();

        tracing::info!(
            "Answer processed: session={}, question={}, correct={}, points={}, score={}",
            updated.id,
            answer.question_id,
            answer.is_correct,
            answer.points,
            updated.score
        );

        Ok((answer, updated))
    }

    /// Completion requires every question to have been answered; use
    /// `abandon_session` to end early.
    pub async fn complete_session(&self, session_id: &str) -> Result<GameSession, GameError> {
        let guard = self.lock_session(session_id).await;
        let result = self.complete_locked(session_id).await;
        self.release_session(session_id, guard).await;
        result
    }

    async fn complete_locked(&self, session_id: &str) -> Result<GameSession, GameError> {
        let session = self.get_session(session_id).await?;
        ensure_in_progress(&session)?;

        let quiz = self.load_quiz(&session.quiz_id).await?;
        if session.current_question_index < quiz.question_count() {
            return Err(GameError::UnansweredQuestions {
                answered: session.current_question_index,
                total: quiz.question_count(),
            });
        }

        let completed = game_engine::complete_game_session(&session);
        self.finish(&completed, "completed").await?;

        tracing::info!(
            "Session completed: {} with score {}",
            completed.id,
            completed.score
        );

        Ok(completed)
    }

    pub async fn abandon_session(&self, session_id: &str) -> Result<GameSession, GameError> {
        let guard = self.lock_session(session_id).await;
        let result = self.abandon_locked(session_id).await;
        self.release_session(session_id, guard).await;
        result
    }

    async fn abandon_locked(&self, session_id: &str) -> Result<GameSession, GameError> {
        let session = self.get_session(session_id).await?;
        ensure_in_progress(&session)?;

        let abandoned = game_engine::abandon_game_session(&session);
        self.finish(&abandoned, "abandoned").await?;

        tracing::info!(
            "Session abandoned: {} after {} answers",
            abandoned.id,
            abandoned.answers.len()
        );

        Ok(abandoned)
    }

    pub async fn cache_user(&self, user: &User) -> Result<(), GameError> {
        self.store.store_user(user).await?;
        Ok(())
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, GameError> {
        Ok(self.store.fetch_user(user_id).await?)
    }

    async fn finish(&self, session: &GameSession, label: &str) -> Result<(), GameError> {
        self.store.store_session(session).await?;
        SESSIONS_TOTAL.with_label_values(&[label]).inc();
        Ok(())
    }

    async fn load_quiz(&self, quiz_id: &str) -> Result<Quiz, GameError> {
        self.quizzes
            .get_quiz(quiz_id)
            .await?
            .ok_or_else(|| GameError::QuizNotFound(quiz_id.to_string()))
    }

    async fn lock_session(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.session_locks.lock().await;
            // Entries left behind by cancelled requests have no other holder
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            let lock = locks
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone();
            SESSION_LOCKS.set(locks.len() as i64);
            lock
        };
        lock.lock_owned().await
    }

    /// Releases the guard and drops the map entry once no other task holds
    /// or waits on it. Clones are only taken under the map lock, so the
    /// strong count cannot grow while it is being checked.
    async fn release_session(&self, session_id: &str, guard: OwnedMutexGuard<()>) {
        drop(guard);

        let mut locks = self.session_locks.lock().await;
        if locks
            .get(session_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(session_id);
        }
        SESSION_LOCKS.set(locks.len() as i64);
    }

    #[cfg(test)]
    async fn tracked_locks(&self) -> usize {
        self.session_locks.lock().await.len()
    }
}

fn ensure_in_progress(session: &GameSession) -> Result<(), GameError> {
    if session.status.is_terminal() {
        return Err(GameError::SessionClosed {
            id: session.id.clone(),
            status: session.status,
        });
    }
    Ok(())
}
