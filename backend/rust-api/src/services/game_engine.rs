//! Pure scoring and session transitions. No I/O; callers own storage.

use chrono::Utc;
use uuid::Uuid;

use crate::models::{GameSession, Question, SessionStatus, UserAnswer};

/// Bonus awarded for an instant correct answer
pub const MAX_TIME_BONUS: u32 = 100;

/// Linear decay from `MAX_TIME_BONUS` at 0ms to 0 at the time limit, floored.
/// Answers at or past the limit get 0. A zero limit also yields 0.
pub fn calculate_time_bonus(time_spent_ms: u64, time_limit_ms: u32) -> u32 {
    let limit = u64::from(time_limit_ms);
    let remaining = limit.saturating_sub(time_spent_ms);

    remaining
        .saturating_mul(u64::from(MAX_TIME_BONUS))
        .checked_div(limit)
        .map_or(0, |bonus| bonus.min(u64::from(MAX_TIME_BONUS)) as u32)
}

pub fn evaluate_answer(question: &Question, selected_answer: usize, time_spent_ms: u64) -> UserAnswer {
    let is_correct = selected_answer == question.correct_answer;
    let base_points = if is_correct { question.points } else { 0 };
    let time_bonus = if is_correct {
        calculate_time_bonus(time_spent_ms, question.time_limit_ms)
    } else {
        0
    };

    UserAnswer {
        question_id: question.id.clone(),
        selected_answer,
        is_correct,
        time_spent_ms,
        points: base_points.saturating_add(time_bonus),
    }
}

pub fn calculate_score(answers: &[UserAnswer]) -> u64 {
    answers.iter().map(|answer| u64::from(answer.points)).sum()
}

pub fn start_game_session(quiz_id: &str, user_id: &str) -> GameSession {
    GameSession {
        id: Uuid::new_v4().to_string(),
        quiz_id: quiz_id.to_string(),
        user_id: user_id.to_string(),
        score: 0,
        current_question_index: 0,
        answers: Vec::new(),
        started_at: Utc::now(),
        completed_at: None,
        status: SessionStatus::InProgress,
    }
}

/// Appends `answer`, recomputes the score and advances the question index by one.
/// Ordering is not checked here; see `GameService::submit_answer`.
pub fn update_game_session(session: &GameSession, answer: UserAnswer) -> GameSession {
    let mut answers = session.answers.clone();
    answers.push(answer);

    GameSession {
        score: calculate_score(&answers),
        current_question_index: session.current_question_index + 1,
        answers,
        ..session.clone()
    }
}

/// `completed_at` never moves backwards, even if the wall clock does.
pub fn complete_game_session(session: &GameSession) -> GameSession {
    let now = Utc::now();
    let completed_at = session
        .completed_at
        .map_or(now, |previous| previous.max(now));

    GameSession {
        status: SessionStatus::Completed,
        completed_at: Some(completed_at),
        ..session.clone()
    }
}

pub fn abandon_game_session(session: &GameSession) -> GameSession {
    GameSession {
        status: SessionStatus::Abandoned,
        ..session.clone()
    }
}
