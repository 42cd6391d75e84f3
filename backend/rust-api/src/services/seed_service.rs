use anyhow::{Context, Result};
use chrono::Utc;
use mongodb::bson::doc;
use mongodb::Database;
use uuid::Uuid;

use super::quiz_repository::{QUESTIONS_COLLECTION, QUIZZES_COLLECTION};
use crate::models::question_record::{CorrectAnswer, QuestionRecord, QuizRecord};
use crate::models::Difficulty;

pub const DEMO_ROOM_ID: &str = "DEMO123";
pub const DEMO_QUESTION_COUNT: usize = 5;
pub const DEMO_TIME_PER_QUESTION_MS: u32 = 15000;
pub const DEMO_POINTS_PER_QUESTION: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub questions: usize,
    pub quiz_id: String,
}

fn record(
    text: &str,
    options: [&str; 4],
    correct_answer: CorrectAnswer,
    difficulty: Difficulty,
    category: &str,
) -> QuestionRecord {
    let [a, b, c, d] = options;
    QuestionRecord {
        id: Uuid::new_v4().to_string(),
        text: text.to_string(),
        option_a: a.to_string(),
        option_b: b.to_string(),
        option_c: c.to_string(),
        option_d: d.to_string(),
        correct_answer,
        difficulty,
        category: category.to_string(),
    }
}

pub fn sample_questions() -> Vec<QuestionRecord> {
    use CorrectAnswer::{A, B, C};
    use Difficulty::{Easy, Hard, Medium};

    vec![
        record(
            "Qual é a capital do Brasil?",
            ["São Paulo", "Rio de Janeiro", "Brasília", "Salvador"],
            C,
            Easy,
            "Geografia",
        ),
        record(
            "Quem escreveu \"Dom Casmurro\"?",
            ["José de Alencar", "Machado de Assis", "Clarice Lispector", "Graciliano Ramos"],
            B,
            Medium,
            "Literatura",
        ),
        record(
            "Qual é a fórmula química da água?",
            ["H2O", "CO2", "NaCl", "O2"],
            A,
            Easy,
            "Química",
        ),
        record(
            "Em que ano foi proclamada a República no Brasil?",
            ["1888", "1889", "1890", "1891"],
            B,
            Medium,
            "História",
        ),
        record(
            "Qual é o maior planeta do sistema solar?",
            ["Terra", "Saturno", "Júpiter", "Netuno"],
            C,
            Easy,
            "Astronomia",
        ),
        record(
            "Quem desenvolveu a teoria da relatividade?",
            ["Isaac Newton", "Albert Einstein", "Galileu Galilei", "Stephen Hawking"],
            B,
            Medium,
            "Física",
        ),
        record(
            "Qual é a moeda oficial do Japão?",
            ["Won", "Yuan", "Yen", "Dong"],
            C,
            Easy,
            "Geografia",
        ),
        record(
            "Quantos continentes existem?",
            ["5", "6", "7", "8"],
            C,
            Easy,
            "Geografia",
        ),
        record(
            "Qual é o elemento químico representado pelo símbolo \"Au\"?",
            ["Prata", "Ouro", "Alumínio", "Argônio"],
            B,
            Medium,
            "Química",
        ),
        record(
            "Em que século viveu Leonardo da Vinci?",
            ["XIV", "XV", "XVI", "XVII"],
            B,
            Hard,
            "História",
        ),
    ]
}

/// Demo quiz over the first `DEMO_QUESTION_COUNT` questions.
pub fn demo_quiz(questions: &[QuestionRecord]) -> QuizRecord {
    let now = Utc::now();
    let mut categories: Vec<String> = questions
        .iter()
        .take(DEMO_QUESTION_COUNT)
        .map(|q| q.category.clone())
        .collect();
    categories.sort();
    categories.dedup();

    QuizRecord {
        id: Uuid::new_v4().to_string(),
        room_id: DEMO_ROOM_ID.to_string(),
        title: "Quiz de Demonstração".to_string(),
        description: "Perguntas de conhecimentos gerais".to_string(),
        question_ids: questions
            .iter()
            .take(DEMO_QUESTION_COUNT)
            .map(|q| q.id.clone())
            .collect(),
        time_per_question_ms: DEMO_TIME_PER_QUESTION_MS,
        points_per_question: DEMO_POINTS_PER_QUESTION,
        difficulty: Difficulty::Easy,
        categories,
        created_by: "test_user_123".to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Replaces the question bank and quizzes with the sample data.
pub async fn seed(mongo: &Database) -> Result<SeedSummary> {
    let questions_collection = mongo.collection::<QuestionRecord>(QUESTIONS_COLLECTION);
    let quizzes_collection = mongo.collection::<QuizRecord>(QUIZZES_COLLECTION);

    tracing::info!("Cleaning existing quiz data");
    quizzes_collection
        .delete_many(doc! {})
        .await
        .context("Failed to clear quizzes")?;
    questions_collection
        .delete_many(doc! {})
        .await
        .context("Failed to clear questions")?;

    let questions = sample_questions();
    let inserted = questions_collection
        .insert_many(&questions)
        .await
        .context("Failed to insert sample questions")?;
    tracing::info!("Created {} questions", inserted.inserted_ids.len());

    let quiz = demo_quiz(&questions);
    quizzes_collection
        .insert_one(&quiz)
        .await
        .context("Failed to insert demo quiz")?;
    tracing::info!("Created demo quiz {} (room {})", quiz.id, quiz.room_id);

    Ok(SeedSummary {
        questions: inserted.inserted_ids.len(),
        quiz_id: quiz.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_bank_converts_to_valid_questions() {
        let questions = sample_questions();
        assert_eq!(questions.len(), 10);

        for record in questions {
            let question = record
                .into_question(DEMO_TIME_PER_QUESTION_MS, DEMO_POINTS_PER_QUESTION)
                .unwrap();
            assert_eq!(question.options.len(), 4);
        }
    }

    #[test]
    fn demo_quiz_uses_first_five_questions() {
        let questions = sample_questions();
        let quiz = demo_quiz(&questions);

        assert_eq!(quiz.room_id, DEMO_ROOM_ID);
        assert_eq!(quiz.question_ids.len(), DEMO_QUESTION_COUNT);
        assert_eq!(quiz.question_ids[0], questions[0].id);
        assert_eq!(quiz.time_per_question_ms, 15000);
        assert!(quiz.categories.contains(&"Geografia".to_string()));

        let quiz = quiz
            .into_quiz(questions.into_iter().take(DEMO_QUESTION_COUNT).collect())
            .unwrap();
        assert_eq!(quiz.questions[0].options[quiz.questions[0].correct_answer], "Brasília");
    }
}
