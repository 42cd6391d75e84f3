use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Difficulty;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub id: String,
    pub url: String,
    pub author: String,
    pub description: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    pub views: u64,
    pub likes: u64,
    pub shares: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuizFromVideoRequest {
    #[validate(length(min = 1, message = "videoId must not be empty"))]
    pub video_id: String,
    pub difficulty: Difficulty,
    #[validate(range(min = 1, max = 50, message = "questionCount must be between 1 and 50"))]
    pub question_count: u32,
    pub categories: Option<Vec<String>>,
}
