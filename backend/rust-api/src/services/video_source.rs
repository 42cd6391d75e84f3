use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::metrics::VIDEO_REQUESTS_TOTAL;
use crate::models::video::{QuizFromVideoRequest, VideoMetadata};
use crate::models::{QuestionError, Quiz};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Video ids become a single path segment: everything except unreserved
/// word characters is escaped, including `/`, `?`, `#` and `.`.
const VIDEO_ID_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

#[derive(Debug, Error)]
pub enum VideoSourceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationErrors),

    #[error("Video API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Video API returned error {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Video API returned an invalid quiz: {0}")]
    InvalidQuiz(#[from] QuestionError),
}

/// Third-party video metadata and quiz derivation.
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn fetch_video(&self, video_id: &str) -> Result<Option<VideoMetadata>, VideoSourceError>;

    async fn generate_quiz(
        &self,
        request: &QuizFromVideoRequest,
    ) -> Result<Option<Quiz>, VideoSourceError>;
}

pub struct TikTokConnector {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl TikTokConnector {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.is_empty() {
            request
        } else {
            request.bearer_auth(&self.api_key)
        }
    }

    /// `None` for ids that would resolve to a dot segment (`.`, `..`) even
    /// after escaping.
    fn video_url(&self, video_id: &str) -> Option<String> {
        if matches!(video_id, "" | "." | "..") {
            return None;
        }
        Some(format!(
            "{}/videos/{}",
            self.base_url,
            utf8_percent_encode(video_id, VIDEO_ID_ENCODE_SET)
        ))
    }

    /// 404 maps to `None`, other failures to errors.
    async fn read_optional<T: serde::de::DeserializeOwned + Send>(
        operation: &str,
        response: reqwest::Response,
    ) -> Result<Option<T>, VideoSourceError> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            VIDEO_REQUESTS_TOTAL
                .with_label_values(&[operation, "not_found"])
                .inc();
            return Ok(None);
        }

        if !status.is_success() {
            VIDEO_REQUESTS_TOTAL
                .with_label_values(&[operation, "error"])
                .inc();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(VideoSourceError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = response.json::<T>().await?;
        VIDEO_REQUESTS_TOTAL
            .with_label_values(&[operation, "success"])
            .inc();
        Ok(Some(parsed))
    }
}

#[async_trait]
impl VideoSource for TikTokConnector {
    async fn fetch_video(&self, video_id: &str) -> Result<Option<VideoMetadata>, VideoSourceError> {
        let Some(url) = self.video_url(video_id) else {
            tracing::warn!("Rejected video id {:?}", video_id);
            VIDEO_REQUESTS_TOTAL
                .with_label_values(&["fetch_video", "not_found"])
                .inc();
            return Ok(None);
        };
        tracing::debug!("Fetching video metadata: {}", url);

        let response = self
            .authorize(self.http_client.get(&url))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        Self::read_optional("fetch_video", response).await
    }

    async fn generate_quiz(
        &self,
        request: &QuizFromVideoRequest,
    ) -> Result<Option<Quiz>, VideoSourceError> {
        request.validate()?;

        let url = format!("{}/quizzes/generate", self.base_url);
        tracing::debug!(
            "Requesting quiz generation: video_id={}, count={}",
            request.video_id,
            request.question_count
        );

        let response = self
            .authorize(self.http_client.post(&url))
            .json(request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let quiz: Option<Quiz> = Self::read_optional("generate_quiz", response).await?;

        if let Some(quiz) = &quiz {
            for question in &quiz.questions {
                question.check()?;
            }
            tracing::info!(
                "Generated quiz {} with {} questions from video {}",
                quiz.id,
                quiz.question_count(),
                request.video_id
            );
        }

        Ok(quiz)
    }
}

/// Serves preloaded videos; never derives quizzes.
#[derive(Default)]
pub struct InMemoryVideoSource {
    videos: HashMap<String, VideoMetadata>,
}

impl InMemoryVideoSource {
    pub fn new(videos: impl IntoIterator<Item = VideoMetadata>) -> Self {
        Self {
            videos: videos
                .into_iter()
                .map(|video| (video.id.clone(), video))
                .collect(),
        }
    }
}

#[async_trait]
impl VideoSource for InMemoryVideoSource {
    async fn fetch_video(&self, video_id: &str) -> Result<Option<VideoMetadata>, VideoSourceError> {
        Ok(self.videos.get(video_id).cloned())
    }

    async fn generate_quiz(
        &self,
        request: &QuizFromVideoRequest,
    ) -> Result<Option<Quiz>, VideoSourceError> {
        request.validate()?;
        Ok(None)
    }
}
