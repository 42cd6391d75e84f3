use crate::config::Config;
use mongodb::Client as MongoClient;
use redis::aio::ConnectionManager;
use std::sync::Arc;

use game_service::GameService;
use health_service::{HealthReporter, MongoProbe, RedisProbe};
use quiz_repository::MongoQuizRepository;
use session_store::RedisSessionStore;
use video_source::{TikTokConnector, VideoSource};

pub struct AppState {
    pub config: Config,
    pub game: GameService,
    pub videos: Arc<dyn VideoSource>,
    pub health: HealthReporter,
}

impl AppState {
    pub async fn new(
        config: Config,
        mongo_client: MongoClient,
        redis_client: redis::Client,
    ) -> anyhow::Result<Self> {
        let mongo = mongo_client.database(&config.mongo_database);

        tracing::info!("Attempting to connect to Redis...");

        let redis = tokio::time::timeout(
            std::time::Duration::from_secs(30),
            ConnectionManager::new(redis_client),
        )
        .await
        .map_err(|_| anyhow::anyhow!("Redis connection timeout after 30s"))??;

        tracing::info!("Redis ConnectionManager created");

        let game = GameService::new(
            Arc::new(MongoQuizRepository::new(mongo.clone())),
            Arc::new(RedisSessionStore::new(
                redis.clone(),
                config.session_ttl_seconds,
            )),
        );
        let videos = Arc::new(TikTokConnector::new(
            config.tiktok_api_url.clone(),
            config.tiktok_api_key.clone(),
        ));
        let health = HealthReporter::new(
            Arc::new(MongoProbe::new(mongo)),
            Arc::new(RedisProbe::new(redis)),
            config.environment.clone(),
        );

        Ok(Self::from_parts(config, game, videos, health))
    }

    /// Assembles state from already-built components (in-memory stores in tests).
    pub fn from_parts(
        config: Config,
        game: GameService,
        videos: Arc<dyn VideoSource>,
        health: HealthReporter,
    ) -> Self {
        Self {
            config,
            game,
            videos,
            health,
        }
    }
}

pub mod game_engine;
pub mod game_service;
pub mod health_service;
pub mod quiz_repository;
pub mod seed_service;
pub mod session_store;
pub mod video_source;
