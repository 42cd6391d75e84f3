use anyhow::Context;
use tracing_subscriber::fmt::init;

use quizztok_api::{config::Config, services::seed_service};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();

    let config = Config::load().context("Failed to load configuration")?;

    let mongo_client = mongodb::Client::with_uri_str(&config.mongo_uri)
        .await
        .context("Failed to connect to MongoDB")?;
    let mongo = mongo_client.database(&config.mongo_database);

    tracing::info!("Starting database seed on {}", config.mongo_database);

    let summary = seed_service::seed(&mongo).await?;

    tracing::info!(
        "Database seeding completed: {} questions, demo quiz {} (room {})",
        summary.questions,
        summary.quiz_id,
        seed_service::DEMO_ROOM_ID
    );

    Ok(())
}
