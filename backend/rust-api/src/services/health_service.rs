use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use mongodb::bson::doc;
use mongodb::Database;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::metrics::HEALTH_CHECKS_TOTAL;
use crate::models::health::{DependencyStatus, HealthStatus, OverallStatus, ServiceStatuses};

/// A single dependency check. Implementations must not fail; they report `Error` instead.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    fn name(&self) -> &'static str;
    async fn check(&self) -> DependencyStatus;
}

pub struct MongoProbe {
    mongo: Database,
    timeout: Duration,
}

impl MongoProbe {
    pub fn new(mongo: Database) -> Self {
        Self {
            mongo,
            timeout: Duration::from_secs(1),
        }
    }
}

#[async_trait]
impl HealthProbe for MongoProbe {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn check(&self) -> DependencyStatus {
        match tokio::time::timeout(self.timeout, self.mongo.run_command(doc! { "ping": 1 })).await {
            Ok(Ok(_)) => DependencyStatus::Connected,
            Ok(Err(e)) => {
                tracing::error!("Database health check failed: {}", e);
                DependencyStatus::Error
            }
            Err(_) => {
                tracing::error!("Database health check timed out after {:?}", self.timeout);
                DependencyStatus::Error
            }
        }
    }
}

pub struct RedisProbe {
    redis: ConnectionManager,
    timeout: Duration,
}

impl RedisProbe {
    pub fn new(redis: ConnectionManager) -> Self {
        Self {
            redis,
            timeout: Duration::from_millis(500),
        }
    }
}

#[async_trait]
impl HealthProbe for RedisProbe {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn check(&self) -> DependencyStatus {
        let mut conn = self.redis.clone();
        match tokio::time::timeout(
            self.timeout,
            redis::cmd("PING").query_async::<String>(&mut conn),
        )
        .await
        {
            Ok(Ok(reply)) if reply == "PONG" => DependencyStatus::Connected,
            Ok(Ok(reply)) => {
                tracing::error!("Redis health check got unexpected reply: {}", reply);
                DependencyStatus::Error
            }
            Ok(Err(e)) => {
                tracing::error!("Redis health check failed: {}", e);
                DependencyStatus::Error
            }
            Err(_) => {
                tracing::error!("Redis health check timed out after {:?}", self.timeout);
                DependencyStatus::Error
            }
        }
    }
}

pub struct HealthReporter {
    database: Arc<dyn HealthProbe>,
    cache: Arc<dyn HealthProbe>,
    environment: String,
    started_at: Instant,
}

impl HealthReporter {
    pub fn new(
        database: Arc<dyn HealthProbe>,
        cache: Arc<dyn HealthProbe>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            database,
            cache,
            environment: environment.into(),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Never fails: unreachable dependencies are reported as `error` in the payload.
    pub async fn check_health(&self) -> HealthStatus {
        let start = Instant::now();
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let (database, redis) = tokio::join!(
            run_probe(self.database.as_ref()),
            run_probe(self.cache.as_ref())
        );

        let status = if database == DependencyStatus::Connected && redis == DependencyStatus::Connected
        {
            OverallStatus::Healthy
        } else {
            OverallStatus::Degraded
        };

        if status == OverallStatus::Degraded {
            tracing::warn!(
                "Health degraded: database={}, redis={}",
                database.as_str(),
                redis.as_str()
            );
        }

        HealthStatus {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp,
            environment: self.environment.clone(),
            services: ServiceStatuses { database, redis },
            uptime: self.uptime_seconds(),
            response_time: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}

async fn run_probe(probe: &dyn HealthProbe) -> DependencyStatus {
    let status = probe.check().await;
    HEALTH_CHECKS_TOTAL
        .with_label_values(&[probe.name(), status.as_str()])
        .inc();
    status
}
