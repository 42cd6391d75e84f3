use serde::Deserialize;
use std::env;

const DEFAULT_SESSION_TTL_SECONDS: u64 = 3600;

/// `/metrics` Basic auth credentials used when `METRICS_AUTH` is unset.
/// Only accepted outside production.
pub const DEFAULT_METRICS_AUTH: &str = "admin:changeme";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub environment: String,
    pub bind_addr: String,
    pub mongo_uri: String,
    pub mongo_database: String,
    pub redis_uri: String,
    pub session_ttl_seconds: u64,
    pub tiktok_api_url: String,
    pub tiktok_api_key: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Root .env first (two levels up), then local .env
        if env::var("SKIP_ROOT_ENV").is_ok() || dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        // config/*.toml + ENV overrides (prefix: APP_)
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "quizztok".to_string());

        let redis_uri = settings
            .get_string("redis.uri")
            .or_else(|_| env::var("REDIS_URI"))
            .unwrap_or_else(|_| redis_uri_from_parts());

        let session_ttl_seconds = match settings.get_int("redis.session_ttl_seconds") {
            Ok(ttl) => u64::try_from(ttl).ok().filter(|ttl| *ttl > 0).ok_or_else(|| {
                config::ConfigError::Message(format!("redis.session_ttl_seconds must be positive, got {}", ttl))
            })?,
            Err(_) => env::var("SESSION_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_SESSION_TTL_SECONDS),
        };

        let tiktok_api_url = settings
            .get_string("tiktok.api_url")
            .or_else(|_| env::var("TIKTOK_API_URL"))
            .unwrap_or_else(|_| "http://localhost:8090".to_string());

        let tiktok_api_key = settings
            .get_string("tiktok.api_key")
            .or_else(|_| env::var("TIKTOK_API_KEY"))
            .unwrap_or_default();

        if tiktok_api_key.is_empty() {
            if environment == "production" {
                return Err(config::ConfigError::NotFound(
                    "TIKTOK_API_KEY must be set in production".to_string(),
                ));
            }
            tracing::warn!("TIKTOK_API_KEY not set, video source requests will be unauthenticated");
        }

        if environment == "production" {
            match env::var("METRICS_AUTH") {
                Ok(auth) if auth.contains(':') && auth != DEFAULT_METRICS_AUTH => {}
                _ => {
                    return Err(config::ConfigError::NotFound(
                        "METRICS_AUTH must be set to non-default user:password credentials in production"
                            .to_string(),
                    ))
                }
            }
        }

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or_else(|_| "0.0.0.0:3001".to_string());

        Ok(Config {
            environment,
            bind_addr,
            mongo_uri,
            mongo_database,
            redis_uri,
            session_ttl_seconds,
            tiktok_api_url,
            tiktok_api_key,
        })
    }
}

fn redis_uri_from_parts() -> String {
    let host = env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
    match env::var("REDIS_PASSWORD") {
        Ok(password) if !password.is_empty() => format!("redis://:{}@{}:{}/0", password, host, port),
        _ => format!("redis://{}:{}/0", host, port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "APP_ENV",
        "MONGO_URI",
        "MONGO_DATABASE",
        "REDIS_URI",
        "REDIS_HOST",
        "REDIS_PORT",
        "REDIS_PASSWORD",
        "SESSION_TTL_SECONDS",
        "TIKTOK_API_URL",
        "TIKTOK_API_KEY",
        "BIND_ADDR",
        "METRICS_AUTH",
    ];

    fn clear_env() {
        env::set_var("SKIP_ROOT_ENV", "1");
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_without_env() {
        clear_env();
        let config = Config::load().unwrap();

        assert_eq!(config.environment, "development");
        assert_eq!(config.mongo_database, "quizztok");
        assert_eq!(config.redis_uri, "redis://localhost:6379/0");
        assert_eq!(config.session_ttl_seconds, DEFAULT_SESSION_TTL_SECONDS);
        assert_eq!(config.bind_addr, "0.0.0.0:3001");
    }

    #[test]
    #[serial]
    fn redis_uri_built_from_host_and_port() {
        clear_env();
        env::set_var("REDIS_HOST", "cache.internal");
        env::set_var("REDIS_PORT", "6380");
        env::set_var("REDIS_PASSWORD", "s3cret");

        let config = Config::load().unwrap();
        assert_eq!(config.redis_uri, "redis://:s3cret@cache.internal:6380/0");
        clear_env();
    }

    #[test]
    #[serial]
    fn invalid_ttl_falls_back_to_default() {
        clear_env();
        env::set_var("SESSION_TTL_SECONDS", "-5");

        let config = Config::load().unwrap();
        assert_eq!(config.session_ttl_seconds, DEFAULT_SESSION_TTL_SECONDS);
        clear_env();
    }

    #[test]
    #[serial]
    fn production_requires_api_key() {
        clear_env();
        env::set_var("APP_ENV", "production");

        env::set_var("METRICS_AUTH", "ops:secret");
        assert!(Config::load().is_err());

        env::set_var("TIKTOK_API_KEY", "key");
        let config = Config::load().unwrap();
        assert_eq!(config.environment, "production");
        clear_env();
    }

    #[test]
    #[serial]
    fn production_requires_metrics_credentials() {
        clear_env();
        env::set_var("APP_ENV", "production");
        env::set_var("TIKTOK_API_KEY", "key");

        let err = Config::load().unwrap_err();
        assert!(err.to_string().contains("METRICS_AUTH"));

        env::set_var("METRICS_AUTH", DEFAULT_METRICS_AUTH);
        assert!(Config::load().is_err());

        env::set_var("METRICS_AUTH", "no-separator");
        assert!(Config::load().is_err());

        env::set_var("METRICS_AUTH", "ops:secret");
        assert!(Config::load().is_ok());
        clear_env();
    }

    #[test]
    #[serial]
    fn development_allows_default_metrics_credentials() {
        clear_env();
        assert!(Config::load().is_ok());
    }
}
