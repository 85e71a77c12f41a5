//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use yatube_core::services::INDEX_CACHE_TTL;
use yatube_infra::JwtConfig;
use yatube_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Absent means the in-memory content store.
    pub database: Option<DatabaseConfig>,
    /// Absent means a per-process page cache.
    pub redis_url: Option<String>,
    /// Directory uploaded images are written to and served from.
    pub media_root: PathBuf,
    pub index_cache_ttl: Duration,
    pub jwt: JwtConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut config = DatabaseConfig::new(url);
            config.max_connections = parse_var("DB_MAX_CONNECTIONS").unwrap_or(100);
            config.min_connections = parse_var("DB_MIN_CONNECTIONS").unwrap_or(10);
            config
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./media")),
            index_cache_ttl: parse_var("INDEX_CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(INDEX_CACHE_TTL),
            jwt: JwtConfig::from_env(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}
