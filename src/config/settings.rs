use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

/// Where the genre table comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreSourceKind {
    /// Fetched once from TMDB `/genre/movie/list`
    Tmdb,
    /// Built-in table of the standard TMDB movie genres
    Static,
}

impl FromStr for GenreSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tmdb" => Ok(GenreSourceKind::Tmdb),
            "static" => Ok(GenreSourceKind::Static),
            other => Err(format!("unknown genre source '{}'", other)),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_path: String,
    pub cors_origin: String,
    pub log_level: String,

    pub tmdb_access_token: String,
    pub tmdb_base_url: String,
    pub tmdb_timeout_secs: u64,
    pub tmdb_max_retries: u32,
    pub tmdb_retry_base_ms: u64,
    pub circuit_breaker_threshold: u32,
    pub circuit_breaker_reset_secs: u64,
    /// Raw `GENRE_SOURCE` value, parsed by [`Config::genre_source_kind`]
    pub genre_source: String,

    pub jwt_key: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwt_expiry_hours: i64,

    pub redis_url: Option<String>,
    pub redis_default_ttl_secs: u64,
}

// Secrets stay out of the logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_port", &self.server_port)
            .field("database_path", &self.database_path)
            .field("cors_origin", &self.cors_origin)
            .field("log_level", &self.log_level)
            .field("tmdb_access_token", &redact(&self.tmdb_access_token))
            .field("tmdb_base_url", &self.tmdb_base_url)
            .field("tmdb_timeout_secs", &self.tmdb_timeout_secs)
            .field("tmdb_max_retries", &self.tmdb_max_retries)
            .field("tmdb_retry_base_ms", &self.tmdb_retry_base_ms)
            .field("circuit_breaker_threshold", &self.circuit_breaker_threshold)
            .field("circuit_breaker_reset_secs", &self.circuit_breaker_reset_secs)
            .field("genre_source", &self.genre_source)
            .field("jwt_key", &redact(&self.jwt_key))
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("redis_url", &self.redis_url)
            .field("redis_default_ttl_secs", &self.redis_default_ttl_secs)
            .finish()
    }
}

fn redact(secret: &str) -> String {
    if secret.is_empty() {
        "<unset>".to_string()
    } else {
        format!("<{} chars>", secret.len())
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            server_port: env_or("SERVER_PORT", 5083),
            database_path: env_string("DATABASE_PATH", "movieapp.db"),
            cors_origin: env_string("CORS_ORIGIN", "http://localhost:3000"),
            log_level: env_string("LOG_LEVEL", "info"),
            tmdb_access_token: env::var("TMDB_ACCESS_TOKEN").unwrap_or_default(),
            tmdb_base_url: env_string("TMDB_BASE_URL", "https://api.themoviedb.org/3/"),
            tmdb_timeout_secs: env_or("TMDB_TIMEOUT_SECS", 30),
            tmdb_max_retries: env_or("TMDB_MAX_RETRIES", 3),
            tmdb_retry_base_ms: env_or("TMDB_RETRY_BASE_MS", 1000),
            circuit_breaker_threshold: env_or("CIRCUIT_BREAKER_THRESHOLD", 5),
            circuit_breaker_reset_secs: env_or("CIRCUIT_BREAKER_RESET_SECS", 30),
            genre_source: env_string("GENRE_SOURCE", "tmdb"),
            jwt_key: env::var("JWT_KEY").unwrap_or_default(),
            jwt_issuer: env_string("JWT_ISSUER", "movieapp"),
            jwt_audience: env_string("JWT_AUDIENCE", "movieapp-client"),
            jwt_expiry_hours: env_or("JWT_EXPIRY_HOURS", 1),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
            redis_default_ttl_secs: env_or("REDIS_DEFAULT_TTL_SECS", 300),
        }
    }

    pub fn tmdb_timeout(&self) -> Duration {
        Duration::from_secs(self.tmdb_timeout_secs)
    }

    pub fn circuit_breaker_reset(&self) -> Duration {
        Duration::from_secs(self.circuit_breaker_reset_secs)
    }

    pub fn genre_source_kind(&self) -> Result<GenreSourceKind, AppError> {
        self.genre_source
            .parse()
            .map_err(|e| AppError::ConfigError(format!("GENRE_SOURCE: {}", e)))
    }

    pub fn validate_and_log(&self) {
        log::info!("Application Configuration Loaded: {:?}", self);
        if self.redis_url.is_none() {
            log::info!("REDIS_URL not set, TMDB response caching disabled");
        }
        if let Ok(GenreSourceKind::Static) = self.genre_source_kind() {
            log::info!("Using the built-in genre table instead of TMDB");
        }
    }
}
