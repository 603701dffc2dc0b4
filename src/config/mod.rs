pub mod settings;

pub use settings::{Config, GenreSourceKind};

use crate::error::AppError;
use std::sync::Arc;

/// Minimum HS256 key length in bytes.
pub const MIN_JWT_KEY_LEN: usize = 32;

/// Loads the application configuration from the environment (and `.env` when
/// present) and checks the values the server cannot start without.
pub fn load_config() -> Result<Arc<Config>, AppError> {
    dotenv::dotenv().ok(); // Load .env file if present, ignore errors

    let config = Config::from_env();
    validate(&config)?;
    config.validate_and_log();

    Ok(Arc::new(config))
}

pub fn validate(config: &Config) -> Result<(), AppError> {
    if config.tmdb_access_token.trim().is_empty() {
        return Err(AppError::ConfigError(
            "TMDB_ACCESS_TOKEN cannot be empty".to_string(),
        ));
    }
    if config.jwt_key.len() < MIN_JWT_KEY_LEN {
        return Err(AppError::ConfigError(format!(
            "JWT_KEY must be at least {} bytes",
            MIN_JWT_KEY_LEN
        )));
    }
    if config.jwt_expiry_hours <= 0 {
        return Err(AppError::ConfigError(
            "JWT_EXPIRY_HOURS must be positive".to_string(),
        ));
    }
    config.genre_source_kind()?;
    url::Url::parse(&config.tmdb_base_url)
        .map_err(|e| AppError::ConfigError(format!("TMDB_BASE_URL is invalid: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::from_env();
        config.tmdb_access_token = "token".to_string();
        config.tmdb_base_url = "https://api.themoviedb.org/3/".to_string();
        config.jwt_key = "k".repeat(MIN_JWT_KEY_LEN);
        config.jwt_expiry_hours = 1;
        config.genre_source = "tmdb".to_string();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_short_jwt_key_rejected() {
        let mut config = valid_config();
        config.jwt_key = "short".to_string();
        assert!(matches!(validate(&config), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_missing_tmdb_token_rejected() {
        let mut config = valid_config();
        config.tmdb_access_token = String::new();
        assert!(matches!(validate(&config), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_unknown_genre_source_rejected() {
        let mut config = valid_config();
        config.genre_source = "statc".to_string();
        match validate(&config) {
            Err(AppError::ConfigError(message)) => assert!(message.contains("statc")),
            other => panic!("expected config error, got {:?}", other),
        }

        config.genre_source = " Static ".to_string();
        assert!(validate(&config).is_ok());
        assert_eq!(config.genre_source_kind().unwrap(), GenreSourceKind::Static);
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let mut config = valid_config();
        config.tmdb_base_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(AppError::ConfigError(_))));
    }
}
