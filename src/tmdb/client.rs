use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Client,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::{GenreSource, MovieSource, TmdbGenre, TmdbGenreList, TmdbMovie, TmdbPage};
use crate::{
    cache::ResponseCache,
    config::Config,
    error::{AppError, CircuitBreaker, Result, RetryPolicy},
};

const NOW_PLAYING_ENDPOINT: &str = "movie/now_playing";
const TOP_RATED_ENDPOINT: &str = "movie/top_rated";
const SEARCH_ENDPOINT: &str = "search/movie";
const DISCOVER_ENDPOINT: &str = "discover/movie";
const GENRE_LIST_ENDPOINT: &str = "genre/movie/list";

const CACHE_PREFIX: &str = "tmdb";
/// Longest slice of an upstream error body kept in the error message.
const ERROR_BODY_PREVIEW: usize = 200;

/// TMDB v3 client with retry, circuit breaking and an optional Redis
/// response cache in front of every GET.
pub struct TmdbClient {
    client: Client,
    base_url: Url,
    retry_policy: RetryPolicy,
    circuit_breaker: CircuitBreaker,
    cache: Option<ResponseCache>,
}

impl TmdbClient {
    pub fn new(config: &Config, cache: Option<ResponseCache>) -> Result<Self> {
        let retry_policy = RetryPolicy::new(
            config.tmdb_max_retries,
            Duration::from_millis(config.tmdb_retry_base_ms),
            Duration::from_secs(60),
        );
        let circuit_breaker =
            CircuitBreaker::new(config.circuit_breaker_threshold, config.circuit_breaker_reset());

        Self::with_policies(
            &config.tmdb_base_url,
            &config.tmdb_access_token,
            config.tmdb_timeout(),
            retry_policy,
            circuit_breaker,
            cache,
        )
    }

    pub fn with_policies(
        base_url: &str,
        access_token: &str,
        timeout: Duration,
        retry_policy: RetryPolicy,
        circuit_breaker: CircuitBreaker,
        cache: Option<ResponseCache>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|e| AppError::ConfigError(format!("Invalid TMDB access token: {}", e)))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .user_agent(concat!("movieapp-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "TMDB client initialized for {} (access token: {} chars, cache: {})",
            base_url,
            access_token.len(),
            if cache.is_some() { "redis" } else { "off" }
        );

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
            retry_policy,
            circuit_breaker,
            cache,
        })
    }

    /// Resolve an endpoint path against the base URL and attach query pairs.
    pub fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| AppError::Internal(format!("Bad TMDB endpoint '{}': {}", path, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint(path, query)?;
        let cache_key = ResponseCache::generate_key(CACHE_PREFIX, &[path, url.query().unwrap_or("")]);

        if let Some(cache) = &self.cache {
            match cache.get_raw(&cache_key).await {
                Ok(Some(body)) => match serde_json::from_str(&body) {
                    Ok(value) => return Ok(value),
                    Err(e) => warn!("Discarding unreadable cached body for {}: {}", cache_key, e),
                },
                Ok(None) => {}
                Err(e) => warn!("Cache lookup failed, fetching from TMDB: {}", e),
            }
        }

        let body = self
            .retry_policy
            .execute(|| self.circuit_breaker.execute(self.fetch_body(url.clone())))
            .await?;

        let value = serde_json::from_str(&body)?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_ex_raw(&cache_key, &body, None).await {
                warn!("Failed to cache TMDB response for {}: {}", cache_key, e);
            }
        }

        Ok(value)
    }

    async fn fetch_body(&self, url: Url) -> Result<String> {
        debug!("🔍 TMDB GET {}", url.path());

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            debug!("✅ TMDB {} answered {} ({} bytes)", url.path(), status, text.len());
            return Ok(text);
        }

        if status.as_u16() == 404 {
            return Err(AppError::NotFound(format!("TMDB resource {}", url.path())));
        }

        let preview: String = text.chars().take(ERROR_BODY_PREVIEW).collect();
        Err(AppError::Upstream {
            status: status.as_u16(),
            message: format!("TMDB {} failed: {}", url.path(), preview),
        })
    }
}

fn normalize_base_url(base_url: &str) -> Result<Url> {
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base).map_err(|e| AppError::ConfigError(format!("Invalid TMDB base URL: {}", e)))
}

#[async_trait]
impl MovieSource for TmdbClient {
    async fn now_playing(&self) -> Result<TmdbPage<TmdbMovie>> {
        self.get_json(NOW_PLAYING_ENDPOINT, &[]).await
    }

    async fn top_rated(&self) -> Result<TmdbPage<TmdbMovie>> {
        self.get_json(TOP_RATED_ENDPOINT, &[]).await
    }

    async fn search(&self, query: &str, genre_id: Option<i64>) -> Result<TmdbPage<TmdbMovie>> {
        let mut params = vec![("query", query.to_string())];
        if let Some(id) = genre_id {
            params.push(("with_genres", id.to_string()));
        }
        self.get_json(SEARCH_ENDPOINT, &params).await
    }

    async fn discover(&self, genre_id: i64) -> Result<TmdbPage<TmdbMovie>> {
        self.get_json(DISCOVER_ENDPOINT, &[("with_genres", genre_id.to_string())])
            .await
    }

    async fn details(&self, movie_id: i64) -> Result<TmdbMovie> {
        let path = format!("movie/{}", movie_id);
        self.get_json(&path, &[("append_to_response", "credits".to_string())])
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound(format!("Movie {}", movie_id)),
                other => other,
            })
    }
}

#[async_trait]
impl GenreSource for TmdbClient {
    async fn movie_genres(&self) -> Result<Vec<TmdbGenre>> {
        let list: TmdbGenreList = self.get_json(GENRE_LIST_ENDPOINT, &[]).await?;
        Ok(list.genres)
    }
}
