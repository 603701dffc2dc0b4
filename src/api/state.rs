use log::{info, warn};
use std::sync::Arc;

use crate::auth::{AuthService, TokenIssuer};
use crate::cache::ResponseCache;
use crate::catalog::{
    GenreService, MovieService, StaticGenreService, TmdbGenreService, TmdbMovieService,
};
use crate::comments::CommentService;
use crate::config::{Config, GenreSourceKind};
use crate::error::Result;
use crate::storage::{Database, SqliteCommentRepository, SqliteUserStore};
use crate::tmdb::TmdbClient;

/// Shared handles for the request handlers.
#[derive(Clone)]
pub struct AppState {
    pub movies: Arc<dyn MovieService>,
    pub genres: Arc<dyn GenreService>,
    pub comments: Arc<CommentService>,
    pub auth: Arc<AuthService>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    /// Wire the services over an open database.
    pub fn new(
        db: Database,
        movies: Arc<dyn MovieService>,
        genres: Arc<dyn GenreService>,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        let comments = Arc::new(CommentService::new(
            Arc::new(SqliteCommentRepository::new(db.clone())),
            movies.clone(),
        ));
        let auth = Arc::new(AuthService::new(
            Arc::new(SqliteUserStore::new(db)),
            tokens.clone(),
        ));

        Self {
            movies,
            genres,
            comments,
            auth,
            tokens,
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        let db = Database::open(&config.database_path)?;

        let cache = match &config.redis_url {
            Some(url) => match ResponseCache::new(url, config.redis_default_ttl_secs).await {
                Ok(cache) => Some(cache),
                Err(e) => {
                    warn!("⚠️ Redis unavailable, continuing without response cache: {}", e);
                    None
                }
            },
            None => None,
        };

        let tmdb = Arc::new(TmdbClient::new(config, cache)?);

        let genres: Arc<dyn GenreService> = match config.genre_source_kind()? {
            GenreSourceKind::Tmdb => {
                let service = Arc::new(TmdbGenreService::new(tmdb.clone()));
                warm_up_genres(service.clone());
                service
            }
            GenreSourceKind::Static => {
                info!("Using built-in genre table");
                Arc::new(StaticGenreService::new())
            }
        };

        let movies = Arc::new(TmdbMovieService::new(tmdb, genres.clone()));
        let tokens = Arc::new(TokenIssuer::from_config(config));

        Ok(Self::new(db, movies, genres, tokens))
    }
}

/// Fill the genre table in the background so the first listing request does
/// not pay for it. A failure here is retried lazily on first use.
fn warm_up_genres(service: Arc<TmdbGenreService>) {
    tokio::spawn(async move {
        match service.all_genres().await {
            Ok(genres) => info!("🎬 Genre cache warmed with {} genres", genres.len()),
            Err(e) => warn!("Genre warm-up failed, will retry on demand: {}", e),
        }
    });
}
