use async_trait::async_trait;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::error::Result;
use crate::models::Genre;
use crate::tmdb::GenreSource;

/// Lookup between TMDB genre ids and display names.
#[async_trait]
pub trait GenreService: Send + Sync {
    async fn genre_name(&self, id: i64) -> Result<Option<String>>;

    /// Case-insensitive, whitespace-trimmed match on the display name.
    async fn genre_id(&self, name: &str) -> Result<Option<i64>>;

    /// Every known genre, sorted by id.
    async fn all_genres(&self) -> Result<Vec<Genre>>;
}

type GenreTable = HashMap<i64, String>;

/// Genre table fetched from TMDB on first use and kept for the life of the
/// process.
///
/// Concurrent first callers share one in-flight fetch. A failed fetch leaves
/// the cell empty so the next caller tries again.
pub struct TmdbGenreService {
    source: Arc<dyn GenreSource>,
    table: OnceCell<GenreTable>,
}

impl TmdbGenreService {
    pub fn new(source: Arc<dyn GenreSource>) -> Self {
        Self {
            source,
            table: OnceCell::new(),
        }
    }

    #[cfg(test)]
    fn is_loaded(&self) -> bool {
        self.table.initialized()
    }

    async fn table(&self) -> Result<&GenreTable> {
        self.table.get_or_try_init(|| self.load()).await
    }

    async fn load(&self) -> Result<GenreTable> {
        info!("🎬 Loading genre table from TMDB");
        let genres = self.source.movie_genres().await?;

        let mut table = HashMap::with_capacity(genres.len());
        for genre in genres {
            let name = genre.name.trim();
            if genre.id <= 0 || name.is_empty() {
                warn!("Skipping malformed genre entry (id={}, name={:?})", genre.id, genre.name);
                continue;
            }
            table.insert(genre.id, name.to_string());
        }

        info!("✅ Genre table loaded with {} entries", table.len());
        Ok(table)
    }
}

#[async_trait]
impl GenreService for TmdbGenreService {
    async fn genre_name(&self, id: i64) -> Result<Option<String>> {
        Ok(self.table().await?.get(&id).cloned())
    }

    async fn genre_id(&self, name: &str) -> Result<Option<i64>> {
        let wanted = name.trim();
        if wanted.is_empty() {
            return Ok(None);
        }
        Ok(find_id(self.table().await?, wanted))
    }

    async fn all_genres(&self) -> Result<Vec<Genre>> {
        Ok(sorted(self.table().await?))
    }
}

/// Lowest id wins when two entries share a name.
fn find_id(table: &GenreTable, wanted: &str) -> Option<i64> {
    let wanted = wanted.to_lowercase();
    let found = table
        .iter()
        .filter(|(_, name)| name.to_lowercase() == wanted)
        .map(|(id, _)| *id)
        .min();
    debug!("Genre lookup '{}' -> {:?}", wanted, found);
    found
}

fn sorted(table: &GenreTable) -> Vec<Genre> {
    let mut genres: Vec<Genre> = table
        .iter()
        .map(|(id, name)| Genre {
            id: *id,
            name: name.clone(),
        })
        .collect();
    genres.sort_by_key(|genre| genre.id);
    genres
}

const STANDARD_GENRES: [(i64, &str); 18] = [
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

/// Built-in table of the standard TMDB movie genres. Never touches the
/// network.
pub struct StaticGenreService {
    table: GenreTable,
}

impl StaticGenreService {
    pub fn new() -> Self {
        Self {
            table: STANDARD_GENRES
                .iter()
                .map(|(id, name)| (*id, name.to_string()))
                .collect(),
        }
    }
}

impl Default for StaticGenreService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenreService for StaticGenreService {
    async fn genre_name(&self, id: i64) -> Result<Option<String>> {
        Ok(self.table.get(&id).cloned())
    }

    async fn genre_id(&self, name: &str) -> Result<Option<i64>> {
        let wanted = name.trim();
        if wanted.is_empty() {
            return Ok(None);
        }
        Ok(find_id(&self.table, wanted))
    }

    async fn all_genres(&self) -> Result<Vec<Genre>> {
        Ok(sorted(&self.table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::tmdb::{MockGenreSource, TmdbGenre};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn genre(id: i64, name: &str) -> TmdbGenre {
        TmdbGenre {
            id,
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_lookups_against_fetched_table() {
        let mut source = MockGenreSource::new();
        source
            .expect_movie_genres()
            .times(1)
            .returning(|| Ok(vec![genre(28, "Action"), genre(878, "Science Fiction")]));

        let service = TmdbGenreService::new(Arc::new(source));
        assert!(!service.is_loaded());

        assert_eq!(service.genre_name(28).await.unwrap().as_deref(), Some("Action"));
        assert_eq!(service.genre_name(1).await.unwrap(), None);
        assert_eq!(service.genre_id("  science FICTION ").await.unwrap(), Some(878));
        assert_eq!(service.genre_id("Western").await.unwrap(), None);
        assert!(service.is_loaded());
    }

    #[tokio::test]
    async fn test_blank_name_skips_fetch() {
        let mut source = MockGenreSource::new();
        source.expect_movie_genres().never();

        let service = TmdbGenreService::new(Arc::new(source));
        assert_eq!(service.genre_id("   ").await.unwrap(), None);
        assert!(!service.is_loaded());
    }

    #[tokio::test]
    async fn test_malformed_entries_are_skipped() {
        let mut source = MockGenreSource::new();
        source.expect_movie_genres().returning(|| {
            Ok(vec![
                genre(0, "Zero"),
                genre(-3, "Negative"),
                genre(18, "  "),
                genre(35, "Comedy"),
            ])
        });

        let service = TmdbGenreService::new(Arc::new(source));
        let all = service.all_genres().await.unwrap();
        assert_eq!(
            all,
            vec![Genre {
                id: 35,
                name: "Comedy".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_all_genres_sorted_by_id() {
        let mut source = MockGenreSource::new();
        source
            .expect_movie_genres()
            .returning(|| Ok(vec![genre(878, "Science Fiction"), genre(12, "Adventure"), genre(28, "Action")]));

        let service = TmdbGenreService::new(Arc::new(source));
        let ids: Vec<i64> = service.all_genres().await.unwrap().iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![12, 28, 878]);
    }

    /// Counts fetches and fails the first `fail_first` of them.
    struct CountingSource {
        calls: AtomicUsize,
        fail_first: usize,
    }

    #[async_trait]
    impl GenreSource for CountingSource {
        async fn movie_genres(&self) -> Result<Vec<TmdbGenre>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            if call < self.fail_first {
                return Err(AppError::NetworkError("connection reset".to_string()));
            }
            Ok(vec![genre(28, "Action")])
        }
    }

    #[tokio::test]
    async fn test_concurrent_first_callers_share_one_fetch() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail_first: 0,
        });
        let service = Arc::new(TmdbGenreService::new(source.clone()));

        let lookups = (0..16).map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.genre_name(28).await })
        });
        for result in futures::future::join_all(lookups).await {
            assert_eq!(result.unwrap().unwrap().as_deref(), Some("Action"));
        }

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_retried_on_next_call() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail_first: 1,
        });
        let service = TmdbGenreService::new(source.clone());

        assert!(matches!(
            service.genre_name(28).await,
            Err(AppError::NetworkError(_))
        ));
        assert!(!service.is_loaded());

        assert_eq!(service.genre_name(28).await.unwrap().as_deref(), Some("Action"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        service.genre_name(28).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_static_table() {
        let service = StaticGenreService::new();
        let all = service.all_genres().await.unwrap();
        assert_eq!(all.len(), 18);
        assert_eq!(all.first().map(|g| g.id), Some(12));
        assert_eq!(service.genre_id("science fiction").await.unwrap(), Some(878));
        assert_eq!(service.genre_name(10751).await.unwrap().as_deref(), Some("Family"));
        assert_eq!(service.genre_id("").await.unwrap(), None);
    }
}
