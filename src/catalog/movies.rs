use async_trait::async_trait;
use futures::future::{join_all, try_join_all};
use log::{debug, info};
use std::sync::Arc;

use super::GenreService;
use crate::error::Result;
use crate::models::Movie;
use crate::tmdb::{MovieSource, TmdbMovie, TmdbPage, TOP_BILLED_CAST};

#[async_trait]
pub trait MovieService: Send + Sync {
    async fn latest_movies(&self) -> Result<Vec<Movie>>;

    async fn top_rated_movies(&self) -> Result<Vec<Movie>>;

    /// Free-text search, optionally narrowed to a genre by name. With only a
    /// genre, falls back to TMDB discover.
    async fn search_movies(&self, query: Option<&str>, genre: Option<&str>)
        -> Result<Vec<Movie>>;

    async fn movie_details(&self, id: i64) -> Result<Movie>;
}

/// Movie lookups backed by TMDB, with genre ids resolved to names and the
/// top-billed cast attached on details.
pub struct TmdbMovieService {
    source: Arc<dyn MovieSource>,
    genres: Arc<dyn GenreService>,
}

impl TmdbMovieService {
    pub fn new(source: Arc<dyn MovieSource>, genres: Arc<dyn GenreService>) -> Self {
        Self { source, genres }
    }

    /// Resolve ids in parallel. Unknown ids are dropped; the rest keep the
    /// order of `ids`.
    async fn genre_names(&self, ids: &[i64]) -> Result<Vec<String>> {
        let lookups = ids.iter().map(|id| self.genres.genre_name(*id));
        let mut names = Vec::with_capacity(ids.len());
        for resolved in join_all(lookups).await {
            if let Some(name) = resolved? {
                names.push(name);
            }
        }
        Ok(names)
    }

    async fn enrich(&self, dto: TmdbMovie) -> Result<Movie> {
        let mut movie = Movie::from(dto);
        movie.genres = self.genre_names(&movie.genre_ids).await?;
        Ok(movie)
    }

    async fn enrich_page(&self, page: TmdbPage<TmdbMovie>) -> Result<Vec<Movie>> {
        try_join_all(page.results.into_iter().map(|dto| self.enrich(dto))).await
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[async_trait]
impl MovieService for TmdbMovieService {
    async fn latest_movies(&self) -> Result<Vec<Movie>> {
        let page = self.source.now_playing().await?;
        self.enrich_page(page).await
    }

    async fn top_rated_movies(&self) -> Result<Vec<Movie>> {
        let page = self.source.top_rated().await?;
        self.enrich_page(page).await
    }

    async fn search_movies(
        &self,
        query: Option<&str>,
        genre: Option<&str>,
    ) -> Result<Vec<Movie>> {
        let query = non_blank(query);
        let genre = non_blank(genre);

        let genre_id = match genre {
            Some(name) => self.genres.genre_id(name).await?,
            None => None,
        };

        let page = match (query, genre_id) {
            (None, None) => {
                if let Some(name) = genre {
                    info!("Unknown genre '{}', returning no results", name);
                }
                return Ok(Vec::new());
            }
            (Some(query), genre_id) => {
                if genre.is_some() && genre_id.is_none() {
                    debug!("Ignoring unknown genre filter for query '{}'", query);
                }
                self.source.search(query, genre_id).await?
            }
            (None, Some(genre_id)) => self.source.discover(genre_id).await?,
        };

        self.enrich_page(page).await
    }

    async fn movie_details(&self, id: i64) -> Result<Movie> {
        let mut dto = self.source.details(id).await?;

        // The detail endpoint embeds genre objects instead of bare ids
        let embedded: Vec<_> = std::mem::take(&mut dto.genres)
            .into_iter()
            .filter(|genre| !genre.name.trim().is_empty())
            .collect();
        let credits = dto.credits.take();

        let mut movie = Movie::from(dto);
        if embedded.is_empty() {
            movie.genres = self.genre_names(&movie.genre_ids).await?;
        } else {
            if movie.genre_ids.is_empty() {
                movie.genre_ids = embedded.iter().map(|genre| genre.id).collect();
            }
            movie.genres = embedded.into_iter().map(|genre| genre.name).collect();
        }
        movie.cast = credits
            .map(|credits| credits.top_billed(TOP_BILLED_CAST))
            .unwrap_or_default();

        Ok(movie)
    }
}
