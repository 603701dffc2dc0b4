//! TMDB (The Movie Database) upstream: wire types, the HTTP client and the
//! two seams the catalog services depend on.

pub mod client;
pub mod dto;

pub use client::TmdbClient;
pub use dto::{
    TmdbCastMember, TmdbCredits, TmdbGenre, TmdbGenreList, TmdbMovie, TmdbPage, TOP_BILLED_CAST,
};

use async_trait::async_trait;

use crate::error::Result;

/// Movie endpoints of the upstream API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieSource: Send + Sync {
    /// `GET /movie/now_playing`
    async fn now_playing(&self) -> Result<TmdbPage<TmdbMovie>>;

    /// `GET /movie/top_rated`
    async fn top_rated(&self) -> Result<TmdbPage<TmdbMovie>>;

    /// `GET /search/movie?query=..[&with_genres=..]`
    async fn search(&self, query: &str, genre_id: Option<i64>) -> Result<TmdbPage<TmdbMovie>>;

    /// `GET /discover/movie?with_genres=..`
    async fn discover(&self, genre_id: i64) -> Result<TmdbPage<TmdbMovie>>;

    /// `GET /movie/{id}?append_to_response=credits`
    async fn details(&self, movie_id: i64) -> Result<TmdbMovie>;
}

/// Genre list endpoint of the upstream API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenreSource: Send + Sync {
    /// `GET /genre/movie/list`
    async fn movie_genres(&self) -> Result<Vec<TmdbGenre>>;
}
