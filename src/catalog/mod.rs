//! Movie catalog: the lazily filled genre table and the services that turn
//! TMDB records into [`Movie`](crate::models::Movie) values.

pub mod genres;
pub mod movies;

pub use genres::{GenreService, StaticGenreService, TmdbGenreService};
pub use movies::{MovieService, TmdbMovieService};
