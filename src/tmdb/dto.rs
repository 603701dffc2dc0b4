//! TMDB v3 response structures.
//!
//! TMDB sends `null` for missing posters, backdrops and release dates, so the
//! string fields are optional here and flattened to empty strings when mapped
//! onto [`Movie`].

use serde::Deserialize;

use crate::models::{CastMember, Movie};

/// Number of billed cast members kept on a movie detail record.
pub const TOP_BILLED_CAST: usize = 5;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TmdbMovie {
    pub id: i64,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub vote_count: i64,
    pub popularity: f64,
    /// Present on list endpoints
    pub genre_ids: Vec<i64>,
    /// Present on the detail endpoint
    pub genres: Vec<TmdbGenre>,
    pub original_language: Option<String>,
    pub original_title: Option<String>,
    pub adult: bool,
    pub video: bool,
    /// Only with `append_to_response=credits`
    pub credits: Option<TmdbCredits>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbGenre {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbGenreList {
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TmdbCastMember {
    pub id: i64,
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
    pub order: i64,
}

/// Paginated list envelope shared by now_playing, top_rated, search and
/// discover. now_playing also carries a `dates` block we don't use.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage<T> {
    #[serde(default)]
    pub page: i64,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: i64,
    #[serde(default)]
    pub total_results: i64,
}

impl<T> Default for TmdbPage<T> {
    fn default() -> Self {
        Self {
            page: 1,
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }
}

impl TmdbCredits {
    /// Cast sorted by billing order, trimmed to `limit`.
    pub fn top_billed(mut self, limit: usize) -> Vec<CastMember> {
        self.cast.sort_by_key(|member| member.order);
        self.cast
            .into_iter()
            .take(limit)
            .map(|member| CastMember {
                id: member.id,
                name: member.name,
                character: member.character.unwrap_or_default(),
                profile_path: member.profile_path,
            })
            .collect()
    }
}

/// Genres and cast are left empty; the movie service fills them in.
impl From<TmdbMovie> for Movie {
    fn from(dto: TmdbMovie) -> Self {
        Movie {
            id: dto.id,
            title: dto.title.unwrap_or_default(),
            overview: dto.overview.unwrap_or_default(),
            poster_path: dto.poster_path.unwrap_or_default(),
            backdrop_path: dto.backdrop_path.unwrap_or_default(),
            release_date: dto.release_date.unwrap_or_default(),
            vote_average: dto.vote_average,
            vote_count: dto.vote_count,
            popularity: dto.popularity,
            genre_ids: dto.genre_ids,
            genres: Vec::new(),
            original_language: dto.original_language.unwrap_or_default(),
            original_title: dto.original_title.unwrap_or_default(),
            adult: dto.adult,
            video: dto.video,
            cast: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NOW_PLAYING: &str = r#"{
        "dates": { "maximum": "2024-06-12", "minimum": "2024-05-01" },
        "page": 1,
        "results": [
            {
                "adult": false,
                "backdrop_path": null,
                "genre_ids": [28, 878],
                "id": 603,
                "original_language": "en",
                "original_title": "The Matrix",
                "overview": "Set in the 22nd century...",
                "popularity": 83.1,
                "poster_path": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
                "release_date": "1999-03-30",
                "title": "The Matrix",
                "video": false,
                "vote_average": 8.2,
                "vote_count": 24000
            }
        ],
        "total_pages": 40,
        "total_results": 791
    }"#;

    #[test]
    fn test_parse_now_playing_page() {
        let page: TmdbPage<TmdbMovie> = serde_json::from_str(NOW_PLAYING).unwrap();
        assert_eq!(page.total_pages, 40);
        assert_eq!(page.results.len(), 1);

        let movie = Movie::from(page.results[0].clone());
        assert_eq!(movie.id, 603);
        assert_eq!(movie.title, "The Matrix");
        assert_eq!(movie.backdrop_path, "");
        assert_eq!(movie.genre_ids, vec![28, 878]);
        assert!(movie.genres.is_empty());
    }

    #[test]
    fn test_top_billed_orders_and_trims() {
        let credits: TmdbCredits = serde_json::from_str(
            r#"{ "cast": [
                { "id": 6, "name": "F", "character": "f", "order": 5 },
                { "id": 2, "name": "B", "character": "b", "order": 1 },
                { "id": 1, "name": "A", "character": null, "order": 0, "profile_path": "/a.jpg" },
                { "id": 4, "name": "D", "character": "d", "order": 3 },
                { "id": 3, "name": "C", "character": "c", "order": 2 },
                { "id": 5, "name": "E", "character": "e", "order": 4 }
            ] }"#,
        )
        .unwrap();

        let cast = credits.top_billed(TOP_BILLED_CAST);
        let ids: Vec<i64> = cast.iter().map(|member| member.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(cast[0].character, "");
        assert_eq!(cast[0].profile_path.as_deref(), Some("/a.jpg"));
    }
}
