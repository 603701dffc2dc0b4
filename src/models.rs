//! Domain records served by the API. Field names go over the wire in
//! camelCase, which is what the browser client reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub poster_path: String,
    pub backdrop_path: String,
    pub release_date: String,
    pub vote_average: f64,
    pub vote_count: i64,
    pub popularity: f64,
    pub genre_ids: Vec<i64>,
    pub genres: Vec<String>,
    pub original_language: String,
    pub original_title: String,
    pub adult: bool,
    pub video: bool,
    pub cast: Vec<CastMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    pub character: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub movie_id: i64,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub user: CommentAuthor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    pub user_name: String,
}

/// A comment about to be stored; the id and timestamps come from storage.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub movie_id: i64,
    pub user_id: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub user_name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_comment_wire_format() {
        let comment = Comment {
            id: 7,
            movie_id: 550,
            user_id: "u-1".to_string(),
            content: "Great pacing".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            updated_at: None,
            user: CommentAuthor {
                user_name: "ana@example.com".to_string(),
            },
        };

        assert_eq!(
            serde_json::to_value(&comment).unwrap(),
            json!({
                "id": 7,
                "movieId": 550,
                "userId": "u-1",
                "content": "Great pacing",
                "createdAt": "2024-05-01T12:00:00Z",
                "updatedAt": null,
                "user": { "userName": "ana@example.com" }
            })
        );
    }

    #[test]
    fn test_cast_member_omits_missing_profile() {
        let member = CastMember {
            id: 1,
            name: "Edward Norton".to_string(),
            character: "Narrator".to_string(),
            profile_path: None,
        };
        let value = serde_json::to_value(&member).unwrap();
        assert!(value.get("profilePath").is_none());
    }
}
