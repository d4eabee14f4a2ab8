mod repository;

pub use repository::*;

use serde::{Deserialize, Serialize};

/// Blog post as saved on database.
///
/// `likes` and `author` are computed columns filled by the list and find
/// queries; inserts and updates return them as defaults.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: String,
    pub title: String,
    pub body: String,
    pub cover_url: Option<String>,
    pub created_by: String,
    pub views: i64,
    #[sqlx(default)]
    pub likes: i64,
    /// Display name of the creator.
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Comment on a blog post, joined with its author's public fields.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub blog_id: String,
    pub content: String,
    pub created_by: String,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
