mod repository;

pub use repository::*;

use serde::{Deserialize, Serialize};

pub const ROLE_USER: &str = "user";

/// User as saved on database.
///
/// Follower, following and saved-post sets live in their own join tables
/// and are queried through [`UserRepository`].
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(skip)]
    pub salt: String,
    #[serde(skip)]
    pub password: String,
    pub avatar: Option<String>,
    pub role: String,
    pub bio: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
