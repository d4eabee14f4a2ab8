//! Handle database requests for user records and their member sets.

use sqlx::{Pool, Postgres};

use crate::crypto;
use crate::error::{Result, ServerError};
use crate::user::{ROLE_USER, User};

const DEFAULT_AVATAR: &str = "/images/default.jpeg";
const DEFAULT_BIO: &str =
    "Keeper of the Akashic Records. Documenting the anomalies of the digital universe.";

const USER_COLUMNS: &str =
    "id, full_name, email, salt, password, avatar, role, bio, created_at, updated_at";

#[derive(Clone)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    /// Create a new [`UserRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a new user.
    ///
    /// Salt and digest are derived here, the only place a password enters
    /// a fresh record. Duplicate emails surface as
    /// [`ServerError::DuplicateEmail`].
    pub async fn insert(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        avatar: Option<String>,
    ) -> Result<User> {
        let hashed = crypto::hash(password);
        let query = format!(
            r#"INSERT INTO users (id, full_name, email, salt, password, avatar, role, bio)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {USER_COLUMNS}"#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(full_name)
            .bind(email)
            .bind(hashed.salt)
            .bind(hashed.digest)
            .bind(avatar.unwrap_or_else(|| DEFAULT_AVATAR.to_owned()))
            .bind(ROLE_USER)
            .bind(DEFAULT_BIO)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    ServerError::DuplicateEmail
                },
                err => err.into(),
            })
    }

    /// Find current user using `id` field.
    pub async fn find_by_id(&self, user_id: &str) -> Result<User> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ServerError::NotFound("user"))
    }

    /// Find current user using `email` field.
    ///
    /// Returns `None` rather than an error so signin can collapse unknown
    /// emails and wrong passwords into one reply.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        Ok(sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Update profile fields, leaving salt and digest untouched.
    pub async fn update_profile(
        &self,
        user_id: &str,
        full_name: Option<&str>,
        bio: Option<&str>,
        avatar: Option<&str>,
    ) -> Result<User> {
        let query = format!(
            r#"UPDATE users
                SET full_name = COALESCE($2, full_name),
                    bio = COALESCE($3, bio),
                    avatar = COALESCE($4, avatar),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING {USER_COLUMNS}"#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(full_name)
            .bind(bio)
            .bind(avatar)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ServerError::NotFound("user"))
    }

    /// Re-derive salt and digest for a changed password.
    pub async fn update_password(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<()> {
        let hashed = crypto::hash(password);

        let result = sqlx::query(
            "UPDATE users SET salt = $2, password = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(hashed.salt)
        .bind(hashed.digest)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound("user"));
        }

        Ok(())
    }

    /// Toggle `follower` following `followed`.
    ///
    /// The membership decision is made by the database: an insert that
    /// affects no row means the edge already existed, so the toggle
    /// becomes a delete. Returns `true` when the edge now exists.
    pub async fn toggle_follow(
        &self,
        follower_id: &str,
        followed_id: &str,
    ) -> Result<bool> {
        let inserted = sqlx::query(
            r#"INSERT INTO follows (follower_id, followed_id)
                VALUES ($1, $2) ON CONFLICT DO NOTHING"#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 1 {
            return Ok(true);
        }

        sqlx::query(
            "DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2",
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(&self.pool)
        .await?;

        Ok(false)
    }

    /// Number of users following `user_id`.
    pub async fn follower_count(&self, user_id: &str) -> Result<i64> {
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM follows WHERE followed_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Number of users `user_id` follows.
    pub async fn following_count(&self, user_id: &str) -> Result<i64> {
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM follows WHERE follower_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Toggle a post in the user's saved set. Returns `true` when the
    /// post is now saved.
    pub async fn toggle_save(
        &self,
        user_id: &str,
        blog_id: &str,
    ) -> Result<bool> {
        let inserted = sqlx::query(
            r#"INSERT INTO saved_blogs (user_id, blog_id)
                VALUES ($1, $2) ON CONFLICT DO NOTHING"#,
        )
        .bind(user_id)
        .bind(blog_id)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 1 {
            return Ok(true);
        }

        sqlx::query(
            "DELETE FROM saved_blogs WHERE user_id = $1 AND blog_id = $2",
        )
        .bind(user_id)
        .bind(blog_id)
        .execute(&self.pool)
        .await?;

        Ok(false)
    }
}
