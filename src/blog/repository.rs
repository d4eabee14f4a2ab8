//! Handle database requests for posts, comments and like sets.

use sqlx::{Pool, Postgres};

use crate::blog::{Blog, Comment};
use crate::error::{Result, ServerError};

const BLOG_COLUMNS: &str =
    "id, title, body, cover_url, created_by, views, created_at, updated_at";

const COMMENT_COLUMNS: &str = "id, blog_id, content, created_by, created_at";

/// Base select joining like counts and the creator's display name.
fn select_blogs(filter: &str, tail: &str) -> String {
    format!(
        r#"SELECT
                b.id,
                b.title,
                b.body,
                b.cover_url,
                b.created_by,
                b.views,
                b.created_at,
                b.updated_at,
                COUNT(l.user_id) AS likes,
                u.full_name AS author
            FROM blogs b
            JOIN users u ON u.id = b.created_by
            LEFT JOIN likes l ON l.blog_id = b.id
            {filter}
            GROUP BY b.id, u.full_name
            {tail}"#
    )
}

#[derive(Clone)]
pub struct BlogRepository {
    pool: Pool<Postgres>,
}

impl BlogRepository {
    /// Create a new [`BlogRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a new post.
    pub async fn insert(
        &self,
        title: &str,
        body: &str,
        cover_url: Option<&str>,
        created_by: &str,
    ) -> Result<Blog> {
        let query = format!(
            r#"INSERT INTO blogs (id, title, body, cover_url, created_by)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {BLOG_COLUMNS}"#
        );

        Ok(sqlx::query_as::<_, Blog>(&query)
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(title)
            .bind(body)
            .bind(cover_url)
            .bind(created_by)
            .fetch_one(&self.pool)
            .await?)
    }

    /// Find a post with its like count and author name.
    pub async fn find_by_id(&self, blog_id: &str) -> Result<Blog> {
        let query = select_blogs("WHERE b.id = $1", "");

        sqlx::query_as::<_, Blog>(&query)
            .bind(blog_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ServerError::NotFound("blog"))
    }

    /// Count one view. Missing ids are a no-op, matching the read path.
    pub async fn touch_views(&self, blog_id: &str) -> Result<()> {
        sqlx::query("UPDATE blogs SET views = views + 1 WHERE id = $1")
            .bind(blog_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Update title and body; the cover image only when a new one is given.
    pub async fn update(
        &self,
        blog_id: &str,
        title: &str,
        body: &str,
        cover_url: Option<&str>,
    ) -> Result<Blog> {
        let query = format!(
            r#"UPDATE blogs
                SET title = $2, body = $3,
                    cover_url = COALESCE($4, cover_url),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING {BLOG_COLUMNS}"#
        );

        sqlx::query_as::<_, Blog>(&query)
            .bind(blog_id)
            .bind(title)
            .bind(body)
            .bind(cover_url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ServerError::NotFound("blog"))
    }

    /// Delete a post. Comments, likes and saved references cascade.
    pub async fn delete(&self, blog_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(blog_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound("blog"));
        }

        Ok(())
    }

    /// Full post collection, newest first.
    pub async fn list_all(&self) -> Result<Vec<Blog>> {
        let query = select_blogs("", "ORDER BY b.created_at DESC");

        Ok(sqlx::query_as::<_, Blog>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Posts created by one user, newest first.
    pub async fn list_by_creator(&self, user_id: &str) -> Result<Vec<Blog>> {
        let query =
            select_blogs("WHERE b.created_by = $1", "ORDER BY b.created_at DESC");

        Ok(sqlx::query_as::<_, Blog>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Posts the user bookmarked, newest first.
    pub async fn list_saved(&self, user_id: &str) -> Result<Vec<Blog>> {
        let query = select_blogs(
            r#"JOIN saved_blogs s ON s.blog_id = b.id AND s.user_id = $1"#,
            "ORDER BY b.created_at DESC",
        );

        Ok(sqlx::query_as::<_, Blog>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Newest posts other than the one being read.
    pub async fn related(&self, blog_id: &str, limit: i64) -> Result<Vec<Blog>> {
        let query = select_blogs(
            "WHERE b.id <> $1",
            "ORDER BY b.created_at DESC LIMIT $2",
        );

        Ok(sqlx::query_as::<_, Blog>(&query)
            .bind(blog_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Case-insensitive title or body match.
    pub async fn search(&self, term: &str) -> Result<Vec<Blog>> {
        let pattern = format!("%{}%", escape_like(term));
        let query = select_blogs(
            "WHERE b.title ILIKE $1 OR b.body ILIKE $1",
            "ORDER BY b.created_at DESC",
        );

        Ok(sqlx::query_as::<_, Blog>(&query)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Toggle `user_id` in the post's like set.
    ///
    /// The membership decision is made by the database, so two concurrent
    /// toggles from different users cannot lose each other's update.
    /// Returns `true` when the like now exists.
    pub async fn toggle_like(
        &self,
        blog_id: &str,
        user_id: &str,
    ) -> Result<bool> {
        let inserted = sqlx::query(
            r#"INSERT INTO likes (blog_id, user_id)
                VALUES ($1, $2) ON CONFLICT DO NOTHING"#,
        )
        .bind(blog_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 1 {
            return Ok(true);
        }

        sqlx::query("DELETE FROM likes WHERE blog_id = $1 AND user_id = $2")
            .bind(blog_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(false)
    }

    /// Current size of the post's like set.
    pub async fn like_count(&self, blog_id: &str) -> Result<i64> {
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM likes WHERE blog_id = $1",
        )
        .bind(blog_id)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Likes received across every post the user created.
    pub async fn total_likes_received(&self, user_id: &str) -> Result<i64> {
        Ok(sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM likes l
                JOIN blogs b ON b.id = l.blog_id
                WHERE b.created_by = $1"#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Attach a comment to a post.
    pub async fn insert_comment(
        &self,
        blog_id: &str,
        content: &str,
        created_by: &str,
    ) -> Result<Comment> {
        let query = format!(
            r#"INSERT INTO comments (id, blog_id, content, created_by)
                VALUES ($1, $2, $3, $4)
                RETURNING {COMMENT_COLUMNS}"#
        );

        Ok(sqlx::query_as::<_, Comment>(&query)
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(blog_id)
            .bind(content)
            .bind(created_by)
            .fetch_one(&self.pool)
            .await?)
    }

    /// Comments on a post with their authors' public fields, oldest first.
    pub async fn comments_for(&self, blog_id: &str) -> Result<Vec<Comment>> {
        Ok(sqlx::query_as::<_, Comment>(
            r#"SELECT
                    c.id,
                    c.blog_id,
                    c.content,
                    c.created_by,
                    u.full_name AS author,
                    u.avatar AS author_avatar,
                    c.created_at
                FROM comments c
                JOIN users u ON u.id = c.created_by
                WHERE c.blog_id = $1
                ORDER BY c.created_at ASC"#,
        )
        .bind(blog_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

/// Escape `LIKE` wildcards so search terms match literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
