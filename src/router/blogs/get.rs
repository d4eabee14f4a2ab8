//! Read a single post.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::blog::{Blog, Comment};
use crate::error::Result;
use crate::user::User;

const RELATED_LIMIT: i64 = 3;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub blog: Blog,
    pub author: Option<User>,
    pub comments: Vec<Comment>,
    pub related: Vec<Blog>,
}

/// Handler to read a post.
///
/// Every read counts one view, matching the original page load. The
/// increment lands before the fetch so the returned record is current.
pub async fn handler(
    State(state): State<AppState>,
    Path(blog_id): Path<String>,
) -> Result<Json<Response>> {
    state.blogs().touch_views(&blog_id).await?;

    let blog = state.blogs().find_by_id(&blog_id).await?;
    let author = state.users().find_by_id(&blog.created_by).await.ok();
    let comments = state.blogs().comments_for(&blog_id).await?;
    let related = state.blogs().related(&blog_id, RELATED_LIMIT).await?;

    Ok(Json(Response {
        blog,
        author,
        comments,
        related,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::{Pool, Postgres};

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/blogs.sql"))]
    async fn test_read_post(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let response = make_request(
            app,
            Method::GET,
            "/blogs/b1",
            String::default(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Response = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.blog.id, "b1");
        // Fixture seeds 4 views; this read is the fifth.
        assert_eq!(body.blog.views, 5);
        assert_eq!(body.blog.likes, 1);
        assert_eq!(body.blog.author.as_deref(), Some("Alice Ray"));
        assert_eq!(body.author.as_ref().map(|u| u.id.as_str()), Some("alice"));
        assert_eq!(body.comments.len(), 1);
        assert_eq!(body.comments[0].author.as_deref(), Some("Bob Stone"));
        assert!(body.related.iter().all(|b| b.id != "b1"));
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/blogs.sql"))]
    async fn test_read_unknown_post(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let response = make_request(
            app,
            Method::GET,
            "/blogs/ghost",
            String::default(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
