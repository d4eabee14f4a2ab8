//! Comment on a post.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::blog::Comment;
use crate::error::Result;
use crate::middleware::Identity;
use crate::router::Valid;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(length(
        min = 1,
        max = 2048,
        message = "Content must be 1 to 2048 characters long."
    ))]
    pub content: String,
}

/// Handler to attach a comment to a post.
pub async fn handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(blog_id): Path<String>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Comment>)> {
    let claims = identity.require()?;
    let blog = state.blogs().find_by_id(&blog_id).await?;

    let comment = state
        .blogs()
        .insert_comment(&blog.id, &body.content, &claims.sub)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use sqlx::{Pool, Postgres};

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/blogs.sql"))]
    async fn test_comment_on_post(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());
        let token = router::token_for(&state, "bob");

        let req_body = json!({ "content": "Great read." });
        let response = make_request(
            app.clone(),
            Method::POST,
            "/blogs/b2/comments",
            req_body.to_string(),
            Some(&token),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let comment: Comment = serde_json::from_slice(&body).unwrap();
        assert_eq!(comment.blog_id, "b2");
        assert_eq!(comment.created_by, "bob");

        // The comment shows up on the post read, with its author joined.
        let response = make_request(
            app,
            Method::GET,
            "/blogs/b2",
            String::default(),
            None,
        )
        .await;
        let view = response.into_body().collect().await.unwrap().to_bytes();
        let view: serde_json::Value = serde_json::from_slice(&view).unwrap();
        assert_eq!(view["comments"][0]["content"], "Great read.");
        assert_eq!(view["comments"][0]["author"], "Bob Stone");
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/blogs.sql"))]
    async fn test_comment_requires_session(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let req_body = json!({ "content": "Anonymous shout." });
        let response = make_request(
            app,
            Method::POST,
            "/blogs/b2/comments",
            req_body.to_string(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/blogs.sql"))]
    async fn test_comment_on_missing_post(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());
        let token = router::token_for(&state, "bob");

        let req_body = json!({ "content": "Where did it go?" });
        let response = make_request(
            app,
            Method::POST,
            "/blogs/ghost/comments",
            req_body.to_string(),
            Some(&token),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
