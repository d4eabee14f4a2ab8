//! Create a new post.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::blog::Blog;
use crate::error::Result;
use crate::middleware::Identity;
use crate::router::Valid;

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be 1 to 200 characters long."
    ))]
    pub title: String,
    #[validate(length(min = 1, message = "Body is required."))]
    pub body: String,
    #[validate(length(max = 2048))]
    pub cover_image_url: Option<String>,
}

/// Handler to create a post owned by the signed-in user.
pub async fn handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Blog>)> {
    let claims = identity.require()?;

    let blog = state
        .blogs()
        .insert(
            &body.title,
            &body.body,
            body.cover_image_url.as_deref(),
            &claims.sub,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(blog)))
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use sqlx::{Pool, Postgres};

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_create_post(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());
        let token = router::token_for(&state, "alice");

        let req_body = json!({
            "title": "Hello",
            "body": "A first post.",
        });
        let response = make_request(
            app,
            Method::POST,
            "/blogs",
            req_body.to_string(),
            Some(&token),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let blog: Blog = serde_json::from_slice(&body).unwrap();
        assert_eq!(blog.title, "Hello");
        assert_eq!(blog.created_by, "alice");
        assert_eq!(blog.views, 0);
        assert_eq!(blog.likes, 0);
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_create_post_requires_session(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let req_body = json!({ "title": "Hello", "body": "A first post." });
        let response = make_request(
            app,
            Method::POST,
            "/blogs",
            req_body.to_string(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
