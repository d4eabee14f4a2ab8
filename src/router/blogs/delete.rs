//! Delete a post and its comments.

use axum::extract::{Path, State};
use axum::Extension;

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::middleware::Identity;

/// Handler to delete a post. Creator only; comments, likes and saved
/// references go with it.
pub async fn handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(blog_id): Path<String>,
) -> Result<()> {
    let blog = state.blogs().find_by_id(&blog_id).await?;
    if !identity.can_mutate(&blog.created_by) {
        return Err(ServerError::Forbidden);
    }

    state.blogs().delete(&blog_id).await
}

#[cfg(test)]
mod tests {
    use crate::*;
    use axum::http::{Method, StatusCode};
    use sqlx::{Pool, Postgres};

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/blogs.sql"))]
    async fn test_creator_can_delete(pool: Pool<Postgres>) {
        let state = router::state(pool.clone());
        let app = app(state.clone());
        let token = router::token_for(&state, "alice");

        let response = make_request(
            app.clone(),
            Method::DELETE,
            "/blogs/b1",
            String::default(),
            Some(&token),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = make_request(
            app,
            Method::GET,
            "/blogs/b1",
            String::default(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Comments on the deleted post are gone too.
        let comments: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM comments WHERE blog_id = 'b1'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(comments, 0);
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/blogs.sql"))]
    async fn test_other_user_cannot_delete(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());
        let token = router::token_for(&state, "bob");

        let response = make_request(
            app.clone(),
            Method::DELETE,
            "/blogs/b1",
            String::default(),
            Some(&token),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = make_request(
            app,
            Method::GET,
            "/blogs/b1",
            String::default(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
