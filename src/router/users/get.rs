//! Public and own profile pages.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::blog::Blog;
use crate::error::Result;
use crate::middleware::Identity;
use crate::user::User;

const TAB_WORK: &str = "work";
const TAB_SAVED: &str = "saved";
const TAB_ABOUT: &str = "about";

#[derive(Debug, Deserialize)]
pub struct Tab {
    tab: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub user: User,
    pub blogs: Vec<Blog>,
    pub total_likes: i64,
    pub followers: i64,
    pub following: i64,
    pub is_owner: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_tab: Option<String>,
}

async fn profile(
    state: &AppState,
    user: User,
    blogs: Vec<Blog>,
    is_owner: bool,
    current_tab: Option<String>,
) -> Result<Response> {
    // Total likes always count the user's own work, not the rendered tab.
    let total_likes = state.blogs().total_likes_received(&user.id).await?;
    let followers = state.users().follower_count(&user.id).await?;
    let following = state.users().following_count(&user.id).await?;

    Ok(Response {
        user,
        blogs,
        total_likes,
        followers,
        following,
        is_owner,
        current_tab,
    })
}

/// View someone's public profile.
pub async fn handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<String>,
) -> Result<Json<Response>> {
    let user = state.users().find_by_id(&user_id).await?;
    let blogs = state.blogs().list_by_creator(&user.id).await?;
    let is_owner = identity.can_mutate(&user.id);

    Ok(Json(profile(&state, user, blogs, is_owner, None).await?))
}

/// View the signed-in user's profile, with work/saved/about tabs.
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<Tab>,
) -> Result<Json<Response>> {
    let claims = identity.require()?;
    let user = state.users().find_by_id(&claims.sub).await?;

    let tab = query.tab.unwrap_or_else(|| TAB_WORK.to_owned());
    let blogs = match tab.as_str() {
        TAB_SAVED => state.blogs().list_saved(&user.id).await?,
        TAB_ABOUT => Vec::new(),
        _ => state.blogs().list_by_creator(&user.id).await?,
    };

    Ok(Json(profile(&state, user, blogs, true, Some(tab)).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::{Pool, Postgres};

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/blogs.sql"))]
    async fn test_public_profile(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let response = make_request(
            app,
            Method::GET,
            "/users/alice",
            String::default(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Response = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.user.id, "alice");
        assert_eq!(body.blogs.len(), 2);
        assert_eq!(body.total_likes, 1);
        assert!(!body.is_owner);
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/blogs.sql"))]
    async fn test_own_profile_tabs(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());
        let token = router::token_for(&state, "alice");

        let response = make_request(
            app.clone(),
            Method::GET,
            "/users/@me",
            String::default(),
            Some(&token),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Response = serde_json::from_slice(&body).unwrap();
        assert!(body.is_owner);
        assert_eq!(body.current_tab.as_deref(), Some("work"));
        assert_eq!(body.blogs.len(), 2);

        let response = make_request(
            app,
            Method::GET,
            "/users/@me?tab=saved",
            String::default(),
            Some(&token),
        )
        .await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Response = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.blogs.len(), 1);
        assert_eq!(body.blogs[0].id, "b3");
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_me_requires_session(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        // No cookie at all.
        let response = make_request(
            app.clone(),
            Method::GET,
            "/users/@me",
            String::default(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // A tampered cookie silently degrades to anonymous.
        let response = make_request(
            app,
            Method::GET,
            "/users/@me",
            String::default(),
            Some("garbage-token"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_unknown_profile(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let response = make_request(
            app,
            Method::GET,
            "/users/ghost",
            String::default(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
