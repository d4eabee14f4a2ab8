//! Home, archive and search views.
//!
//! All three are simple sorts over the full post collection, computed
//! per request; the home sections are ranked in memory after one fetch.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::blog::Blog;
use crate::error::Result;

const LATEST_LIMIT: usize = 6;
const SLIDER_LIMIT: usize = 5;
const TRENDING_LIMIT: usize = 4;
const DEEP_DIVES_LIMIT: usize = 4;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeResponse {
    /// Newest posts.
    pub latest: Vec<Blog>,
    /// Most liked, for the top slider.
    pub slider: Vec<Blog>,
    /// Talk of the town: views plus twice the likes.
    pub trending: Vec<Blog>,
    /// Longest reads.
    pub deep_dives: Vec<Blog>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<Blog>,
}

/// Home view built from one pass over the collection.
pub async fn home(State(state): State<AppState>) -> Result<Json<HomeResponse>> {
    let all = state.blogs().list_all().await?;

    Ok(Json(HomeResponse {
        latest: all.iter().take(LATEST_LIMIT).cloned().collect(),
        slider: top_by(&all, SLIDER_LIMIT, |blog| blog.likes),
        trending: top_by(&all, TRENDING_LIMIT, trending_score),
        deep_dives: top_by(&all, DEEP_DIVES_LIMIT, |blog| blog.body.len() as i64),
    }))
}

/// The archive page: every post, newest first.
pub async fn archive(State(state): State<AppState>) -> Result<Json<Vec<Blog>>> {
    Ok(Json(state.blogs().list_all().await?))
}

/// Case-insensitive title/body search. An empty query matches nothing.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>> {
    let query = params.query.unwrap_or_default();
    let results = if query.is_empty() {
        Vec::new()
    } else {
        state.blogs().search(&query).await?
    };

    Ok(Json(SearchResponse { query, results }))
}

fn trending_score(blog: &Blog) -> i64 {
    blog.views + blog.likes * 2
}

/// Highest `key` first, ties keeping collection order.
fn top_by(blogs: &[Blog], limit: usize, key: impl Fn(&Blog) -> i64) -> Vec<Blog> {
    let mut ranked = blogs.to_vec();
    ranked.sort_by_key(|blog| std::cmp::Reverse(key(blog)));
    ranked.truncate(limit);

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::{Pool, Postgres};

    fn blog(id: &str, views: i64, likes: i64, body: &str) -> Blog {
        Blog {
            id: id.to_owned(),
            title: id.to_owned(),
            body: body.to_owned(),
            views,
            likes,
            ..Default::default()
        }
    }

    #[test]
    fn test_trending_weights_likes_double() {
        let blogs = vec![
            blog("views-heavy", 10, 0, ""),
            blog("likes-heavy", 0, 6, ""),
            blog("quiet", 1, 1, ""),
        ];

        let ranked = top_by(&blogs, 2, trending_score);
        assert_eq!(ranked[0].id, "likes-heavy"); // 12 beats 10.
        assert_eq!(ranked[1].id, "views-heavy");
    }

    #[test]
    fn test_top_by_truncates_and_keeps_order_on_ties() {
        let blogs = vec![
            blog("first", 0, 3, ""),
            blog("second", 0, 3, ""),
            blog("third", 0, 1, ""),
        ];

        let ranked = top_by(&blogs, 2, |b| b.likes);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, "first");
        assert_eq!(ranked[1].id, "second");
    }

    #[test]
    fn test_deep_dives_rank_by_body_length() {
        let blogs = vec![
            blog("short", 100, 100, "abc"),
            blog("long", 0, 0, "a very long body indeed"),
        ];

        let ranked = top_by(&blogs, 1, |b| b.body.len() as i64);
        assert_eq!(ranked[0].id, "long");
    }

    #[sqlx::test(fixtures("../../fixtures/users.sql", "../../fixtures/blogs.sql"))]
    async fn test_home_sections(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let response =
            make_request(app, Method::GET, "/feed", String::default(), None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: HomeResponse = serde_json::from_slice(&body).unwrap();

        // Newest first.
        assert_eq!(body.latest[0].id, "b3");
        // b2 has ten views and no likes, b1 has four views and one like.
        assert_eq!(body.trending[0].id, "b2");
        // Only b1 carries a like.
        assert_eq!(body.slider[0].id, "b1");
        assert_eq!(body.deep_dives.len(), 3);
    }

    #[sqlx::test(fixtures("../../fixtures/users.sql", "../../fixtures/blogs.sql"))]
    async fn test_archive_newest_first(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let response =
            make_request(app, Method::GET, "/blogs", String::default(), None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let blogs: Vec<Blog> = serde_json::from_slice(&body).unwrap();
        assert_eq!(blogs.len(), 3);
        assert_eq!(blogs[0].id, "b3");
        assert!(blogs.iter().all(|b| b.author.is_some()));
    }

    #[sqlx::test(fixtures("../../fixtures/users.sql", "../../fixtures/blogs.sql"))]
    async fn test_search_matches_title_and_body(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let response = make_request(
            app.clone(),
            Method::GET,
            "/search?query=RUST",
            String::default(),
            None,
        )
        .await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: SearchResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.results.len(), 1);
        assert_eq!(body.results[0].id, "b2");

        // Empty queries match nothing instead of everything.
        let response = make_request(
            app,
            Method::GET,
            "/search",
            String::default(),
            None,
        )
        .await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: SearchResponse = serde_json::from_slice(&body).unwrap();
        assert!(body.results.is_empty());
    }
}
