//! Edit a post.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::blog::Blog;
use crate::error::{Result, ServerError};
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
    /// Replaces the cover image only when provided.
    #[validate(length(max = 2048))]
    pub cover_image_url: Option<String>,
}

/// Handler to edit a post. Creator only.
pub async fn handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(blog_id): Path<String>,
    Valid(body): Valid<Body>,
) -> Result<Json<Blog>> {
    let blog = state.blogs().find_by_id(&blog_id).await?;
    if !identity.can_mutate(&blog.created_by) {
        return Err(ServerError::Forbidden);
    }

    let blog = state
        .blogs()
        .update(
            &blog_id,
            &body.title,
            &body.body,
            body.cover_image_url.as_deref(),
        )
        .await?;

    Ok(Json(blog))
}
