//! Like toggle.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::Result;
use crate::middleware::Identity;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Liked,
    Unliked,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    pub likes: i64,
}

/// Toggle the signed-in user in the post's like set.
pub async fn handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(blog_id): Path<String>,
) -> Result<Json<Response>> {
    let claims = identity.require()?;
    let blog = state.blogs().find_by_id(&blog_id).await?;

    let liked = state.blogs().toggle_like(&blog.id, &claims.sub).await?;

    Ok(Json(Response {
        status: if liked { Status::Liked } else { Status::Unliked },
        likes: state.blogs().like_count(&blog.id).await?,
    }))
}
