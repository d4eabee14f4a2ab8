//! Bookmark toggle.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::Result;
use crate::middleware::Identity;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Saved,
    Unsaved,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
}

/// Toggle the post in the signed-in user's saved set.
pub async fn handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(blog_id): Path<String>,
) -> Result<Json<Response>> {
    let claims = identity.require()?;
    let blog = state.blogs().find_by_id(&blog_id).await?;

    let saved = state.users().toggle_save(&claims.sub, &blog.id).await?;

    Ok(Json(Response {
        status: if saved { Status::Saved } else { Status::Unsaved },
    }))
}
