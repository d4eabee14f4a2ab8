//! Follow/unfollow toggle.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::Result;
use crate::middleware::Identity;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Followed,
    Unfollowed,
    /// Self-follow attempt; neither side's sets were touched.
    Noop,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    pub followers: i64,
}

/// Toggle following the target user.
pub async fn handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<String>,
) -> Result<Json<Response>> {
    let claims = identity.require()?;
    let target = state.users().find_by_id(&user_id).await?;

    // Following yourself is reported as a no-op, not an error.
    if claims.can_mutate(&target.id) {
        return Ok(Json(Response {
            status: Status::Noop,
            followers: state.users().follower_count(&target.id).await?,
        }));
    }

    let followed = state
        .users()
        .toggle_follow(&claims.sub, &target.id)
        .await?;

    Ok(Json(Response {
        status: if followed {
            Status::Followed
        } else {
            Status::Unfollowed
        },
        followers: state.users().follower_count(&target.id).await?,
    }))
}
