//! Edit the signed-in user's profile.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::middleware::Identity;
use crate::router::Valid;
use crate::user::User;

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Full name must be 1 to 100 characters long."
    ))]
    full_name: Option<String>,
    #[validate(length(max = 512, message = "Bio must be 0 to 512 characters long."))]
    bio: Option<String>,
    #[validate(length(max = 2048))]
    profile_image_url: Option<String>,
    #[validate(length(
        min = 6,
        max = 255,
        message = "Password must contain at least 6 characters."
    ))]
    password: Option<String>,
}

/// Handler to update profile fields.
///
/// A password in the body is the only thing that re-derives salt and
/// digest; plain profile edits never touch them. The session token keeps
/// its issuance-time snapshot either way.
pub async fn handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Valid(body): Valid<Body>,
) -> Result<Json<User>> {
    let claims = identity.require()?;

    let user = state
        .users()
        .update_profile(
            &claims.sub,
            body.full_name.as_deref(),
            body.bio.as_deref(),
            body.profile_image_url.as_deref(),
        )
        .await?;

    if let Some(password) = &body.password {
        state.users().update_password(&claims.sub, password).await?;
    }

    Ok(Json(user))
}
