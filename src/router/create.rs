//! Account creation (signup) with auto-login.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::{Valid, session_cookie};
use crate::user::User;

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Full name must be 1 to 100 characters long."
    ))]
    pub full_name: String,
    #[validate(email(message = "Email must be formatted."))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 255,
        message = "Password must contain at least 6 characters."
    ))]
    pub password: String,
    #[validate(length(max = 2048))]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub token: String,
    pub expires_in: u64,
    pub user: User,
}

/// Handler to create user.
///
/// A successful signup signs the user in right away: the reply carries
/// the session cookie alongside the created record.
pub async fn handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, CookieJar, Json<Response>)> {
    let user = state
        .users()
        .insert(
            &body.full_name,
            &body.email,
            &body.password,
            body.profile_image_url,
        )
        .await?;

    let token = state.token.issue(&user)?;
    let jar = jar.add(session_cookie(
        &state.config.session.cookie_name,
        token.clone(),
    ));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(Response {
            token,
            expires_in: crate::token::EXPIRATION_TIME,
            user,
        }),
    ))
}
