//! Signin and logout.

use axum::Json;
use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::crypto;
use crate::error::{Result, ServerError};
use crate::router::create::Response;
use crate::router::{Valid, session_cookie, stale_cookie};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(email(message = "Email must be formatted."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub status: String,
}

/// Handler to sign a user in.
///
/// Unknown emails and wrong passwords produce the same reply so callers
/// cannot probe which accounts exist.
pub async fn handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Valid(body): Valid<Body>,
) -> Result<(CookieJar, Json<Response>)> {
    let user = state
        .users()
        .find_by_email(&body.email)
        .await?
        .ok_or(ServerError::InvalidCredentials)?;

    if !crypto::verify(&body.password, &user.salt, &user.password) {
        return Err(ServerError::InvalidCredentials);
    }

    let token = state.token.issue(&user)?;
    let jar = jar.add(session_cookie(
        &state.config.session.cookie_name,
        token.clone(),
    ));

    Ok((
        jar,
        Json(Response {
            token,
            expires_in: crate::token::EXPIRATION_TIME,
            user,
        }),
    ))
}

/// Handler to clear the session cookie.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    let jar = jar.remove(stale_cookie(&state.config.session.cookie_name));

    (
        jar,
        Json(LogoutResponse {
            status: "logged_out".to_owned(),
        }),
    )
}
