//! HTTP API surface.

pub mod blogs;
pub mod create;
pub mod feed;
pub mod images;
pub mod login;
pub mod status;
pub mod users;

use axum::Json;
use axum::extract::{FromRequest, Request};
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{Result, ServerError};

/// JSON extractor running [`validator`] checks before the handler.
pub struct Valid<T>(pub T);

impl<S, T> FromRequest<S> for Valid<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;

        Ok(Valid(value))
    }
}

/// Session cookie carrying a freshly issued token.
pub fn session_cookie(name: &str, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(name.to_owned(), token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);

    cookie
}

/// Cookie handle used to clear the session at logout.
pub fn stale_cookie(name: &str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name.to_owned(), "");
    cookie.set_path("/");

    cookie
}

#[cfg(test)]
pub fn state(pool: sqlx::Pool<sqlx::Postgres>) -> crate::AppState {
    use std::sync::Arc;

    crate::AppState {
        config: Arc::new(crate::config::Configuration::default()),
        db: crate::database::Database { postgres: pool },
        token: crate::token::TokenManager::new("test-only-signing-secret"),
        images: crate::image::ImageHost::new(None),
    }
}

/// Mint a token for a fixture user without going through signin.
#[cfg(test)]
pub fn token_for(state: &crate::AppState, user_id: &str) -> String {
    let user = crate::user::User {
        id: user_id.to_owned(),
        full_name: user_id.to_owned(),
        email: format!("{user_id}@example.com"),
        role: crate::user::ROLE_USER.to_owned(),
        ..Default::default()
    };

    state.token.issue(&user).expect("cannot issue test token")
}
