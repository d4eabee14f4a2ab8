//! Middlewares for routes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::token::Claims;

/// Identity resolved from the session cookie, attached to every request.
///
/// `None` means anonymous; a missing, malformed or expired cookie is not
/// an error and silently degrades to anonymous.
#[derive(Clone, Debug, Default)]
pub struct Identity(pub Option<Claims>);

impl Identity {
    /// Resolved claims, if any.
    pub fn claims(&self) -> Option<&Claims> {
        self.0.as_ref()
    }

    /// Claims of a signed-in user, or [`ServerError::Unauthorized`].
    pub fn require(&self) -> Result<&Claims> {
        self.0.as_ref().ok_or(ServerError::Unauthorized)
    }

    /// Whether this identity owns the given resource.
    pub fn can_mutate(&self, resource_owner_id: &str) -> bool {
        self.0
            .as_ref()
            .is_some_and(|claims| claims.can_mutate(resource_owner_id))
    }
}

/// Resolve the session cookie into an [`Identity`] request extension.
///
/// Claims are a snapshot taken at token issuance and are not re-read from
/// the credential store unless `session.refresh_identity` is set.
pub async fn resolve_identity(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let claims = jar
        .get(&state.config.session.cookie_name)
        .and_then(|cookie| state.token.validate(cookie.value()).ok());

    let claims = match claims {
        Some(claims) if state.config.session.refresh_identity => {
            refresh(&state, claims).await
        },
        other => other,
    };

    req.extensions_mut().insert(Identity(claims));
    next.run(req).await
}

/// Rebuild claims from the current user record, keeping the token's
/// issuance and expiry times. A record that disappeared since issuance
/// resolves to anonymous.
async fn refresh(state: &AppState, claims: Claims) -> Option<Claims> {
    match state.users().find_by_id(&claims.sub).await {
        Ok(user) => Some(Claims::snapshot(&user, claims.iat, claims.exp)),
        Err(_) => None,
    }
}
