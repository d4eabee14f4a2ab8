//! Manage session tokens.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};
use crate::user::User;

/// Seconds before an issued token stops being accepted.
pub const EXPIRATION_TIME: u64 = 60 * 60 * 24; // 24 hours.

/// Identity claims embedded on a session token.
///
/// A snapshot of the user record at issuance time; later profile changes
/// do not show up until a new token is issued.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    /// Email at issuance.
    pub email: String,
    /// Display name at issuance.
    pub name: String,
    /// Role at issuance, `user` or `admin`.
    pub role: String,
    /// Profile image reference at issuance.
    pub avatar: Option<String>,
    /// Identifies the time at which the token was issued.
    pub iat: u64,
    /// Identifies the expiration time on or after which the token must not
    /// be accepted for processing.
    pub exp: u64,
}

impl Claims {
    /// Whether this identity owns the given resource.
    pub fn can_mutate(&self, resource_owner_id: &str) -> bool {
        self.sub == resource_owner_id
    }

    /// Build a claims snapshot from a user record.
    pub fn snapshot(user: &User, iat: u64, exp: u64) -> Self {
        Self {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.full_name.clone(),
            role: user.role.clone(),
            avatar: user.avatar.clone(),
            iat,
            exp,
        }
    }
}

/// Manage session tokens.
///
/// Tokens are signed with a single shared secret; there is no revocation
/// list, so an issued token stays valid until its expiry.
#[derive(Clone)]
pub struct TokenManager {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenManager {
    /// Create a new [`TokenManager`] around a shared secret.
    pub fn new(secret: &str) -> Self {
        let algorithm = Algorithm::HS256;

        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(algorithm),
        }
    }

    /// Issue a 24-hour token holding a snapshot of `user`.
    pub fn issue(&self, user: &User) -> Result<String> {
        let iat = now_seconds()?;
        let claims = Claims::snapshot(user, iat, iat + EXPIRATION_TIME);
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key).map_err(|err| {
            ServerError::Internal {
                details: "cannot sign session token".to_owned(),
                source: Some(Box::new(err)),
            }
        })
    }

    /// Decode and check a token.
    ///
    /// Signature mismatch, corruption and expiry all collapse into
    /// [`ServerError::InvalidToken`].
    pub fn validate(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| ServerError::InvalidToken)
    }
}

fn now_seconds() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| ServerError::Internal {
            details: "system clock before unix epoch".to_owned(),
            source: Some(Box::new(err)),
        })?
        .as_secs())
}
