use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    models::{Role, User},
    repository::RepositoryState,
};

/// Claims
///
/// Payload expected inside the bearer token. Tokens are issued elsewhere; this
/// service only validates them.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's id.
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of a request: who is calling and which roles they hold.
/// This is all the authorization rules ever look at.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub roles: Vec<Role>,
}

impl AuthUser {
    pub fn new(id: Uuid, roles: Vec<Role>) -> Self {
        AuthUser { id, roles }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        AuthUser {
            id: user.id,
            roles: user.roles,
        }
    }
}

fn unauthorized(reason: &str) -> AppError {
    AppError::Authentication(reason.to_string())
}

/// AuthUser Extractor
///
/// 1. Local bypass: in `Env::Local` an `x-user-id` header naming an existing user is accepted.
/// 2. Otherwise a `Bearer` JWT is decoded with the configured secret (expiry enforced).
/// 3. The subject is looked up so roles reflect the current state of the user record.
///
/// Any failure rejects with `AppError::Authentication` (401).
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            let bypass_id = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|id| Uuid::parse_str(id).ok());
            if let Some(user_id) = bypass_id {
                if let Some(user) = repo.find_user(user_id).await? {
                    return Ok(AuthUser::from(user));
                }
            }
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| unauthorized("Missing bearer token"))?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => unauthorized("Token expired"),
                _ => unauthorized("Invalid token"),
            }
        })?;

        // A valid token for a deleted user is still rejected.
        let user = repo
            .find_user(token_data.claims.sub)
            .await?
            .ok_or_else(|| unauthorized("Unknown user"))?;

        Ok(AuthUser::from(user))
    }
}
