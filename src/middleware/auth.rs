use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{config::AuthStrategy, dto::auth::Claims, error::AppError, state::AppState};

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

pub const SESSION_ADMIN_KEY: &str = "auth:admin";

/// Requester context resolved by the auth gate. `subject` is the user id in
/// token deployments; the session strategy has a single admin identity and
/// no subject.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub subject: Option<Uuid>,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Fail-closed role predicate; every mutating admin operation calls this
/// before touching storage.
pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, ROLE_ADMIN)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match state.config.auth_strategy {
            AuthStrategy::Token => token_context(parts, &state.config.jwt_secret),
            AuthStrategy::Session => session_context(parts, state).await,
        }
    }
}

/// Missing credential -> 401; present but unverifiable -> 403.
fn token_context(parts: &Parts, secret: &str) -> Result<AuthUser, AppError> {
    let header_value = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthenticated)?;

    let auth_str = header_value.to_str().map_err(|_| AppError::Forbidden)?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or(AppError::Forbidden)?
        .trim();

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Forbidden)?;

    let subject = Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::Forbidden)?;

    Ok(AuthUser {
        subject: Some(subject),
        role: decoded.claims.role,
    })
}

async fn session_context(parts: &mut Parts, state: &AppState) -> Result<AuthUser, AppError> {
    let session = Session::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| AppError::Internal(anyhow::anyhow!(msg)))?;

    let admin = session
        .get::<bool>(SESSION_ADMIN_KEY)
        .await
        .map_err(|err| AppError::Internal(anyhow::anyhow!(err)))?
        .unwrap_or(false);

    if !admin {
        return Err(AppError::Unauthenticated);
    }

    Ok(AuthUser {
        subject: None,
        role: ROLE_ADMIN.to_string(),
    })
}

/// Optional variant for endpoints open to anonymous callers: an absent
/// credential yields `None`, a present but invalid one is still rejected.
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match state.config.auth_strategy {
            AuthStrategy::Token => {
                if parts.headers.get(header::AUTHORIZATION).is_none() {
                    return Ok(Self(None));
                }
                token_context(parts, &state.config.jwt_secret).map(|user| Self(Some(user)))
            }
            AuthStrategy::Session => {
                Ok(Self(session_context(parts, state).await.ok()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> AuthUser {
        AuthUser {
            subject: Some(Uuid::new_v4()),
            role: role.to_string(),
        }
    }

    #[test]
    fn ensure_role_fails_closed() {
        assert!(ensure_admin(&user(ROLE_ADMIN)).is_ok());
        assert!(matches!(
            ensure_admin(&user(ROLE_USER)),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(ensure_admin(&user("")), Err(AppError::Forbidden)));
    }

    #[test]
    fn is_admin_matches_role() {
        assert!(user(ROLE_ADMIN).is_admin());
        assert!(!user(ROLE_USER).is_admin());
    }
}
