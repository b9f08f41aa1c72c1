//! Bearer-token identity.
//!
//! Tokens are issued by the sign-in service; this module only verifies them
//! (HS256, shared secret) and exposes the caller as an `AuthUser` extractor.

use std::fmt;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Candidate,
    Employer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Candidate => "CANDIDATE",
            Role::Employer => "EMPLOYER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    /// Fails with 403 unless the caller holds `role`.
    pub fn require(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Verifies a raw JWT and returns the caller it names.
pub fn verify_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| AuthUser::from(data.claims))
        .map_err(|e| {
            debug!("Rejected bearer token: {e}");
            AppError::Unauthorized
        })
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        verify_token(token, &state.config.jwt_secret)
    }
}

/// Records the caller in `users` so profile rows can reference it.
pub async fn upsert_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user: &AuthUser,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO users (id, email, role)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO UPDATE
            SET email = EXCLUDED.email, role = EXCLUDED.role, last_seen_at = now()
        "#,
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(user.role.as_str())
    .execute(executor)
    .await?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn issue_test_token(id: Uuid, role: Role, secret: &str) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = Claims {
        sub: id,
        email: format!("{}@example.org", role.as_str().to_lowercase()),
        role,
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use jsonwebtoken::{encode, EncodingKey, Header};

    #[test]
    fn test_verify_valid_token() {
        let id = Uuid::new_v4();
        let token = issue_test_token(id, Role::Employer, "s3cret");
        let user = verify_token(&token, "s3cret").unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Employer);
        assert_eq!(user.email, "employer@example.org");
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let token = issue_test_token(Uuid::new_v4(), Role::Admin, "s3cret");
        assert!(matches!(
            verify_token(&token, "other"),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "late@example.org".to_string(),
            role: Role::Candidate,
            exp: (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"s3cret"),
        )
        .unwrap();
        assert!(matches!(
            verify_token(&token, "s3cret"),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_require_role() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: "c@example.org".to_string(),
            role: Role::Candidate,
        };
        assert!(user.require(Role::Candidate).is_ok());
        assert!(matches!(user.require(Role::Admin), Err(AppError::Forbidden)));
        assert!(!user.is_admin());
    }

    #[test]
    fn test_bearer_token_parsing() {
        let (parts, _) = Request::builder()
            .header(AUTHORIZATION, "Bearer abc.def.ghi")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));

        let (parts, _) = Request::builder()
            .header(AUTHORIZATION, "Basic Zm9vOmJhcg==")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_role_serializes_screaming_case() {
        assert_eq!(
            serde_json::to_string(&Role::Candidate).unwrap(),
            "\"CANDIDATE\""
        );
    }
}
