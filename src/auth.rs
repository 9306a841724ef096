//! Authentication and role authorization.
//!
//! Issues and verifies signed session tokens, hashes and checks
//! passwords, and provides the request extractors that gate protected
//! routes. Tokens are self-contained (HS256, 7-day default expiry) and
//! never tracked server-side, so logout is purely a client-side concern.

use crate::app_state::AppState;
use crate::config::AuthConfig;
use crate::domain::{Role, User};
use crate::error::ApiError;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

// Tampered, malformed and expired tokens are all rejected with this one
// message so callers cannot distinguish which check failed.
const BAD_TOKEN: &str = "invalid or expired token";

/// Signed token claims: the user's identity and role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's ID.
    pub sub: String,
    /// Role at issuance time.
    pub rol: Role,
    /// Issued-at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

/// Token issuing and verification, configured once at startup.
#[derive(Clone)]
pub struct AuthService {
    // ---
    config: Arc<AuthConfig>,
}

impl AuthService {
    // ---
    pub fn new(config: AuthConfig) -> Self {
        // ---
        Self {
            config: Arc::new(config),
        }
    }

    /// Issue a signed session token for the given user.
    pub fn issue_token(&self, user_id: Uuid, role: Role) -> Result<String, ApiError> {
        // ---
        let now = Utc::now();
        let exp = now + chrono::Duration::seconds(self.config.token_ttl.as_secs() as i64);

        let claims = Claims {
            sub: user_id.to_string(),
            rol: role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("token creation failed: {e}")))
    }

    /// Verify a token: well-formed, signature-valid and unexpired.
    pub fn verify_token(&self, token: &str) -> Result<Claims, ApiError> {
        // ---
        let mut validation = Validation::default();
        validation.leeway = 0; // No clock skew tolerance

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| ApiError::authentication(BAD_TOKEN))
    }
}

/// Hash a password with argon2 and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    // ---
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::internal(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    // ---
    PasswordHash::new(hash)
        .ok()
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

// ============================================================================
// Request extractors
// ============================================================================

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    // ---
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match header {
        Some(h) if h.starts_with("Bearer ") => Ok(&h[7..]),
        Some(_) => Err(ApiError::authentication("invalid Authorization header")),
        None => Err(ApiError::authentication("Authorization header required")),
    }
}

/// Extractor for any authenticated caller.
///
/// Verifies the bearer token and resolves the user record it names, so
/// handlers always see current account data rather than stale claims.
pub(crate) struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // ---
        let token = bearer_token(parts)?;
        let claims = state.auth().verify_token(token)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::authentication(BAD_TOKEN))?;

        let user = state
            .repository()
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::authentication(BAD_TOKEN))?;

        Ok(AuthUser(user))
    }
}

/// Extractor for admin-only routes. Role check is exact-match.
pub(crate) struct AdminUser(pub User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // ---
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if user.role != Role::Admin {
            tracing::warn!("user {} denied admin access", user.national_id);
            return Err(ApiError::authorization("admin role required"));
        }

        Ok(AdminUser(user))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::error::ErrorKind;
    use std::time::Duration;

    fn test_service() -> AuthService {
        // ---
        AuthService::new(AuthConfig {
            jwt_secret: "unit-test-secret".to_string(),
            token_ttl: Duration::from_secs(604_800),
        })
    }

    #[test]
    fn issued_token_verifies() {
        // ---
        let service = test_service();
        let user_id = Uuid::new_v4();

        let token = service.issue_token(user_id, Role::Admin).expect("issue");
        let claims = service.verify_token(&token).expect("verify");

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.rol, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_token_is_rejected() {
        // ---
        let service = test_service();
        let token = service.issue_token(Uuid::new_v4(), Role::User).expect("issue");

        // Flip one character of the signed payload.
        let mut bytes = token.into_bytes();
        let mid = bytes.len() / 2;
        bytes[mid] = if bytes[mid] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).expect("utf8");

        let err = service.verify_token(&tampered).expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.message(), BAD_TOKEN);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        // ---
        let service = test_service();
        let other = AuthService::new(AuthConfig {
            jwt_secret: "a-different-secret".to_string(),
            token_ttl: Duration::from_secs(604_800),
        });

        let token = other.issue_token(Uuid::new_v4(), Role::User).expect("issue");
        assert!(service.verify_token(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected_uniformly() {
        // ---
        let service = test_service();
        let now = Utc::now();

        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            rol: Role::User,
            iat: now.timestamp() - 700_000,
            exp: now.timestamp() - 100,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .expect("encode");

        let err = service.verify_token(&token).expect_err("must fail");
        // Same message as the tamper case: no oracle for which check failed.
        assert_eq!(err.message(), BAD_TOKEN);
    }

    #[test]
    fn password_hash_round_trip() {
        // ---
        let hash = hash_password("1002003001").expect("hash");

        assert_ne!(hash, "1002003001");
        assert!(verify_password("1002003001", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        // ---
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
