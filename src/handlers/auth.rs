//! Authentication handlers: registration, login, logout and the current
//! user profile.

use crate::app_state::AppState;
use crate::auth::{hash_password, verify_password, AuthUser};
use crate::domain::{Role, User};
use crate::error::ApiError;
use crate::handlers::shared_types::{MessageResponse, UserView};
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    // ---
    pub cedula: Option<String>,
    pub nombre: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    // ---
    #[serde(default)]
    pub usuario: String,
    #[serde(default, rename = "contraseña")]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    // ---
    pub token: String,
    pub usuario: String,
    pub nombre: String,
    pub rol: Role,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/registro
///
/// Self-service registration. The national ID doubles as the initial
/// password; only its hash is stored. Responds with a session token and
/// the public identity summary.
///
/// - `400` when the national ID or name is missing, or the ID is taken.
/// - `201` with `{token, usuario, nombre, rol}` on success.
#[tracing::instrument(skip(state, req))]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    // ---
    let user = create_account(&state, req).await?;
    let token = state.auth().issue_token(user.id, user.role)?;

    state.metrics().record_user_registered();
    tracing::info!("registered user {}", user.national_id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            usuario: user.national_id,
            nombre: user.full_name,
            rol: user.role,
        }),
    ))
}

/// POST /auth/login
///
/// Password login. Responds `401` both for an unknown national ID and a
/// wrong password, with the respective messages; `200` with a fresh
/// token otherwise.
#[tracing::instrument(skip(state, req))]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    // ---
    let user = match state.repository().get_user_by_national_id(&req.usuario).await? {
        Some(user) => user,
        None => {
            state.metrics().record_login_attempt(false);
            return Err(ApiError::authentication("ID not registered"));
        }
    };

    if !verify_password(&req.password, &user.password_hash) {
        state.metrics().record_login_attempt(false);
        tracing::warn!("failed login for user {}", user.national_id);
        return Err(ApiError::authentication("incorrect password"));
    }

    let token = state.auth().issue_token(user.id, user.role)?;
    state.metrics().record_login_attempt(true);
    tracing::info!("user {} logged in", user.national_id);

    Ok(Json(AuthResponse {
        token,
        usuario: user.national_id,
        nombre: user.full_name,
        rol: user.role,
    }))
}

/// POST /auth/logout
///
/// Tokens are self-contained and not tracked server-side, so this only
/// acknowledges the request; the client discards its copy of the token.
pub async fn logout(AuthUser(user): AuthUser) -> Json<MessageResponse> {
    // ---
    tracing::info!("user {} logged out", user.national_id);

    Json(MessageResponse {
        message: "session closed".into(),
    })
}

/// GET /auth/me
///
/// The caller's account without the password hash, certificate summary
/// populated when one exists.
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserView>, ApiError> {
    // ---
    let certificate = state
        .repository()
        .get_certificate_meta_for_user(user.id)
        .await?;

    Ok(Json(UserView::from_parts(user, certificate, Utc::now())))
}

// ============================================================================
// Shared registration flow
// ============================================================================

/// Validates and persists a new account with password = national ID.
/// Used by self-service registration and by admin user creation.
pub(super) async fn create_account(
    state: &AppState,
    req: RegisterRequest,
) -> Result<User, ApiError> {
    // ---
    let cedula = req.cedula.as_deref().map(str::trim).unwrap_or("");
    let nombre = req.nombre.as_deref().map(str::trim).unwrap_or("");

    if cedula.is_empty() || nombre.is_empty() {
        return Err(ApiError::validation("national ID and full name are required"));
    }

    if state
        .repository()
        .get_user_by_national_id(cedula)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("this ID is already registered"));
    }

    let password_hash = hash_password(cedula)?;
    let email = req.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());

    let user = User::new(
        cedula.to_string(),
        nombre.to_string(),
        email,
        password_hash,
        Role::User,
    );

    Ok(state.repository().create_user(user).await?)
}
