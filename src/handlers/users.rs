//! Admin user-administration handlers: list, lookup by national ID,
//! create and delete.

use crate::app_state::AppState;
use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::handlers::auth::{create_account, RegisterRequest};
use crate::handlers::shared_types::{MessageResponse, UserView};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct CreatedUser {
    // ---
    pub id: Uuid,
    pub cedula: String,
    pub nombre: String,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    // ---
    pub message: String,
    pub usuario: CreatedUser,
}

/// GET /users (admin)
///
/// Every account, password hashes stripped, certificate summaries joined.
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<UserView>>, ApiError> {
    // ---
    let now = Utc::now();
    let users = state.repository().list_users().await?;

    let mut views = Vec::with_capacity(users.len());
    for user in users {
        let certificate = state
            .repository()
            .get_certificate_meta_for_user(user.id)
            .await?;
        views.push(UserView::from_parts(user, certificate, now));
    }

    Ok(Json(views))
}

/// GET /users/buscar/{cedula} (admin)
pub async fn find_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(cedula): Path<String>,
) -> Result<Json<UserView>, ApiError> {
    // ---
    let user = state
        .repository()
        .get_user_by_national_id(&cedula)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    let certificate = state
        .repository()
        .get_certificate_meta_for_user(user.id)
        .await?;

    Ok(Json(UserView::from_parts(user, certificate, Utc::now())))
}

/// POST /users/crear (admin)
///
/// Same validation as self-service registration (initial password = the
/// national ID) but issues no session token; the account belongs to
/// someone else.
#[tracing::instrument(skip(state, admin, req))]
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    // ---
    let user = create_account(&state, req).await?;

    state.metrics().record_user_registered();
    tracing::info!("admin {} created user {}", admin.national_id, user.national_id);

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            message: "user created".into(),
            usuario: CreatedUser {
                id: user.id,
                cedula: user.national_id,
                nombre: user.full_name,
            },
        }),
    ))
}

/// DELETE /users/{id} (admin)
///
/// Deletes the account and cascade-deletes its certificate; an orphaned
/// certificate would have no owner left to serve it.
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    // ---
    let deleted = state.repository().delete_user(id).await?;

    if !deleted {
        return Err(ApiError::not_found("user not found"));
    }

    tracing::info!("admin {} deleted user {id}", admin.national_id);

    Ok(Json(MessageResponse {
        message: "user deleted".into(),
    }))
}
