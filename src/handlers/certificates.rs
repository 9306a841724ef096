//! Certificate lifecycle handlers: upload (admin), owner summary,
//! download and the admin listing.

use crate::app_state::AppState;
use crate::auth::{AdminUser, AuthUser};
use crate::domain::{Certificate, CertificateListing, CertificateStatus};
use crate::error::ApiError;
use crate::handlers::shared_types::CertificateInfo;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

const PDF_MIME: &str = "application/pdf";

// ============================================================================
// Response Types
// ============================================================================

/// Upload confirmation: the stored record without its payload.
#[derive(Debug, Serialize)]
pub struct CertificateSummary {
    // ---
    pub id: Uuid,
    #[serde(rename = "nombreArchivo")]
    pub file_name: String,
    #[serde(rename = "fechaEmision")]
    pub issued_at: DateTime<Utc>,
    #[serde(rename = "fechaVencimiento")]
    pub expires_at: DateTime<Utc>,
    #[serde(rename = "estado")]
    pub status: CertificateStatus,
}

/// One row of the admin listing, with the owner's display identity.
#[derive(Debug, Serialize)]
pub struct CertificateListItem {
    // ---
    pub id: Uuid,
    #[serde(rename = "nombreArchivo")]
    pub file_name: String,
    #[serde(rename = "fechaEmision")]
    pub issued_at: DateTime<Utc>,
    #[serde(rename = "fechaVencimiento")]
    pub expires_at: DateTime<Utc>,
    #[serde(rename = "estado")]
    pub status: CertificateStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub usuario: CertificateOwner,
}

#[derive(Debug, Serialize)]
pub struct CertificateOwner {
    // ---
    pub cedula: String,
    pub nombre: String,
}

impl CertificateListItem {
    fn from_listing(listing: CertificateListing, now: DateTime<Utc>) -> Self {
        // ---
        let status = listing.status_at(now);
        Self {
            id: listing.id,
            file_name: listing.file_name,
            issued_at: listing.issued_at,
            expires_at: listing.expires_at,
            status,
            created_at: listing.created_at,
            usuario: CertificateOwner {
                cedula: listing.owner_national_id,
                nombre: listing.owner_full_name,
            },
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /certificate/upload (admin)
///
/// Multipart form: `certificado` (the PDF), `usuarioId`, `fechaEmision`,
/// `fechaVencimiento`. Replace-not-merge: an existing certificate for the
/// target user is deleted together with the insert and the ownership-link
/// update in one atomic store operation.
///
/// - `400` when the file is missing/empty, not a PDF, or the dates are
///   missing, malformed or out of order.
/// - `404` when `usuarioId` does not resolve to a user.
/// - `201` with the payload-free summary on success.
#[tracing::instrument(skip(state, admin, multipart))]
pub async fn upload_certificate(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CertificateSummary>), ApiError> {
    // ---
    let form = UploadForm::read_from(&mut multipart).await?;

    let payload = form
        .file_bytes
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ApiError::validation("a PDF file is required"))?;

    let mime_type = form.file_content_type.unwrap_or_default();
    if mime_type != PDF_MIME {
        return Err(ApiError::validation("only PDF files are allowed"));
    }

    let target_user_id = form
        .target_user_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("usuarioId is required"))
        .and_then(|s| {
            Uuid::parse_str(s).map_err(|_| ApiError::validation("usuarioId is not a valid ID"))
        })?;

    let issued_at = parse_date(form.issued_at.as_deref(), "fechaEmision")?;
    let expires_at = parse_date(form.expires_at.as_deref(), "fechaVencimiento")?;
    if expires_at <= issued_at {
        return Err(ApiError::validation(
            "expiry date must be after the issue date",
        ));
    }

    let owner = state
        .repository()
        .get_user_by_id(target_user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    let certificate = Certificate::new(
        owner.id,
        format!("certificado_{}.pdf", owner.national_id),
        payload,
        mime_type,
        issued_at,
        expires_at,
        admin.id,
    );

    let certificate = state.repository().replace_certificate(certificate).await?;

    state.metrics().record_certificate_uploaded();
    tracing::info!(
        "certificate {} uploaded for user {} by {}",
        certificate.id,
        owner.national_id,
        admin.national_id
    );

    let status = certificate.status_at(Utc::now());

    Ok((
        StatusCode::CREATED,
        Json(CertificateSummary {
            id: certificate.id,
            file_name: certificate.file_name,
            issued_at: certificate.issued_at,
            expires_at: certificate.expires_at,
            status,
        }),
    ))
}

/// GET /certificate/me
///
/// The caller's certificate metadata with the status recomputed at read
/// time; `404` when no certificate is assigned.
pub async fn my_certificate(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<CertificateInfo>, ApiError> {
    // ---
    let meta = state
        .repository()
        .get_certificate_meta_for_user(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("no certificate assigned"))?;

    Ok(Json(CertificateInfo::from_meta(&meta, Utc::now())))
}

/// GET /certificate/download
///
/// Streams the stored PDF with a Content-Disposition attachment filename
/// derived from the stored record; `404` when no certificate is assigned.
pub async fn download_certificate(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Response, ApiError> {
    // ---
    let certificate = state
        .repository()
        .get_certificate_for_user(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("no certificate assigned"))?;

    state.metrics().record_certificate_downloaded();
    tracing::info!("user {} downloaded certificate {}", user.national_id, certificate.id);

    let headers = [
        (header::CONTENT_TYPE, certificate.mime_type.clone()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", certificate.file_name),
        ),
    ];

    Ok((headers, certificate.payload).into_response())
}

/// GET /certificate/all (admin)
///
/// Every certificate, newest-created first, payload excluded, each entry
/// carrying the owner's national ID and name for display.
pub async fn list_certificates(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<CertificateListItem>>, ApiError> {
    // ---
    let now = Utc::now();
    let listings = state.repository().list_certificates().await?;

    Ok(Json(
        listings
            .into_iter()
            .map(|listing| CertificateListItem::from_listing(listing, now))
            .collect(),
    ))
}

// ============================================================================
// Multipart form parsing
// ============================================================================

#[derive(Default)]
struct UploadForm {
    // ---
    file_bytes: Option<Vec<u8>>,
    file_content_type: Option<String>,
    target_user_id: Option<String>,
    issued_at: Option<String>,
    expires_at: Option<String>,
}

impl UploadForm {
    /// Drains the multipart stream into memory. The whole upload is
    /// buffered (bounded by the request body limit), so failure paths
    /// leave no temporary artifacts behind.
    async fn read_from(multipart: &mut Multipart) -> Result<Self, ApiError> {
        // ---
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| ApiError::validation("malformed multipart body"))?
        {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("certificado") => {
                    form.file_content_type = field.content_type().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|_| ApiError::validation("failed to read the uploaded file"))?;
                    form.file_bytes = Some(bytes.to_vec());
                }
                Some("usuarioId") => form.target_user_id = Some(read_text(field).await?),
                Some("fechaEmision") => form.issued_at = Some(read_text(field).await?),
                Some("fechaVencimiento") => form.expires_at = Some(read_text(field).await?),
                _ => {}
            }
        }

        Ok(form)
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    // ---
    field
        .text()
        .await
        .map_err(|_| ApiError::validation("malformed multipart body"))
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (interpreted
/// as midnight UTC).
fn parse_date(raw: Option<&str>, field: &str) -> Result<DateTime<Utc>, ApiError> {
    // ---
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation(format!("{field} is required")))?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| ApiError::validation(format!("{field} is not a valid date")))
}
