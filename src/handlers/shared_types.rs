//! Wire types shared across handlers.
//!
//! Field names follow the external API contract (Spanish identifiers on
//! the wire, English internally). Password hashes and certificate
//! payloads never appear in any of these shapes.

use crate::domain::{CertificateMeta, CertificateStatus, Role, User};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Plain acknowledgement body.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Certificate metadata as shown to its owner.
#[derive(Serialize)]
pub struct CertificateInfo {
    #[serde(rename = "nombreArchivo")]
    pub file_name: String,
    #[serde(rename = "fechaEmision")]
    pub issued_at: DateTime<Utc>,
    #[serde(rename = "fechaVencimiento")]
    pub expires_at: DateTime<Utc>,
    #[serde(rename = "estado")]
    pub status: CertificateStatus,
}

impl CertificateInfo {
    /// Builds the owner-facing view with the status recomputed at `now`.
    pub fn from_meta(meta: &CertificateMeta, now: DateTime<Utc>) -> Self {
        // ---
        Self {
            file_name: meta.file_name.clone(),
            issued_at: meta.issued_at,
            expires_at: meta.expires_at,
            status: meta.status_at(now),
        }
    }
}

/// A user as returned by the API: no password hash, certificate summary
/// populated when one exists.
#[derive(Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub cedula: String,
    pub nombre: String,
    pub email: Option<String>,
    pub rol: Role,
    pub certificado: Option<CertificateInfo>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl UserView {
    pub fn from_parts(user: User, certificate: Option<CertificateMeta>, now: DateTime<Utc>) -> Self {
        // ---
        Self {
            id: user.id,
            cedula: user.national_id,
            nombre: user.full_name,
            email: user.email,
            rol: user.role,
            certificado: certificate
                .as_ref()
                .map(|meta| CertificateInfo::from_meta(meta, now)),
            created_at: user.created_at,
        }
    }
}
