use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to an account. There is no role-change endpoint; admins
/// are provisioned directly in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    // ---
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        // ---
        match value {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Validity state of a certificate. Only `Revoked` is ever stored
/// explicitly; `Expired` is derived on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    Valid,
    Expired,
    Revoked,
}

impl CertificateStatus {
    // ---
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            CertificateStatus::Valid => "valid",
            CertificateStatus::Expired => "expired",
            CertificateStatus::Revoked => "revoked",
        }
    }

    pub fn parse(value: &str) -> Option<CertificateStatus> {
        // ---
        match value {
            "valid" => Some(CertificateStatus::Valid),
            "expired" => Some(CertificateStatus::Expired),
            "revoked" => Some(CertificateStatus::Revoked),
            _ => None,
        }
    }
}

/// Effective status of a certificate at `now`.
///
/// Pure function of the stored status and the expiry date: an explicit
/// revocation always wins, otherwise a past expiry reports `Expired`.
/// Nothing is ever written back to the store on read.
pub fn effective_status(
    stored: CertificateStatus,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> CertificateStatus {
    // ---
    match stored {
        CertificateStatus::Revoked => CertificateStatus::Revoked,
        _ if now > expires_at => CertificateStatus::Expired,
        _ => CertificateStatus::Valid,
    }
}

/// A registered account, identified by national ID.
///
/// The national ID doubles as the login username and is immutable after
/// creation. The initial password is the national ID itself, stored only
/// as an argon2 hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub national_id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: Role,
    /// Link to the user's certificate, if one has been uploaded.
    /// At most one certificate per user at any time.
    pub certificate_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl User {
    // ---
    pub fn new(
        national_id: String,
        full_name: String,
        email: Option<String>,
        password_hash: String,
        role: Role,
    ) -> Self {
        // ---
        Self {
            id: Uuid::new_v4(),
            national_id,
            full_name,
            email,
            password_hash,
            role,
            certificate_id: None,
            created_at: Utc::now(),
        }
    }
}

/// A stored competency certificate: one PDF plus validity metadata,
/// owned by exactly one user.
#[derive(Debug, Clone)]
pub struct Certificate {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub file_name: String,
    pub payload: Vec<u8>,
    pub mime_type: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: CertificateStatus,
    /// Admin who performed the upload. Kept as a plain reference so the
    /// record survives deletion of that admin account.
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Certificate {
    // ---
    pub fn new(
        owner_user_id: Uuid,
        file_name: String,
        payload: Vec<u8>,
        mime_type: String,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        uploaded_by: Uuid,
    ) -> Self {
        // ---
        Self {
            id: Uuid::new_v4(),
            owner_user_id,
            file_name,
            payload,
            mime_type,
            issued_at,
            expires_at,
            status: CertificateStatus::Valid,
            uploaded_by,
            created_at: Utc::now(),
        }
    }

    /// Effective status at `now`; see [`effective_status`].
    pub fn status_at(&self, now: DateTime<Utc>) -> CertificateStatus {
        // ---
        effective_status(self.status, self.expires_at, now)
    }
}

/// Certificate metadata without the binary payload, for listings and
/// summary responses.
#[derive(Debug, Clone)]
pub struct CertificateMeta {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: CertificateStatus,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl CertificateMeta {
    // ---
    pub fn status_at(&self, now: DateTime<Utc>) -> CertificateStatus {
        // ---
        effective_status(self.status, self.expires_at, now)
    }
}

/// One row of the admin certificate listing: payload-free metadata joined
/// with the owning user's display identity.
#[derive(Debug, Clone)]
pub struct CertificateListing {
    pub id: Uuid,
    pub file_name: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: CertificateStatus,
    pub created_at: DateTime<Utc>,
    pub owner_national_id: String,
    pub owner_full_name: String,
}

impl CertificateListing {
    // ---
    pub fn status_at(&self, now: DateTime<Utc>) -> CertificateStatus {
        // ---
        effective_status(self.status, self.expires_at, now)
    }
}
