use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    Certificate, CertificateListing, CertificateMeta, CertificateStatus, Repository,
    RepositoryPtr, Role, User,
};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    national_id: String,
    full_name: String,
    email: Option<String>,
    password_hash: String,
    role: String,
    certificate_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    // ---
    fn into_user(self) -> Result<User> {
        // ---
        let role = Role::parse(&self.role)
            .ok_or_else(|| anyhow::anyhow!("unknown role in store: {}", self.role))?;

        Ok(User {
            id: self.id,
            national_id: self.national_id,
            full_name: self.full_name,
            email: self.email,
            password_hash: self.password_hash,
            role,
            certificate_id: self.certificate_id,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CertificateRow {
    id: Uuid,
    owner_user_id: Uuid,
    file_name: String,
    payload: Vec<u8>,
    mime_type: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    status: String,
    uploaded_by: Uuid,
    created_at: DateTime<Utc>,
}

impl CertificateRow {
    // ---
    fn into_certificate(self) -> Result<Certificate> {
        // ---
        Ok(Certificate {
            id: self.id,
            owner_user_id: self.owner_user_id,
            file_name: self.file_name,
            payload: self.payload,
            mime_type: self.mime_type,
            issued_at: self.issued_at,
            expires_at: self.expires_at,
            status: parse_status(&self.status)?,
            uploaded_by: self.uploaded_by,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CertificateMetaRow {
    id: Uuid,
    owner_user_id: Uuid,
    file_name: String,
    mime_type: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    status: String,
    uploaded_by: Uuid,
    created_at: DateTime<Utc>,
}

impl CertificateMetaRow {
    // ---
    fn into_meta(self) -> Result<CertificateMeta> {
        // ---
        Ok(CertificateMeta {
            id: self.id,
            owner_user_id: self.owner_user_id,
            file_name: self.file_name,
            mime_type: self.mime_type,
            issued_at: self.issued_at,
            expires_at: self.expires_at,
            status: parse_status(&self.status)?,
            uploaded_by: self.uploaded_by,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CertificateListingRow {
    id: Uuid,
    file_name: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    status: String,
    created_at: DateTime<Utc>,
    owner_national_id: String,
    owner_full_name: String,
}

fn parse_status(value: &str) -> Result<CertificateStatus> {
    // ---
    CertificateStatus::parse(value)
        .ok_or_else(|| anyhow::anyhow!("unknown certificate status in store: {value}"))
}

pub fn create_postgres_repository(pool: PgPool) -> RepositoryPtr {
    // ---
    std::sync::Arc::new(PostgresRepository::new(pool))
}

pub struct PostgresRepository {
    // ---
    pool: PgPool,
}

impl PostgresRepository {
    // ---
    pub fn new(pool: PgPool) -> Self {
        // ---
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Repository for PostgresRepository {
    // ---
    async fn ping(&self) -> Result<()> {
        // ---
        sqlx::query("SELECT 1").execute(&self.pool).await?;

        Ok(())
    }

    async fn create_user(&self, user: User) -> Result<User> {
        // ---
        sqlx::query(
            "INSERT INTO users
                 (id, national_id, full_name, email, password_hash, role, certificate_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user.id)
        .bind(&user.national_id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.certificate_id)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user_by_national_id(&self, national_id: &str) -> Result<Option<User>> {
        // ---
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, national_id, full_name, email, password_hash, role, certificate_id, created_at
             FROM users WHERE national_id = $1",
        )
        .bind(national_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        // ---
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, national_id, full_name, email, password_hash, role, certificate_id, created_at
             FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        // ---
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, national_id, full_name, email, password_hash, role, certificate_id, created_at
             FROM users ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool> {
        // ---
        // The FK cascade removes the user's certificate in the same statement.
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_certificate(&self, certificate: Certificate) -> Result<Certificate> {
        // ---
        // Delete-old, insert-new and link-update commit together; a crash
        // mid-sequence rolls back rather than leaving a dangling reference.
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM certificates WHERE owner_user_id = $1")
            .bind(certificate.owner_user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO certificates
                 (id, owner_user_id, file_name, payload, mime_type,
                  issued_at, expires_at, status, uploaded_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(certificate.id)
        .bind(certificate.owner_user_id)
        .bind(&certificate.file_name)
        .bind(&certificate.payload)
        .bind(&certificate.mime_type)
        .bind(certificate.issued_at)
        .bind(certificate.expires_at)
        .bind(certificate.status.as_str())
        .bind(certificate.uploaded_by)
        .bind(certificate.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET certificate_id = $1 WHERE id = $2")
            .bind(certificate.id)
            .bind(certificate.owner_user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(certificate)
    }

    async fn get_certificate_for_user(&self, user_id: Uuid) -> Result<Option<Certificate>> {
        // ---
        // Resolved by owner rather than through users.certificate_id, so a
        // stale link never surfaces a missing or foreign record.
        let row = sqlx::query_as::<_, CertificateRow>(
            "SELECT id, owner_user_id, file_name, payload, mime_type,
                    issued_at, expires_at, status, uploaded_by, created_at
             FROM certificates WHERE owner_user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CertificateRow::into_certificate).transpose()
    }

    async fn get_certificate_meta_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CertificateMeta>> {
        // ---
        let row = sqlx::query_as::<_, CertificateMetaRow>(
            "SELECT id, owner_user_id, file_name, mime_type,
                    issued_at, expires_at, status, uploaded_by, created_at
             FROM certificates WHERE owner_user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CertificateMetaRow::into_meta).transpose()
    }

    async fn list_certificates(&self) -> Result<Vec<CertificateListing>> {
        // ---
        let rows = sqlx::query_as::<_, CertificateListingRow>(
            "SELECT c.id, c.file_name, c.issued_at, c.expires_at, c.status, c.created_at,
                    u.national_id AS owner_national_id, u.full_name AS owner_full_name
             FROM certificates c
             JOIN users u ON u.id = c.owner_user_id
             ORDER BY c.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(CertificateListing {
                    id: r.id,
                    file_name: r.file_name,
                    issued_at: r.issued_at,
                    expires_at: r.expires_at,
                    status: parse_status(&r.status)?,
                    created_at: r.created_at,
                    owner_national_id: r.owner_national_id,
                    owner_full_name: r.owner_full_name,
                })
            })
            .collect()
    }
}
