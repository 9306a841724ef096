use super::models::{Certificate, CertificateListing, CertificateMeta, User};
use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

/// Abstraction for user and certificate persistence.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    // ---
    /// Store round trip used by the full health check.
    async fn ping(&self) -> Result<()>;

    /// Persist a new user. The caller is responsible for the uniqueness
    /// pre-check; the store additionally enforces the unique national ID.
    async fn create_user(&self, user: User) -> Result<User>;

    /// Get user by national ID (the login username).
    async fn get_user_by_national_id(&self, national_id: &str) -> Result<Option<User>>;

    /// Get user by ID.
    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>>;

    /// All users, oldest first.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Delete a user and their certificate. Returns false when no such
    /// user exists.
    async fn delete_user(&self, user_id: Uuid) -> Result<bool>;

    /// Replace the owner's certificate: any prior certificate is deleted,
    /// the new record inserted, and the user link updated as one atomic
    /// operation, so there is never more than one certificate per user
    /// and no partial-failure window.
    async fn replace_certificate(&self, certificate: Certificate) -> Result<Certificate>;

    /// Full certificate (payload included) owned by the given user.
    async fn get_certificate_for_user(&self, user_id: Uuid) -> Result<Option<Certificate>>;

    /// Payload-free certificate metadata owned by the given user.
    async fn get_certificate_meta_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CertificateMeta>>;

    /// All certificates, newest-created first, payload excluded at the
    /// query level, joined with owner identity for display.
    async fn list_certificates(&self) -> Result<Vec<CertificateListing>>;
}

/// Type alias for any backend that implements Repository.
pub type RepositoryPtr = Arc<dyn Repository>;
