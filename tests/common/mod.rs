// Test helpers are intentionally partially used
#![allow(dead_code)]

use anyhow::Result;
use certtrack::domain::{
    Certificate, CertificateListing, CertificateMeta, Repository, RepositoryPtr, Role, User,
};
use certtrack::{
    create_noop_metrics, create_router_with_state, hash_password, AuthConfig, UploadConfig,
};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

// ============================================================================
// In-memory repository
// ============================================================================

/// In-memory `Repository` implementation backing hermetic integration
/// tests: the full router runs against it with no live database.
///
/// Multi-step operations happen under a single lock, mirroring the
/// transactional atomicity of the Postgres implementation.
#[derive(Default)]
pub struct InMemoryRepository {
    state: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    certificates: HashMap<Uuid, Certificate>,
}

impl InMemoryRepository {
    // ---
    pub fn new() -> Self {
        Self::default()
    }
}

fn meta_of(cert: &Certificate) -> CertificateMeta {
    // ---
    CertificateMeta {
        id: cert.id,
        owner_user_id: cert.owner_user_id,
        file_name: cert.file_name.clone(),
        mime_type: cert.mime_type.clone(),
        issued_at: cert.issued_at,
        expires_at: cert.expires_at,
        status: cert.status,
        uploaded_by: cert.uploaded_by,
        created_at: cert.created_at,
    }
}

#[async_trait::async_trait]
impl Repository for InMemoryRepository {
    // ---
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn create_user(&self, user: User) -> Result<User> {
        // ---
        let mut inner = self.state.lock().unwrap();
        if inner
            .users
            .values()
            .any(|u| u.national_id == user.national_id)
        {
            anyhow::bail!("duplicate national id: {}", user.national_id);
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_national_id(&self, national_id: &str) -> Result<Option<User>> {
        // ---
        let inner = self.state.lock().unwrap();
        Ok(inner
            .users
            .values()
            .find(|u| u.national_id == national_id)
            .cloned())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        // ---
        let inner = self.state.lock().unwrap();
        Ok(inner.users.get(&user_id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        // ---
        let inner = self.state.lock().unwrap();
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool> {
        // ---
        let mut inner = self.state.lock().unwrap();
        let existed = inner.users.remove(&user_id).is_some();
        if existed {
            inner.certificates.retain(|_, c| c.owner_user_id != user_id);
        }
        Ok(existed)
    }

    async fn replace_certificate(&self, certificate: Certificate) -> Result<Certificate> {
        // ---
        let mut inner = self.state.lock().unwrap();
        inner
            .certificates
            .retain(|_, c| c.owner_user_id != certificate.owner_user_id);
        if let Some(user) = inner.users.get_mut(&certificate.owner_user_id) {
            user.certificate_id = Some(certificate.id);
        }
        inner.certificates.insert(certificate.id, certificate.clone());
        Ok(certificate)
    }

    async fn get_certificate_for_user(&self, user_id: Uuid) -> Result<Option<Certificate>> {
        // ---
        let inner = self.state.lock().unwrap();
        Ok(inner
            .certificates
            .values()
            .find(|c| c.owner_user_id == user_id)
            .cloned())
    }

    async fn get_certificate_meta_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CertificateMeta>> {
        // ---
        let inner = self.state.lock().unwrap();
        Ok(inner
            .certificates
            .values()
            .find(|c| c.owner_user_id == user_id)
            .map(meta_of))
    }

    async fn list_certificates(&self) -> Result<Vec<CertificateListing>> {
        // ---
        let inner = self.state.lock().unwrap();
        let mut listings: Vec<CertificateListing> = inner
            .certificates
            .values()
            .filter_map(|c| {
                inner.users.get(&c.owner_user_id).map(|owner| CertificateListing {
                    id: c.id,
                    file_name: c.file_name.clone(),
                    issued_at: c.issued_at,
                    expires_at: c.expires_at,
                    status: c.status,
                    created_at: c.created_at,
                    owner_national_id: owner.national_id.clone(),
                    owner_full_name: owner.full_name.clone(),
                })
            })
            .collect();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listings)
    }
}

// ============================================================================
// Test server
// ============================================================================

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
    pub repository: RepositoryPtr,
}

impl TestServer {
    // ---
    pub async fn new() -> Self {
        // --

        let repository: RepositoryPtr = Arc::new(InMemoryRepository::new());
        let app = create_router_with_state(
            repository.clone(),
            create_noop_metrics().expect("Should be able to create metrics"),
            AuthConfig {
                jwt_secret: TEST_JWT_SECRET.to_string(),
                token_ttl: Duration::from_secs(604_800),
            },
            UploadConfig {
                max_bytes: 10 * 1024 * 1024,
            },
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        sleep(Duration::from_millis(100)).await;

        let client = Client::new();

        Self {
            addr,
            client,
            repository,
        }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }
}

// ============================================================================
// Flow helpers
// ============================================================================

/// Registers an account through the API and returns the response body.
pub async fn register(server: &TestServer, cedula: &str, nombre: &str) -> serde_json::Value {
    // ---
    let response = server
        .client
        .post(server.url("/auth/registro"))
        .json(&serde_json::json!({ "cedula": cedula, "nombre": nombre }))
        .send()
        .await
        .expect("Failed to send registration");

    assert_eq!(response.status(), 201, "registration should succeed");
    response.json().await.expect("Failed to parse registration body")
}

/// Logs in through the API and returns the session token.
pub async fn login(server: &TestServer, usuario: &str, password: &str) -> String {
    // ---
    let response = server
        .client
        .post(server.url("/auth/login"))
        .json(&serde_json::json!({ "usuario": usuario, "contraseña": password }))
        .send()
        .await
        .expect("Failed to send login");

    assert_eq!(response.status(), 200, "login should succeed");
    let body: serde_json::Value = response.json().await.expect("Failed to parse login body");
    body["token"].as_str().expect("token in login body").to_string()
}

/// Seeds an admin account directly in the store (there is no role-change
/// endpoint) and returns a session token for it.
pub async fn seed_admin(server: &TestServer, cedula: &str, nombre: &str) -> String {
    // ---
    let hash = hash_password(cedula).expect("Failed to hash admin password");
    let admin = User::new(
        cedula.to_string(),
        nombre.to_string(),
        None,
        hash,
        Role::Admin,
    );
    server
        .repository
        .create_user(admin)
        .await
        .expect("Failed to seed admin");

    login(server, cedula, cedula).await
}

/// Looks up a user's ID by national ID via the admin search endpoint.
pub async fn find_user_id(server: &TestServer, admin_token: &str, cedula: &str) -> String {
    // ---
    let response = server
        .client
        .get(server.url(&format!("/users/buscar/{cedula}")))
        .bearer_auth(admin_token)
        .send()
        .await
        .expect("Failed to send user search");

    assert_eq!(response.status(), 200, "user search should succeed");
    let body: serde_json::Value = response.json().await.expect("Failed to parse user body");
    body["id"].as_str().expect("id in user body").to_string()
}

/// Uploads a PDF for the given user through the multipart endpoint.
pub async fn upload_pdf(
    server: &TestServer,
    token: &str,
    user_id: &str,
    issued: &str,
    expires: &str,
    bytes: Vec<u8>,
) -> reqwest::Response {
    // ---
    let part = reqwest::multipart::Part::bytes(bytes)
        .file_name("certificado.pdf")
        .mime_str("application/pdf")
        .expect("Failed to build PDF part");

    let form = reqwest::multipart::Form::new()
        .part("certificado", part)
        .text("usuarioId", user_id.to_string())
        .text("fechaEmision", issued.to_string())
        .text("fechaVencimiento", expires.to_string());

    server
        .client
        .post(server.url("/certificate/upload"))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send upload")
}
