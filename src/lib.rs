// src/lib.rs
use anyhow::Result;
use app_state::AppState;
use auth::AuthService;
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{delete, get, post},
    Router,
};

use domain::{MetricsPtr, RepositoryPtr};
use handlers::health_check;
use handlers::metrics_handler;
use handlers::root_handler;
use std::env;

// Public exports (visible outside this module)
pub mod domain;

// Internal-only exports (sibling access within this module)
mod app_state;
mod auth;
mod config;
mod error;
mod handlers;
mod infrastructure;

// Hoist up only the public symbol(s)
pub use auth::{hash_password, verify_password, Claims};

pub use config::*;

pub use error::{ApiError, ErrorKind};

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    create_noop_metrics, // ---
    create_postgres_repository,
    create_prom_metrics,
    init_database_with_retry,
};

/// Build the HTTP router with configuration, store and metrics resolved
/// from the environment.
pub async fn create_router() -> Result<Router> {
    // ---
    // Load all configuration from environment
    let config = AppConfig::from_env()?;

    // Determine metrics implementation from environment
    let metrics_type = env::var("CERTTRACK_METRICS_TYPE").unwrap_or_else(|_| "noop".to_string());
    let metrics = if metrics_type == "prom" {
        create_prom_metrics()?
    } else {
        create_noop_metrics()?
    };

    tracing_subscriber::fmt::try_init().ok(); // Ignores if already initialized

    // Create infrastructure dependencies
    let pool = init_database_with_retry(&config.database).await?;
    let repository = create_postgres_repository(pool);

    Ok(create_router_with_state(
        repository,
        metrics,
        config.auth,
        config.upload,
    ))
}

/// Build the HTTP router from explicitly provided dependencies.
///
/// This is the wiring seam used by `create_router` and by integration
/// tests, which swap in an in-memory repository and a no-op metrics
/// implementation.
pub fn create_router_with_state(
    repository: RepositoryPtr,
    metrics: MetricsPtr,
    auth_config: AuthConfig,
    upload_config: UploadConfig,
) -> Router {
    // ---
    let app_state = AppState::new(repository, metrics, AuthService::new(auth_config));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest(
            "/auth",
            Router::new()
                .route("/registro", post(handlers::register))
                .route("/login", post(handlers::login))
                .route("/logout", post(handlers::logout))
                .route("/me", get(handlers::me)),
        )
        .nest(
            "/certificate",
            Router::new()
                .route(
                    "/upload",
                    post(handlers::upload_certificate)
                        .layer(DefaultBodyLimit::max(upload_config.max_bytes)),
                )
                .route("/me", get(handlers::my_certificate))
                .route("/download", get(handlers::download_certificate))
                .route("/all", get(handlers::list_certificates)),
        )
        .nest(
            "/users",
            Router::new()
                .route("/", get(handlers::list_users))
                .route("/buscar/{cedula}", get(handlers::find_user))
                .route("/crear", post(handlers::create_user))
                .route("/{id}", delete(handlers::delete_user)),
        )
        .with_state(app_state)
}
