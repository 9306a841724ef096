//! Application state management.
//!
//! Defines the shared state passed to all Axum handlers via the `State`
//! extractor: the persistence repository, the metrics implementation and
//! the auth service. Built once at startup, never mutated, and cheaply
//! cloneable (heavy resources live behind `Arc`).

use crate::auth::AuthService;
use crate::domain::{MetricsPtr, RepositoryPtr};

/// Shared application state passed to all Axum handlers.
///
/// Handlers depend on the `Repository` and `Metrics` abstractions, not
/// on concrete implementations, so tests can swap in in-memory backends.
#[derive(Clone)]
pub(crate) struct AppState {
    /// Repository abstraction for persistent storage (users, certificates).
    repository: RepositoryPtr,

    /// Metrics implementation (Prometheus-backed or no-op).
    metrics: MetricsPtr,

    /// Token issuing and verification, configured at startup.
    auth: AuthService,
}

impl AppState {
    // ---

    pub fn new(repository: RepositoryPtr, metrics: MetricsPtr, auth: AuthService) -> Self {
        // ---
        AppState {
            repository,
            metrics,
            auth,
        }
    }

    /// Get a reference to the repository implementation.
    pub(crate) fn repository(&self) -> &RepositoryPtr {
        // ---
        &self.repository
    }

    /// Get a reference to the metrics implementation.
    pub(crate) fn metrics(&self) -> &MetricsPtr {
        // ---
        &self.metrics
    }

    /// Get a reference to the auth service.
    pub(crate) fn auth(&self) -> &AuthService {
        // ---
        &self.auth
    }
}
