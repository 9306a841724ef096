// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Configuration is validated eagerly and failures are treated as
//! deployment errors rather than recoverable runtime conditions.

use anyhow::Result;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads a required environment variable.
///
/// # Behavior
/// - Fails fast if the variable is missing
/// - Produces a clear, human-readable error message
/// - Intended for startup-time configuration validation
///
/// Missing configuration is treated as a deployment error,
/// not a recoverable runtime condition.
macro_rules! required_env {
    // ---
    ($key:literal) => {
        std::env::var($key)
            .map_err(|_| anyhow::anyhow!(concat!("Missing required configuration: ", $key)))?
    };
}

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails due to a missing
/// required environment variable.
///
/// This macro is intended for config unit tests only and enforces
/// consistent error messages across failure cases.
macro_rules! assert_missing_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Missing required configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
/// All required configuration is validated eagerly during initialization.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: database::DatabaseConfig,
    pub auth: auth::AuthConfig,
    pub upload: upload::UploadConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any required configuration is missing or invalid.
    /// This function is intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            database: database::DatabaseConfig::from_env()?,
            auth: auth::AuthConfig::from_env()?,
            upload: upload::UploadConfig::from_env()?,
        })
    }
}

// ============================================================
// Database configuration
// ============================================================

mod database {
    // ---
    use super::*;

    /// Database-related configuration derived from environment variables.
    ///
    /// This configuration is required for the service to function and
    /// is validated eagerly during startup.
    #[derive(Debug, Clone)]
    pub struct DatabaseConfig {
        /// PostgreSQL connection string.
        pub database_url: String,

        /// Number of retry attempts when initializing the database connection. Defaults to 50.
        pub retry_count: u32,

        /// Maximum time to wait when acquiring a connection from the pool. Defaults to 30 seconds.
        pub acquire_timeout: Duration,

        /// Minimum number of connections to keep in the pool, even when idle. Defaults to 2.
        pub min_connections: u32,

        /// Maximum number of connections to be open concurrently. Defaults to 15.
        pub max_connections: u32,
    }

    impl DatabaseConfig {
        /// Builds a [`DatabaseConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if required configuration is missing.
        /// Startup will fail fast rather than continuing with incomplete
        /// or invalid configuration.
        pub fn from_env() -> Result<Self> {
            // ---
            let database_url = required_env!("DATABASE_URL");
            let retry_count = optional_env_parse!("CERTTRACK_DB_RETRY_COUNT", u32, 50);
            let acquire_timeout_secs =
                optional_env_parse!("CERTTRACK_DB_ACQUIRE_TIMEOUT_SEC", u64, 30);
            let min_connections = optional_env_parse!("CERTTRACK_DB_MIN_CONNECTIONS", u32, 2);
            let max_connections = optional_env_parse!("CERTTRACK_DB_MAX_CONNECTIONS", u32, 15);

            Ok(Self {
                database_url,
                retry_count,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
                min_connections,
                max_connections,
            })
        }
    }
}
pub use database::DatabaseConfig;

// ============================================================
// Auth configuration
// ============================================================

mod auth {
    // ---
    use super::*;

    /// Token-signing configuration.
    ///
    /// The signing secret is deliberately carried in an explicit config
    /// object handed to the auth service at startup instead of being read
    /// from the environment at verification time.
    #[derive(Debug, Clone)]
    pub struct AuthConfig {
        /// Secret used to sign and verify session tokens.
        pub jwt_secret: String,

        /// Session token lifetime. Defaults to 7 days.
        pub token_ttl: Duration,
    }

    impl AuthConfig {
        /// Builds an [`AuthConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if required configuration is missing.
        /// The signing secret is security-critical and must be
        /// explicitly provided.
        pub fn from_env() -> Result<Self> {
            // ---
            let jwt_secret = required_env!("CERTTRACK_JWT_SECRET");

            let ttl_secs = optional_env_parse!("CERTTRACK_TOKEN_TTL_SEC", u64, 604_800);

            Ok(Self {
                jwt_secret,
                token_ttl: Duration::from_secs(ttl_secs),
            })
        }
    }
}
pub use auth::AuthConfig;

// ============================================================
// Upload configuration
// ============================================================

mod upload {
    // ---
    use super::*;

    /// Certificate-upload limits.
    #[derive(Debug, Clone)]
    pub struct UploadConfig {
        /// Maximum accepted upload size in bytes. Defaults to 10 MiB.
        pub max_bytes: usize,
    }

    impl UploadConfig {
        /// Builds an [`UploadConfig`] from environment variables.
        pub fn from_env() -> Result<Self> {
            // ---
            let max_bytes =
                optional_env_parse!("CERTTRACK_MAX_UPLOAD_BYTES", usize, 10 * 1024 * 1024);

            Ok(Self { max_bytes })
        }
    }
}
pub use upload::UploadConfig;

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use anyhow::Result;
    use serial_test::serial;

    #[test]
    #[serial]
    fn missing_database_url_fails() -> Result<()> {
        // ---
        std::env::remove_var("DATABASE_URL");

        assert_missing_config!(database::DatabaseConfig::from_env(), "DATABASE_URL");

        Ok(())
    }

    #[test]
    #[serial]
    fn missing_jwt_secret_fails() -> Result<()> {
        // ---
        std::env::remove_var("CERTTRACK_JWT_SECRET");

        assert_missing_config!(auth::AuthConfig::from_env(), "CERTTRACK_JWT_SECRET");

        Ok(())
    }

    #[test]
    #[serial]
    fn database_defaults_applied() -> Result<()> {
        // ---
        let db_url = "postgres://test";
        std::env::set_var("DATABASE_URL", db_url); // required

        std::env::remove_var("CERTTRACK_DB_RETRY_COUNT");
        std::env::remove_var("CERTTRACK_DB_ACQUIRE_TIMEOUT_SEC");
        std::env::remove_var("CERTTRACK_DB_MIN_CONNECTIONS");
        std::env::remove_var("CERTTRACK_DB_MAX_CONNECTIONS");

        let cfg = database::DatabaseConfig::from_env()?;
        assert_eq!(cfg.database_url, db_url);
        assert_eq!(cfg.retry_count, 50);
        assert_eq!(cfg.acquire_timeout.as_secs(), 30);
        assert_eq!(cfg.min_connections, 2);
        assert_eq!(cfg.max_connections, 15);

        Ok(())
    }

    #[test]
    #[serial]
    fn database_overrides_defaults() -> Result<()> {
        // ---

        let db_url = "postgres://test";
        std::env::set_var("DATABASE_URL", db_url);
        std::env::set_var("CERTTRACK_DB_RETRY_COUNT", "3");
        std::env::set_var("CERTTRACK_DB_ACQUIRE_TIMEOUT_SEC", "5");
        std::env::set_var("CERTTRACK_DB_MIN_CONNECTIONS", "10");
        std::env::set_var("CERTTRACK_DB_MAX_CONNECTIONS", "1000");

        let cfg = database::DatabaseConfig::from_env()?;
        assert_eq!(cfg.retry_count, 3);
        assert_eq!(cfg.acquire_timeout.as_secs(), 5);
        assert_eq!(cfg.database_url, db_url);
        assert_eq!(cfg.min_connections, 10);
        assert_eq!(cfg.max_connections, 1000);

        std::env::remove_var("CERTTRACK_DB_RETRY_COUNT");
        std::env::remove_var("CERTTRACK_DB_ACQUIRE_TIMEOUT_SEC");
        std::env::remove_var("CERTTRACK_DB_MIN_CONNECTIONS");
        std::env::remove_var("CERTTRACK_DB_MAX_CONNECTIONS");

        Ok(())
    }

    #[test]
    #[serial]
    fn auth_token_ttl_defaults_to_seven_days() -> Result<()> {
        // ---
        std::env::set_var("CERTTRACK_JWT_SECRET", "config-test-secret");
        std::env::remove_var("CERTTRACK_TOKEN_TTL_SEC");

        let cfg = auth::AuthConfig::from_env()?;
        assert_eq!(cfg.token_ttl.as_secs(), 604_800);

        Ok(())
    }

    #[test]
    #[serial]
    fn app_config_from_env_success() -> Result<()> {
        // ---
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::set_var("CERTTRACK_JWT_SECRET", "config-test-secret");

        let cfg = AppConfig::from_env()?;
        assert_eq!(cfg.upload.max_bytes, 10 * 1024 * 1024);

        Ok(())
    }
}
