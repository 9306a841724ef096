// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod auth;
mod certificates;
mod health;
mod metrics;
mod root;
mod shared_types;
mod users;

// Core handlers
pub use health::health_check;
pub use metrics::metrics_handler;
pub use root::root_handler;

// Auth handlers
pub use auth::{login, logout, me, register};

// Certificate lifecycle handlers
pub use certificates::{
    download_certificate, list_certificates, my_certificate, upload_certificate,
};

// User administration handlers
pub use users::{create_user, delete_user, find_user, list_users};
