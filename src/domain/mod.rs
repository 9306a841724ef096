mod metrics;
mod models;
mod repository;

// Publicly expose the Metrics abstraction
pub use metrics::{Metrics, MetricsPtr};

// Publicly expose the persistence abstraction and data model
pub use models::{
    effective_status, Certificate, CertificateListing, CertificateMeta, CertificateStatus, Role,
    User,
};
pub use repository::{Repository, RepositoryPtr};
