use std::sync::Arc;

/// Abstraction for application metrics (counters).
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> String;

    /// Record a completed account registration.
    fn record_user_registered(&self);

    /// Record a login attempt and its outcome.
    fn record_login_attempt(&self, success: bool);

    /// Record a certificate upload.
    fn record_certificate_uploaded(&self);

    /// Record a certificate download.
    fn record_certificate_downloaded(&self);
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
