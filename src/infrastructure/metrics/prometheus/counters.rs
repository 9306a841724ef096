use metrics::counter;

/// Increment the counter of registered accounts.
pub fn increment_user_registered() {
    counter!("users_registered_total").increment(1);
}

/// Increment the login-attempt counter, labeled by outcome.
pub fn increment_login_attempt(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("login_attempts_total", "outcome" => outcome).increment(1);
}

/// Increment the counter of uploaded certificates.
pub fn increment_certificate_uploaded() {
    counter!("certificates_uploaded_total").increment(1);
}

/// Increment the counter of certificate downloads.
pub fn increment_certificate_downloaded() {
    counter!("certificates_downloaded_total").increment(1);
}
