use axum::response::IntoResponse;

pub async fn root_handler() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        r#"Certification Tracking API
Version: {version}

Available endpoints:
  - POST   /auth/registro          - Register an account (national ID + name)
  - POST   /auth/login             - Log in, returns a bearer token
  - POST   /auth/logout            - Acknowledge logout (token auth)
  - GET    /auth/me                - Current account profile (token auth)
  - POST   /certificate/upload     - Upload a user's PDF certificate (admin)
  - GET    /certificate/me         - Own certificate summary (token auth)
  - GET    /certificate/download   - Download own certificate PDF (token auth)
  - GET    /certificate/all        - List all certificates (admin)
  - GET    /users                  - List accounts (admin)
  - GET    /users/buscar/{{cedula}}  - Find an account by national ID (admin)
  - POST   /users/crear            - Create an account (admin)
  - DELETE /users/{{id}}             - Delete an account (admin)
  - GET    /health                 - Light health check
  - GET    /health?mode=full       - Full health check (includes the store)
  - GET    /metrics                - Prometheus metrics
"#
    )
}
