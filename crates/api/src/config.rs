use reetr_core::admin::DEFAULT_CLAIM_NAMESPACE;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Base URL of the content backend (default: `http://localhost:8000`).
    pub backend_api_url: String,
    /// Prefix of namespaced custom claims, e.g. `<ns>/admin`.
    pub admin_claim_namespace: String,
    /// Bearer-token validation settings.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:3001` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `BACKEND_API_URL`       | `http://localhost:8000` |
    /// | `ADMIN_CLAIM_NAMESPACE` | `https://yourapp.com`   |
    ///
    /// See [`JwtConfig::from_env`] for the token settings.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3001".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let backend_api_url =
            std::env::var("BACKEND_API_URL").unwrap_or_else(|_| "http://localhost:8000".into());

        let admin_claim_namespace = std::env::var("ADMIN_CLAIM_NAMESPACE")
            .unwrap_or_else(|_| DEFAULT_CLAIM_NAMESPACE.into());

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            backend_api_url,
            admin_claim_namespace,
            jwt,
        }
    }
}
