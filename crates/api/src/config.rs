use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields but the JWT secret have defaults suitable for local
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
    /// Base URL of the remote admission service.
    pub admission_api_url: String,
    /// Timeout of every call to the admission service (default: `20`).
    pub admission_api_timeout_secs: u64,
    /// Language sent to the admission service when the token has none.
    pub default_language: String,
    /// Lifetime of unconsumed one-shot session entries (default: `900`).
    pub session_ttl_secs: u64,
    /// JWT token configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                                  |
    /// |------------------------------|------------------------------------------|
    /// | `HOST`                       | `0.0.0.0`                                |
    /// | `PORT`                       | `3000`                                   |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`                  |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                                     |
    /// | `ADMISSION_API_URL`          | `http://localhost:8000/api/v1/admission` |
    /// | `ADMISSION_API_TIMEOUT_SECS` | `20`                                     |
    /// | `DEFAULT_LANGUAGE`           | `fr-be`                                  |
    /// | `SESSION_TTL_SECS`           | `900`                                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let admission_api_url = std::env::var("ADMISSION_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000/api/v1/admission".into());

        let admission_api_timeout_secs: u64 = std::env::var("ADMISSION_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("ADMISSION_API_TIMEOUT_SECS must be a valid u64");

        let default_language =
            std::env::var("DEFAULT_LANGUAGE").unwrap_or_else(|_| "fr-be".into());

        let session_ttl_secs: u64 = std::env::var("SESSION_TTL_SECS")
            .unwrap_or_else(|_| "900".into())
            .parse()
            .expect("SESSION_TTL_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            admission_api_url,
            admission_api_timeout_secs,
            default_language,
            session_ttl_secs,
            jwt,
        }
    }
}
