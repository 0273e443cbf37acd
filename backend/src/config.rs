use chrono::Duration;
use std::env;

// Defaults used when the environment does not override them
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATABASE_URL: &str = "sqlite:patients.db";
const DEFAULT_USERNAME: &str = "asha_worker";
const DEFAULT_PASSWORD: &str = "password123";
const DEFAULT_JWT_SECRET: &str = "dev-only-signing-secret";

/// Server configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
}

/// The single configured credential pair plus token signing parameters.
///
/// The credential pair is configuration rather than a code literal so a
/// deployment (or a test) can swap it without touching the source.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    pub jwt_secret: String,
    /// Fixed expiry horizon for issued tokens
    pub token_ttl: Duration,
}

impl AppConfig {
    /// Build the configuration from environment variables, falling back to
    /// development defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        Self {
            port,
            database_url,
            auth: AuthConfig {
                username: env::var("APP_USERNAME").unwrap_or_else(|_| DEFAULT_USERNAME.to_string()),
                password: env::var("APP_PASSWORD").unwrap_or_else(|_| DEFAULT_PASSWORD.to_string()),
                jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
                token_ttl: Duration::hours(24),
            },
        }
    }
}

#[cfg(test)]
impl AuthConfig {
    /// Credentials and signing setup used across the test suite.
    pub fn for_tests() -> Self {
        Self {
            username: "asha_worker".to_string(),
            password: "password123".to_string(),
            jwt_secret: "test-signing-secret".to_string(),
            token_ttl: Duration::hours(24),
        }
    }
}
