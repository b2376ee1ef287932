use std::env;

use crate::error::ConfigError;

const LOCAL_JWT_SECRET: &str = "local-development-secret-change-me";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// AppConfig
///
/// Immutable configuration, loaded once at startup and shared through the
/// application state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Postgres connection string. `None` selects the in-memory repository (local only).
    pub db_url: Option<String>,
    /// Runtime environment marker. Controls the dev header bypass and log format.
    pub env: Env,
    /// HMAC secret used to validate incoming JWTs.
    pub jwt_secret: String,
    pub bind_addr: String,
}

/// Env
///
/// `Local` enables developer conveniences (header bypass, optional database, pretty logs);
/// `Production` requires every secret to be set explicitly.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_url: None,
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads `APP_ENV`, `DATABASE_URL`, `JWT_SECRET` and `BIND_ADDR`.
    /// In production a missing `DATABASE_URL` or `JWT_SECRET` is an error, so the
    /// service never starts half-configured.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let db_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        let jwt_secret = env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        match env {
            Env::Local => Ok(Self {
                env: Env::Local,
                db_url,
                jwt_secret: jwt_secret.unwrap_or_else(|| LOCAL_JWT_SECRET.to_string()),
                bind_addr,
            }),
            Env::Production => Ok(Self {
                env: Env::Production,
                db_url: Some(db_url.ok_or(ConfigError::Missing("DATABASE_URL"))?),
                jwt_secret: jwt_secret.ok_or(ConfigError::Missing("JWT_SECRET"))?,
                bind_addr,
            }),
        }
    }
}
