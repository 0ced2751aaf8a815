//! Process configuration, read once at start-up.

use std::net::SocketAddr;

use thiserror::Error;
use tracing::warn;

use careops_auth::{Algorithm, DEFAULT_TOKEN_TTL_MINUTES, PasswordHasher, TokenService};

pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://careops-01.netlify.app";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_APP_NAME: &str = "CareOps API";
const DEV_SECRET_KEY: &str = "careops-dev-secret-change-me";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl ToString) -> Self {
        Self::Invalid {
            key,
            message: message.to_string(),
        }
    }
}

/// Where records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    InMemory,
    /// Restricted and elevated connection strings.
    Postgres { database_url: String, admin_url: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub app_name: String,
    pub app_version: String,
    pub bind_addr: SocketAddr,
    pub persistence: Persistence,
    pub secret_key: String,
    pub algorithm: Algorithm,
    pub token_ttl_minutes: i64,
    pub allowed_origins: Vec<String>,
    pub bcrypt_cost: u32,
}

impl Settings {
    /// Read the process environment, honouring a `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let persistent = match var("USE_PERSISTENT_STORES") {
            None => false,
            Some(v) => {
                parse_bool(&v).ok_or_else(|| ConfigError::invalid("USE_PERSISTENT_STORES", v))?
            }
        };
        let persistence = if persistent {
            let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let admin_url = var("DATABASE_ADMIN_URL").unwrap_or_else(|| database_url.clone());
            Persistence::Postgres { database_url, admin_url }
        } else {
            Persistence::InMemory
        };

        let secret_key = var("SECRET_KEY").unwrap_or_else(|| {
            warn!("SECRET_KEY not set; using the development signing key");
            DEV_SECRET_KEY.to_string()
        });

        let algorithm = match var("ALGORITHM") {
            None => Algorithm::HS256,
            Some(v) => parse_algorithm(&v)?,
        };

        let token_ttl_minutes = match var("ACCESS_TOKEN_EXPIRE_MINUTES") {
            None => DEFAULT_TOKEN_TTL_MINUTES,
            Some(v) => match v.parse::<i64>() {
                Ok(m) if m > 0 => m,
                _ => return Err(ConfigError::invalid("ACCESS_TOKEN_EXPIRE_MINUTES", v)),
            },
        };

        let allowed_origins = var("ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_else(|| vec![DEFAULT_ALLOWED_ORIGIN.to_string()]);

        let bcrypt_cost = match var("BCRYPT_COST") {
            None => PasswordHasher::default().cost(),
            Some(v) => {
                let cost = v.parse::<u32>().map_err(|e| ConfigError::invalid("BCRYPT_COST", e))?;
                PasswordHasher::new(cost).map_err(|e| ConfigError::invalid("BCRYPT_COST", e))?;
                cost
            }
        };

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("BIND_ADDR", e))?;

        Ok(Self {
            app_name: var("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            app_version: var("APP_VERSION")
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            bind_addr,
            persistence,
            secret_key,
            algorithm,
            token_ttl_minutes,
            allowed_origins,
            bcrypt_cost,
        })
    }

    pub fn token_service(&self) -> Result<TokenService, ConfigError> {
        TokenService::new(
            self.secret_key.as_bytes(),
            self.algorithm,
            chrono::Duration::minutes(self.token_ttl_minutes),
        )
        .map_err(|e| ConfigError::invalid("ALGORITHM", e))
    }

    pub fn password_hasher(&self) -> Result<PasswordHasher, ConfigError> {
        PasswordHasher::new(self.bcrypt_cost).map_err(|e| ConfigError::invalid("BCRYPT_COST", e))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Only symmetric HMAC algorithms are accepted.
fn parse_algorithm(value: &str) -> Result<Algorithm, ConfigError> {
    match value.to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(ConfigError::invalid(
            "ALGORITHM",
            format!("{value} (expected HS256, HS384 or HS512)"),
        )),
    }
}
