//! TOML-based configuration for Tasker
//!
//! Configuration is read once from `tasker.toml` at startup. Secrets never
//! live in the file itself: the file names the environment variables that
//! hold them.
//!
//! The loaded value is immutable; there is no hot reloading, since the token
//! signing secret must not change under a running process.

use crate::auth::jwt::{MIN_SECRET_LEN, SecurityConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure loaded from tasker.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskerConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the JWT secret
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    #[serde(default = "default_token_lifetime_minutes")]
    pub token_lifetime_minutes: i64,

    /// Environment variables holding an administrator to create at startup
    pub admin_email_env: Option<String>,
    pub admin_password_env: Option<String>,
}

fn default_jwt_secret_env() -> String {
    "JWT_SECRET".to_string()
}

fn default_token_lifetime_minutes() -> i64 {
    60
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            token_lifetime_minutes: default_token_lifetime_minutes(),
            admin_email_env: None,
            admin_password_env: None,
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Signing secret must be at least {min_bytes} bytes")]
    WeakSecret { min_bytes: usize },
}

/// Credentials for the administrator created at startup.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl TaskerConfig {
    /// Load configuration from a TOML file and validate it.
    ///
    /// A missing or weak signing secret is an error here, so the server
    /// refuses to start rather than failing per request.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: TaskerConfig = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration for internal consistency and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }

        if self.auth.token_lifetime_minutes <= 0 {
            return Err(ConfigError::ValidationError(
                "auth.token_lifetime_minutes must be positive".to_string(),
            ));
        }
        self.token_lifetime()?;

        let secret = self.jwt_secret()?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret {
                min_bytes: MIN_SECRET_LEN,
            });
        }

        if self.auth.admin_email_env.is_some() != self.auth.admin_password_env.is_some() {
            return Err(ConfigError::ValidationError(
                "auth.admin_email_env and auth.admin_password_env must be set together"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    /// Get the JWT secret from the environment
    pub fn jwt_secret(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.auth.jwt_secret_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.auth.jwt_secret_env.clone()))
    }

    /// Token lifetime as a duration; fails when the minute count is out of range.
    pub fn token_lifetime(&self) -> Result<chrono::Duration, ConfigError> {
        chrono::Duration::try_minutes(self.auth.token_lifetime_minutes).ok_or_else(|| {
            ConfigError::ValidationError("auth.token_lifetime_minutes is too large".to_string())
        })
    }

    /// Build the immutable security config handed to the token service.
    pub fn security(&self) -> Result<SecurityConfig, ConfigError> {
        SecurityConfig::new(self.jwt_secret()?.into_bytes(), self.token_lifetime()?)
    }

    /// Resolve the startup administrator, if configured.
    pub fn admin_bootstrap(&self) -> Result<Option<AdminBootstrap>, ConfigError> {
        let (Some(email_env), Some(password_env)) =
            (&self.auth.admin_email_env, &self.auth.admin_password_env)
        else {
            return Ok(None);
        };

        let email = self
            .resolve_env(email_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(email_env.clone()))?;
        let password = self
            .resolve_env(password_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(password_env.clone()))?;

        Ok(Some(AdminBootstrap { email, password }))
    }
}
