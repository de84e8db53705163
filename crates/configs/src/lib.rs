//! # configs
//!
//! Layered runtime settings. Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. `config/default.toml`, then `config/local.toml` (both optional)
//! 3. `CIVIC__SECTION__KEY` environment variables (a `.env` file is loaded
//!    into the environment first)

use std::net::SocketAddr;

use config::{Config, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const ENV_PREFIX: &str = "CIVIC";
const JWT_SECRET_MIN_BYTES: usize = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// Absent or empty selects the in-memory backend.
    pub url: Option<SecretString>,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    pub token_ttl_minutes: i64,
    /// Password given to provisioned department admins.
    pub seed_admin_password: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

impl Settings {
    /// Reads `.env`, the config files and the process environment.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::from_env(environment())
    }

    /// Builds settings with an explicit environment source.
    pub fn from_env(env: Environment) -> Result<Self> {
        let settings: Settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 9090_i64)?
            .set_default("database.max_connections", 10_i64)?
            .set_default("auth.token_ttl_minutes", 60 * 24_i64)?
            .set_default("log.level", "info")?
            .set_default("log.json", false)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(env)
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.expose_secret().len() < JWT_SECRET_MIN_BYTES {
            return Err(ConfigError::Invalid(format!(
                "auth.jwt_secret must be at least {JWT_SECRET_MIN_BYTES} bytes"
            )));
        }
        if self.auth.token_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "auth.token_ttl_minutes must be positive".into(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("server address: {e}")))
    }
}

impl DatabaseSettings {
    pub fn url(&self) -> Option<&str> {
        self.url
            .as_ref()
            .map(|u| u.expose_secret())
            .filter(|u| !u.trim().is_empty())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Map;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        let vars: Map<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(vars))
    }

    #[test]
    fn defaults_fill_everything_but_the_secret() {
        let settings =
            Settings::from_env(env(&[("CIVIC__AUTH__JWT_SECRET", "0123456789abcdef")])).unwrap();
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.log.level, "info");
        assert!(settings.database.url().is_none());
        assert!(settings.auth.seed_admin_password.is_none());
        assert_eq!(settings.bind_addr().unwrap().port(), 9090);
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = Settings::from_env(env(&[
            ("CIVIC__AUTH__JWT_SECRET", "0123456789abcdef"),
            ("CIVIC__SERVER__PORT", "8088"),
            ("CIVIC__LOG__JSON", "true"),
            ("CIVIC__DATABASE__URL", "postgres://localhost/civic"),
        ]))
        .unwrap();
        assert_eq!(settings.server.port, 8088);
        assert!(settings.log.json);
        assert_eq!(settings.database.url(), Some("postgres://localhost/civic"));
    }

    #[test]
    fn missing_or_short_secret_is_rejected() {
        assert!(matches!(
            Settings::from_env(env(&[])),
            Err(ConfigError::Load(_))
        ));
        assert!(matches!(
            Settings::from_env(env(&[("CIVIC__AUTH__JWT_SECRET", "short")])),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let settings =
            Settings::from_env(env(&[("CIVIC__AUTH__JWT_SECRET", "0123456789abcdef")])).unwrap();
        assert!(!format!("{settings:?}").contains("0123456789abcdef"));
    }
}
