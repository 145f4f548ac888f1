//! API configuration module.
//!
//! Configuration is layered with the `config` crate:
//!
//! ```text
//! built-in defaults
//!     ▼
//! emporium.toml (or --config <path>), optional
//!     ▼
//! EMPORIUM_* environment variables, e.g. EMPORIUM_SECURITY__JWT_SECRET
//! ```
//!
//! `.env` files are loaded into the environment by the binaries before
//! [`ApiConfig::load`] runs.

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use emporium_db::DbConfig;
use serde::Deserialize;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "emporium.toml";

/// Shortest accepted HS256 signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Top-level API configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub security: SecurityConfig,

    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// SQLite settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub path: PathBuf,
    pub max_connections: u32,
}

/// Token signing settings, passed explicitly to the auth layer at startup.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// HS256 key. No default; must be supplied.
    pub jwt_secret: String,

    /// Token lifetime in seconds (default: 24 hours).
    pub token_lifetime_secs: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            server: ServerConfig::default(),
            database: DatabaseSettings::default(),
            security: SecurityConfig::default(),
            log_filter: "info,emporium_api=debug,emporium_db=debug,tower_http=info".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: PathBuf::from("./emporium.db"),
            max_connections: 5,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        SecurityConfig {
            jwt_secret: String::new(),
            token_lifetime_secs: 86_400,
        }
    }
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_lifetime_secs", &self.token_lifetime_secs)
            .finish()
    }
}

impl ApiConfig {
    /// Loads configuration from defaults, an optional TOML file and the
    /// environment, then validates it.
    ///
    /// An explicit `config_file` must exist; the default `emporium.toml` is
    /// optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("EMPORIUM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: ApiConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the deserializer cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("security.jwt_secret".to_string()));
        }
        if self.security.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::InvalidValue(format!(
                "security.jwt_secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if self.security.token_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "security.token_lifetime_secs must be positive".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue("server.port must not be 0".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Address the HTTP listener binds to.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("server.host '{}'", self.server.host)))
    }

    /// Pool configuration for [`emporium_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database.path.clone()).max_connections(self.database.max_connections)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid() -> ApiConfig {
        let mut config = ApiConfig::default();
        config.security.jwt_secret = "x".repeat(MIN_SECRET_LEN);
        config
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.security.token_lifetime_secs, 86_400);
        assert_eq!(valid().bind_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_validate_secret() {
        assert!(matches!(
            ApiConfig::default().validate(),
            Err(ConfigError::MissingRequired(_))
        ));

        let mut short = valid();
        short.security.jwt_secret = "too-short".to_string();
        assert!(matches!(short.validate(), Err(ConfigError::InvalidValue(_))));

        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validate_ranges() {
        let mut config = valid();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.security.token_lifetime_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            log_filter = "warn"

            [server]
            port = 9090

            [security]
            jwt_secret = "0123456789abcdef0123456789abcdef"
            token_lifetime_secs = 600
            "#
        )
        .unwrap();

        let config = ApiConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.security.token_lifetime_secs, 600);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let result = ApiConfig::load(Some(Path::new("/nonexistent/emporium.toml")));
        assert!(matches!(result, Err(ConfigError::Source(_))));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", valid().security);
        assert!(!rendered.contains("xxxx"));
        assert!(rendered.contains("redacted"));
    }
}
