//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with POLLBOX_, sections split by `__`)
//! 2. Config file (config.toml)
//! 3. Default values
//!
//! Secrets like the auth API key and the session key should be kept in
//! environment variables, not in the config file.
//!
//! The configuration is loaded once by the binary and passed by value to the
//! pieces that need it; nothing here is global.

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Mark session cookies as Secure (requires HTTPS)
    pub secure_cookies: bool,
    /// Key for signing session cookies, at least 64 bytes
    /// (should be in env var POLLBOX_SERVER__SESSION_KEY)
    #[serde(default)]
    pub session_key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            secure_cookies: false,
            session_key: String::new(),
        }
    }
}

/// Relational store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL. Falls back to DATABASE_URL when empty.
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    /// Configured URL, or the DATABASE_URL environment variable.
    pub fn resolved_url(&self) -> Option<String> {
        if !self.url.is_empty() {
            return Some(self.url.clone());
        }
        std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty())
    }
}

/// Hosted identity provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Base URL of the hosted backend, e.g. https://project.example.co
    pub url: String,
    /// Public API key sent with every request (should be in env var POLLBOX_AUTH__API_KEY)
    #[serde(default)]
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9999".to_string(),
            api_key: String::new(),
            timeout_seconds: 10,
        }
    }
}

/// Administrator allow-list
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Emails granted cross-owner deletion and the full poll listing.
    /// From the environment: POLLBOX_ADMIN__EMAILS="a@example.com,b@example.com"
    pub emails: Vec<String>,
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub admin: AdminConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&AppConfig::default())?)
            // Add config file (optional)
            .add_source(File::new(path, FileFormat::Toml).required(false))
            // Override with environment variables, e.g. POLLBOX_SERVER__PORT
            .add_source(
                Environment::with_prefix("POLLBOX")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("admin.emails")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        log::info!(
            "Configuration loaded: server = {}:{}, {} administrator email(s)",
            app_config.server.bind_address,
            app_config.server.port,
            app_config.admin.emails.len()
        );
        Ok(app_config)
    }
}
