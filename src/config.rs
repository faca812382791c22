//! Configuration management for the Elidune admin console

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request body limit on multipart action routes
    pub max_upload_bytes: usize,
}

/// Library REST backend the console forwards to
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Access tokens expiring within this window are rotated on the token route
    pub refresh_threshold_seconds: i64,
    pub secure_cookies: bool,
    pub login_path: String,
    pub forbidden_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Cached view reads kept across all sessions, least recently used dropped first
    pub max_entries: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RealtimeConfig {
    pub hub_url: String,
    pub reconnect_initial_ms: u64,
    pub reconnect_max_ms: u64,
    pub keep_alive_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    /// Also write daily rolling log files here when set
    pub directory: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix ELIDUNE_ADMIN__)
            .add_source(
                Environment::with_prefix("ELIDUNE_ADMIN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("backend.base_url", env::var("BACKEND_URL").ok())?
            .set_override_option("realtime.hub_url", env::var("HUB_URL").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            user_agent: format!("elidune-admin/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_threshold_seconds: 300,
            secure_cookies: false,
            login_path: "/login".to_string(),
            forbidden_path: "/forbidden".to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 2048 }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            hub_url: "ws://localhost:8080/hubs/notifications".to_string(),
            reconnect_initial_ms: 500,
            reconnect_max_ms: 30_000,
            keep_alive_seconds: 15,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}
