use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub events: EventsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

fn default_max_connections() -> u32 { 5 }

fn default_acquire_timeout() -> u64 { 3 }

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// JSON file with rooms, enrollments and tickets, loaded by the memory backend.
    pub seed_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EventsConfig {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize { 100 }

impl Default for EventsConfig {
    fn default() -> Self {
        Self { channel_capacity: default_channel_capacity() }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Developer overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. STAYBOOK__AUTH__JWT_SECRET=...
            .add_source(config::Environment::with_prefix("STAYBOOK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn from_toml(toml: &str) -> Result<Config, config::ConfigError> {
        config::Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_defaults_fill_optional_sections() {
        let config = from_toml(
            r#"
            [server]
            port = 4000

            [database]
            url = "postgres://localhost/staybook"

            [auth]
            jwt_secret = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.acquire_timeout_seconds, 3);
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert!(config.storage.seed_file.is_none());
        assert_eq!(config.events.channel_capacity, 100);
    }

    #[test]
    fn test_memory_backend() {
        let config = from_toml(
            r#"
            [server]
            port = 4000

            [database]
            url = ""

            [auth]
            jwt_secret = "secret"

            [storage]
            backend = "memory"
            seed_file = "config/seed.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.seed_file.as_deref(), Some("config/seed.json"));
    }

    #[test]
    fn test_missing_auth_is_an_error() {
        let result = from_toml(
            r#"
            [server]
            port = 4000

            [database]
            url = ""
            "#,
        );
        assert!(result.is_err());
    }
}
