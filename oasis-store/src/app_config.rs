use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub auth: AuthConfig,
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
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// How long a rendered page stays cached when nothing invalidates it.
    pub page_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { page_ttl_seconds: 3600 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub provider_secret: String,
    pub session_seconds: u64,
    #[serde(default)]
    pub secure_cookie: bool,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local secrets, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `OASIS__AUTH__JWT_SECRET=...` sets `auth.jwt_secret`
            .add_source(config::Environment::with_prefix("OASIS").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config as Layers, File, FileFormat};

    const DEFAULTS: &str = r#"
        [server]
        port = 3000

        [database]
        url = "postgres://localhost/oasis"

        [redis]
        url = "redis://127.0.0.1"

        [auth]
        jwt_secret = "secret"
        provider_secret = "provider"
        session_seconds = 60
    "#;

    #[test]
    fn test_defaults_fill_optional_sections() {
        let config: Config = Layers::builder()
            .add_source(File::from_str(DEFAULTS, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.cache.page_ttl_seconds, 3600);
        assert_eq!(config.auth.session_seconds, 60);
        assert!(!config.auth.secure_cookie);
    }

    #[test]
    fn test_later_layer_overrides_earlier() {
        let config: Config = Layers::builder()
            .add_source(File::from_str(DEFAULTS, FileFormat::Toml))
            .add_source(File::from_str("[server]\nport = 8080", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.jwt_secret, "secret");
    }
}
