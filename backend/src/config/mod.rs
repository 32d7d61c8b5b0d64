//! Configuration management for the ProjHealth backend
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: PH__)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Request limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub request_timeout_secs: u64,
    /// Generated plans can be large; this bounds a single JSON body
    pub body_limit_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// CORS configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; empty allows any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            http: HttpConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with PH__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name(&config_file).required(false))
            // e.g. PH__SERVER__PORT=9000 sets server.port,
            // PH__CORS__ALLOWED_ORIGINS=https://a.example,https://b.example sets the origin list
            .add_source(
                config::Environment::with_prefix("PH")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }

    /// Problems that make this configuration unfit for production
    pub fn production_issues(&self) -> Vec<&'static str> {
        let mut issues = Vec::new();
        if self.cors.allowed_origins.is_empty() {
            issues.push("CORS allowed_origins must be set explicitly in production");
        }
        if self.cors.allowed_origins.iter().any(|o| o == "*") {
            issues.push("CORS allowed_origins must not contain '*' in production");
        }
        if self.http.request_timeout_secs == 0 {
            issues.push("HTTP request_timeout_secs must be greater than zero");
        }
        if self.http.body_limit_bytes == 0 {
            issues.push("HTTP body_limit_bytes must be greater than zero");
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.http.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.http.body_limit_bytes, 1_048_576);
        assert!(config.cors.allowed_origins.is_empty());
    }

    #[test]
    fn test_is_production() {
        // Default should be false (development)
        assert!(!AppConfig::is_production());
    }

    #[test]
    fn test_production_issues() {
        let mut config = AppConfig::default();
        assert_eq!(config.production_issues().len(), 1);

        config.cors.allowed_origins = vec!["https://app.projhealth.example".to_string()];
        assert!(config.production_issues().is_empty());

        config.cors.allowed_origins.push("*".to_string());
        config.http.request_timeout_secs = 0;
        assert_eq!(config.production_issues().len(), 2);
    }

    #[test]
    fn test_sections_default_when_missing() {
        let config: AppConfig =
            serde_json::from_str(r#"{"server": {"host": "0.0.0.0", "port": 3000}}"#).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.http.request_timeout_secs, 30);
        assert!(config.cors.allowed_origins.is_empty());
    }
}
