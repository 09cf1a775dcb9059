//! Configuration management for the field report server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FIELDREPORT_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Postgres (Supabase) report store
    pub database: DatabaseConfig,

    /// Local SQLite report store, used when no Postgres URL is set
    pub sqlite: SqliteConfig,

    /// Identity provider token verification
    pub auth: AuthConfig,

    /// Recommendation knowledge table
    pub recommendations: RecommendationsConfig,

    /// Demo fixtures served when no store has the report
    pub fallback: FallbackConfig,

    /// Share-token troubleshooting endpoint
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Apply the bundled migrations at startup
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SqliteConfig {
    /// Path of the SQLite file, created when missing
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity provider
    pub jwt_secret: String,

    /// Expected `aud` claim
    pub audience: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecommendationsConfig {
    /// JSON file replacing the built-in organism table
    pub table_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FallbackConfig {
    pub mock_enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiagnosticsConfig {
    pub enabled: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("FIELDREPORT_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.run_migrations", environment == "development")?
            .set_default("auth.jwt_secret", "development-secret-key")?
            .set_default("auth.audience", "authenticated")?
            .set_default("fallback.mock_enabled", true)?
            .set_default("diagnostics.enabled", environment == "development")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FIELDREPORT_ prefix)
            .add_source(
                Environment::with_prefix("FIELDREPORT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
impl Config {
    /// Development defaults with no store configured
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: None,
                max_connections: 1,
                min_connections: 1,
                run_migrations: false,
            },
            sqlite: SqliteConfig { path: None },
            auth: AuthConfig {
                jwt_secret: "test-secret".to_string(),
                audience: "authenticated".to_string(),
            },
            recommendations: RecommendationsConfig { table_path: None },
            fallback: FallbackConfig { mock_enabled: true },
            diagnostics: DiagnosticsConfig { enabled: true },
        }
    }
}
