//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Minimum accepted length of the JWT signing secret.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Token issuing configuration.
    pub auth: AuthConfig,
    /// Rescue workflow tunables.
    #[serde(default)]
    pub rescue: RescueConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the built front-end bundle, served for non-API paths.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens.
    pub jwt_secret: String,
    /// Lifetime of an issued token in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

/// Rescue workflow configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RescueConfig {
    /// Points awarded to a rescuer for accepting a case.
    #[serde(default = "default_points_per_rescue")]
    pub points_per_rescue: i32,
    /// Number of entries in the analytics leaderboard.
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
    /// Default search radius for nearby vets, in kilometres.
    #[serde(default = "default_vet_radius")]
    pub nearby_vet_radius_km: f64,
    /// Maximum notifications returned per listing.
    #[serde(default = "default_notification_limit")]
    pub notification_list_limit: u64,
}

impl Default for RescueConfig {
    fn default() -> Self {
        Self {
            points_per_rescue: default_points_per_rescue(),
            leaderboard_size: default_leaderboard_size(),
            nearby_vet_radius_km: default_vet_radius(),
            notification_list_limit: default_notification_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    5000
}

const fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_token_ttl() -> u64 {
    7 * 24 * 60 * 60
}

const fn default_points_per_rescue() -> i32 {
    10
}

const fn default_leaderboard_size() -> usize {
    5
}

const fn default_vet_radius() -> f64 {
    10.0
}

const fn default_notification_limit() -> u64 {
    50
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, exported into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `PAWS_ENV`)
    /// 4. Environment variables with `PAWS__` prefix, e.g. `PAWS__DATABASE__URL`
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("PAWS_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PAWS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("PAWS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would run insecurely or nonsensically.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(config::ConfigError::Message(format!(
                "auth.jwt_secret must be at least {MIN_JWT_SECRET_LEN} characters"
            )));
        }
        if self.rescue.nearby_vet_radius_km <= 0.0 {
            return Err(config::ConfigError::Message(
                "rescue.nearby_vet_radius_km must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Result<Config, config::ConfigError> {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    const MINIMAL: &str = r#"
        [server]
        [database]
        url = "postgres://localhost/paws"
        [auth]
        jwt_secret = "0123456789abcdef0123456789abcdef"
    "#;

    #[test]
    fn test_defaults_applied() {
        let config = parse(MINIMAL).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.server.static_dir.is_none());
        assert_eq!(config.auth.token_ttl_secs, 604_800);
        assert_eq!(config.rescue.points_per_rescue, 10);
        assert_eq!(config.rescue.leaderboard_size, 5);
        assert_eq!(config.rescue.notification_list_limit, 50);
    }

    #[test]
    fn test_short_secret_rejected() {
        let toml = MINIMAL.replace("0123456789abcdef0123456789abcdef", "short");
        let err = parse(&toml).unwrap_err();
        assert!(err.to_string().contains("jwt_secret"));
    }

    #[test]
    fn test_rescue_overrides() {
        let toml = format!("{MINIMAL}\n[rescue]\npoints_per_rescue = 25\nleaderboard_size = 3\n");
        let config = parse(&toml).unwrap();
        assert_eq!(config.rescue.points_per_rescue, 25);
        assert_eq!(config.rescue.leaderboard_size, 3);
        assert!((config.rescue.nearby_vet_radius_km - 10.0).abs() < f64::EPSILON);
    }
}
