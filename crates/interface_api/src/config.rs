//! API configuration

use serde::Deserialize;
use std::time::Duration;

/// API configuration
///
/// Every field can be set through an `API_`-prefixed environment variable,
/// e.g. `API_JWT_SECRET` or `API_REQUEST_TIMEOUT_SECS`. Unset fields keep
/// their defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    pub db_max_connections: u32,
    /// Log level, used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable text
    pub log_json: bool,
    /// Requests running longer than this are answered with 408
    pub request_timeout_secs: u64,
    /// Read notifications older than this are removed at startup
    pub notification_retention_days: u32,
    /// Idempotency records older than this are removed at startup
    pub idempotency_ttl_hours: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/lost_found".to_string(),
            db_max_connections: 10,
            log_level: "info".to_string(),
            log_json: false,
            request_timeout_secs: 30,
            notification_retention_days: 180,
            idempotency_ttl_hours: 24,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero durations, which would expire tokens on issue, time out
    /// every request, or purge records the moment they are written
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let durations = [
            ("jwt_expiration_secs", self.jwt_expiration_secs),
            ("request_timeout_secs", self.request_timeout_secs),
            ("notification_retention_days", u64::from(self.notification_retention_days)),
            ("idempotency_ttl_hours", u64::from(self.idempotency_ttl_hours)),
        ];
        match durations.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(config::ConfigError::Message(format!(
                "{name} must be greater than zero"
            ))),
            None => Ok(()),
        }
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.jwt_expiration_secs, 3600);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_source_keeps_defaults() {
        let config: ApiConfig = config::Config::builder()
            .set_override("port", 9090)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.notification_retention_days, 180);
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(ApiConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_retention_is_rejected() {
        let config = ApiConfig {
            notification_retention_days: 0,
            ..ApiConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("notification_retention_days"));

        let config = ApiConfig {
            idempotency_ttl_hours: 0,
            ..ApiConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_retention_does_not_deserialize() {
        let result = config::Config::builder()
            .set_override("notification_retention_days", -1)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<ApiConfig>();

        assert!(result.is_err());
    }
}
