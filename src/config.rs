//! Layered runtime configuration for the admin binary.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::db::DEFAULT_BUSY_TIMEOUT;
use crate::domain::crawl::{CrawlLease, DEFAULT_LEASE_SECONDS};
use crate::domain::types::{TypeConstraintError, WorkerId};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// SQLite database URL or file path.
    pub database_url: String,
    /// Identity recorded on claimed rows; defaults to one derived from the pid.
    #[serde(default)]
    pub crawl_worker_id: Option<String>,
    #[serde(default = "default_lease_seconds")]
    pub crawl_lease_seconds: i64,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_lease_seconds() -> i64 {
    DEFAULT_LEASE_SECONDS
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT.as_millis() as u64
}

impl AppConfig {
    /// Reads `config/default.yaml`, `config/local.yaml` and `APP_*` variables,
    /// later sources overriding earlier ones. `.env` is loaded first if present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("APP"))
            .build()?
            .try_deserialize()
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn lease(&self) -> Result<CrawlLease, TypeConstraintError> {
        if self.crawl_lease_seconds < 0 {
            return Err(TypeConstraintError::NegativeNumber("crawl_lease_seconds"));
        }
        let worker_id = match &self.crawl_worker_id {
            Some(id) => WorkerId::new(id.as_str())?,
            None => WorkerId::for_current_process(),
        };
        let duration = chrono::TimeDelta::try_seconds(self.crawl_lease_seconds).ok_or_else(|| {
            TypeConstraintError::InvalidValue(format!(
                "crawl_lease_seconds: {} is out of range",
                self.crawl_lease_seconds
            ))
        })?;
        Ok(CrawlLease::new(worker_id, duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        serde_json::from_value(serde_json::json!({ "database_url": "catalog.db" })).unwrap()
    }

    #[test]
    fn missing_optional_settings_use_defaults() {
        let config = config();
        assert_eq!(config.crawl_lease_seconds, DEFAULT_LEASE_SECONDS);
        assert_eq!(config.busy_timeout(), DEFAULT_BUSY_TIMEOUT);
        assert!(config.crawl_worker_id.is_none());
    }

    #[test]
    fn lease_uses_configured_worker() {
        let mut config = config();
        config.crawl_worker_id = Some("crawler-1".into());
        config.crawl_lease_seconds = 30;

        let lease = config.lease().unwrap();
        assert_eq!(lease.worker_id, "crawler-1");
        assert_eq!(lease.duration, chrono::Duration::seconds(30));
    }

    #[test]
    fn oversized_lease_is_rejected() {
        let mut config = config();
        config.crawl_lease_seconds = i64::MAX;
        assert!(matches!(
            config.lease().unwrap_err(),
            TypeConstraintError::InvalidValue(_)
        ));
    }

    #[test]
    fn negative_lease_is_rejected() {
        let mut config = config();
        config.crawl_lease_seconds = -1;
        assert!(config.lease().is_err());
    }
}
