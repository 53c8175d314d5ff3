//! `config.json` settings

use pimctl_core::endpoints::{
    ArmEndpoints, DEFAULT_GRAPH_ENDPOINT, DEFAULT_MANAGEMENT_ENDPOINT, PIM_API_VERSION,
    SUBSCRIPTIONS_API_VERSION,
};
use pimctl_core::http::DEFAULT_TIMEOUT_SECS;
use pimctl_core::models::DEFAULT_MAX_DURATION_MINUTES;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ConfigPaths;
use crate::error::{CliError, CliResult};

/// User settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub management_endpoint: String,
    pub graph_endpoint: String,
    pub api_version: String,
    pub subscriptions_api_version: String,
    pub timeout_secs: u64,
    pub default_duration_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_ticket_system: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            management_endpoint: DEFAULT_MANAGEMENT_ENDPOINT.to_string(),
            graph_endpoint: DEFAULT_GRAPH_ENDPOINT.to_string(),
            api_version: PIM_API_VERSION.to_string(),
            subscriptions_api_version: SUBSCRIPTIONS_API_VERSION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_duration_minutes: DEFAULT_MAX_DURATION_MINUTES,
            default_ticket_system: None,
        }
    }
}

impl Config {
    /// Load `config.json`, or defaults when it does not exist.
    pub fn load(paths: &ConfigPaths) -> CliResult<Self> {
        if !paths.config_file.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&paths.config_file)
            .map_err(|e| CliError::Config(format!("Failed to read config file: {}", e)))?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            CliError::Config(format!(
                "Config file {} is invalid: {}",
                paths.config_file.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values no request could be built from.
    pub fn validate(&self) -> CliResult<()> {
        if self.management_endpoint.trim().is_empty() {
            return Err(CliError::Config("management_endpoint is empty".to_string()));
        }
        if self.graph_endpoint.trim().is_empty() {
            return Err(CliError::Config("graph_endpoint is empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(CliError::Config("timeout_secs must be positive".to_string()));
        }
        if self.default_duration_minutes == 0 {
            return Err(CliError::Config(
                "default_duration_minutes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn endpoints(&self) -> ArmEndpoints {
        ArmEndpoints::new(&self.management_endpoint, &self.graph_endpoint)
            .with_api_version(&self.api_version)
            .with_subscriptions_api_version(&self.subscriptions_api_version)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn paths_with(content: Option<&str>) -> (TempDir, ConfigPaths) {
        let dir = TempDir::new().unwrap();
        let paths = ConfigPaths::in_dir(dir.path().to_path_buf());
        if let Some(content) = content {
            std::fs::write(&paths.config_file, content).unwrap();
        }
        (dir, paths)
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let (_dir, paths) = paths_with(None);
        let config = Config::load(&paths).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.default_duration_minutes, 480);
        assert_eq!(config.api_version, "2020-10-01");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let (_dir, paths) =
            paths_with(Some(r#"{"default_duration_minutes": 60, "default_ticket_system": "Jira"}"#));
        let config = Config::load(&paths).unwrap();
        assert_eq!(config.default_duration_minutes, 60);
        assert_eq!(config.default_ticket_system.as_deref(), Some("Jira"));
        assert_eq!(config.management_endpoint, DEFAULT_MANAGEMENT_ENDPOINT);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let (_dir, paths) = paths_with(Some(r#"{"timeout_secs": 0}"#));
        assert!(matches!(Config::load(&paths), Err(CliError::Config(_))));

        let (_dir, paths) = paths_with(Some("{not json"));
        assert!(matches!(Config::load(&paths), Err(CliError::Config(_))));
    }

    #[test]
    fn test_endpoints_follow_config() {
        let config = Config {
            management_endpoint: "http://localhost:8080/".to_string(),
            api_version: "2022-04-01-preview".to_string(),
            ..Config::default()
        };
        let endpoints = config.endpoints();
        assert_eq!(endpoints.management(), "http://localhost:8080");
        assert_eq!(endpoints.api_version(), "2022-04-01-preview");
    }
}
