use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RegError;
use crate::retry::RetryPolicy;

pub const CONFIG_ENV: &str = "REPLICA_REG_CONFIG";

#[derive(Debug, Deserialize, Serialize)]
pub struct ConfigFile {
    pub catalog_url: String,
    pub location: String,
    pub scope: String,
    pub storage_root: String,
    pub transfer_url: String,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub backoff_secs: Option<[u64; 2]>,
}

#[derive(Debug, Clone)]
pub struct RegisterConfig {
    pub catalog_url: String,
    pub location: String,
    pub scope: String,
    pub storage_root: String,
    pub transfer_url: String,
    pub retry: RetryPolicy,
}

pub struct ConfigLoader;

impl ConfigLoader {
    // Env var first, then the command line; neither set is an error.
    pub fn resolve(path: Option<&str>) -> Result<RegisterConfig, RegError> {
        let config_path = match env::var(CONFIG_ENV).ok().filter(|value| !value.is_empty()) {
            Some(value) => PathBuf::from(value),
            None => match path {
                Some(path) => PathBuf::from(path),
                None => return Err(RegError::MissingConfig),
            },
        };

        let content = fs::read_to_string(&config_path)
            .map_err(|_| RegError::ConfigRead(config_path.clone()))?;
        let config: ConfigFile = serde_json::from_str(&content)
            .map_err(|err| RegError::ConfigParse(err.to_string()))?;

        Ok(Self::resolve_file(config))
    }

    pub fn resolve_file(config: ConfigFile) -> RegisterConfig {
        let max_attempts = config
            .max_attempts
            .unwrap_or(RetryPolicy::DEFAULT_MAX_ATTEMPTS);
        let [backoff_min, backoff_max] = config.backoff_secs.unwrap_or([10, 20]);

        RegisterConfig {
            catalog_url: config.catalog_url,
            location: config.location,
            scope: config.scope,
            storage_root: config.storage_root,
            transfer_url: config.transfer_url,
            retry: RetryPolicy::new(
                max_attempts,
                Duration::from_secs(backoff_min),
                Duration::from_secs(backoff_max),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_file_defaults() {
        let config = ConfigFile {
            catalog_url: "https://catalog.example.org".to_string(),
            location: "STORE_1".to_string(),
            scope: "test".to_string(),
            storage_root: "/rse/root".to_string(),
            transfer_url: "root://xrd1:1094//rucio".to_string(),
            max_attempts: None,
            backoff_secs: None,
        };

        let resolved = ConfigLoader::resolve_file(config);
        assert_eq!(resolved.retry.max_attempts, 5);
        assert_eq!(resolved.retry.backoff_min, Duration::from_secs(10));
        assert_eq!(resolved.retry.backoff_max, Duration::from_secs(20));
    }

    #[test]
    fn resolve_file_overrides() {
        let config = ConfigFile {
            catalog_url: "https://catalog.example.org".to_string(),
            location: "STORE_1".to_string(),
            scope: "test".to_string(),
            storage_root: "/rse/root".to_string(),
            transfer_url: "root://xrd1:1094//rucio".to_string(),
            max_attempts: Some(2),
            backoff_secs: Some([1, 3]),
        };

        let resolved = ConfigLoader::resolve_file(config);
        assert_eq!(resolved.retry.max_attempts, 2);
        assert_eq!(resolved.retry.backoff_min, Duration::from_secs(1));
        assert_eq!(resolved.retry.backoff_max, Duration::from_secs(3));
    }
}
