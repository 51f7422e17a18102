//! Startup configuration resolved from flags and environment.

use browser::ControllerConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing configuration: {name} (set --dataset or {name})")]
    Missing { name: &'static str },

    #[error("Dataset not found: {0}")]
    DatasetNotFound(PathBuf),

    #[error("Collection name must not be empty")]
    EmptyCollection,
}

/// Where the data lives and how the controller behaves
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub dataset: PathBuf,
    pub collection: String,
    pub debounce: Duration,
}

impl AppConfig {
    pub const DATASET_ENV: &'static str = "CHANNELS_DATASET";

    pub fn resolve(
        dataset: Option<PathBuf>,
        collection: String,
        debounce_ms: u64,
    ) -> Result<Self, ConfigError> {
        let dataset = dataset.ok_or(ConfigError::Missing {
            name: Self::DATASET_ENV,
        })?;
        if collection.trim().is_empty() {
            return Err(ConfigError::EmptyCollection);
        }
        Ok(Self {
            dataset,
            collection,
            debounce: Duration::from_millis(debounce_ms),
        })
    }

    /// The dataset must already exist for read-only commands
    pub fn existing_dataset(&self) -> Result<&Path, ConfigError> {
        if self.dataset.is_file() {
            Ok(&self.dataset)
        } else {
            Err(ConfigError::DatasetNotFound(self.dataset.clone()))
        }
    }

    pub fn controller(&self) -> ControllerConfig {
        ControllerConfig {
            collection: self.collection.clone(),
            debounce: self.debounce,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dataset_is_fatal() {
        let err = AppConfig::resolve(None, "channels".to_string(), 300).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { name: "CHANNELS_DATASET" }));
    }

    #[test]
    fn test_resolve_builds_controller_config() {
        let config = AppConfig::resolve(Some(PathBuf::from("data.json")), "channels".to_string(), 150).unwrap();
        let controller = config.controller();
        assert_eq!(controller.collection, "channels");
        assert_eq!(controller.debounce, Duration::from_millis(150));
    }

    #[test]
    fn test_nonexistent_dataset_rejected() {
        let config = AppConfig::resolve(
            Some(PathBuf::from("/definitely/not/here.json")),
            "channels".to_string(),
            300,
        )
        .unwrap();
        assert!(matches!(config.existing_dataset(), Err(ConfigError::DatasetNotFound(_))));
    }
}
