//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the client configuration
//! from the configuration file (~/.config/chemviz/config.toml) and applies
//! environment overrides on top.

use crate::paths::ChemVizPaths;
use chemviz_core::config::ClientConfig;
use chemviz_core::{ChemVizError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Overrides `api.base_url`.
pub const ENV_API_URL: &str = "CHEMVIZ_API_URL";
/// Overrides `logging.level`.
pub const ENV_LOG_LEVEL: &str = "CHEMVIZ_LOG";

/// Configuration service that loads and caches the client configuration.
///
/// A missing file yields the defaults. A file that fails to parse or validate
/// is an error rather than silently ignored.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the default config file location.
    pub fn new() -> Self {
        let path = ChemVizPaths::config_file().ok();
        if path.is_none() {
            tracing::warn!("[ConfigService] No config directory available, using defaults");
        }
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading an explicit config file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<ClientConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let mut loaded = match &self.path {
            Some(path) => Self::load_file(path)?,
            None => ClientConfig::default(),
        };
        apply_env_overrides(&mut loaded, |key| std::env::var(key).ok());
        loaded.validate()?;

        {
            let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    fn load_file(path: &Path) -> Result<ClientConfig> {
        if !path.exists() {
            tracing::debug!(
                "[ConfigService] {} not found, using defaults",
                path.display()
            );
            return Ok(ClientConfig::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            ChemVizError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: ClientConfig = toml::from_str(&contents)?;
        tracing::info!("[ConfigService] Loaded configuration from {}", path.display());
        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        tracing::debug!("[ConfigService] {} overrides api.base_url", ENV_API_URL);
        config.api.base_url = url.trim().to_string();
    }
    if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
        config.logging.level = level.trim().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chemviz_core::config::ResourceStyle;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));
        let config = service.get_config().expect("defaults should load");
        assert_eq!(config.api.resource_style, ResourceStyle::Path);
        assert_eq!(config.session.min_password_length, 6);
    }

    #[test]
    fn test_loads_and_caches_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nresource_style = \"query\"\n").unwrap();

        let service = ConfigService::with_path(&path);
        assert_eq!(
            service.get_config().unwrap().api.resource_style,
            ResourceStyle::Query
        );

        // Cached until invalidated
        std::fs::write(&path, "[api]\nresource_style = \"path\"\n").unwrap();
        assert_eq!(
            service.get_config().unwrap().api.resource_style,
            ResourceStyle::Query
        );

        service.invalidate_cache();
        assert_eq!(
            service.get_config().unwrap().api.resource_style,
            ResourceStyle::Path
        );
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[api\nbase_url = ").unwrap();

        let err = ConfigService::with_path(&path).get_config().unwrap_err();
        assert!(matches!(err, ChemVizError::Serialization { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ClientConfig::default();
        apply_env_overrides(&mut config, |key| match key {
            ENV_API_URL => Some(" https://viz.example.com/api ".to_string()),
            ENV_LOG_LEVEL => Some("debug".to_string()),
            _ => None,
        });
        assert_eq!(config.api.base_url, "https://viz.example.com/api");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut config = ClientConfig::default();
        apply_env_overrides(&mut config, |_| Some("   ".to_string()));
        assert_eq!(config, ClientConfig::default());
    }
}
