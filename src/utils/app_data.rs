use crate::index::types::{CollisionPolicy, IndexConfig};
use crate::utils::page::DEFAULT_PAGE_SIZE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "kbnb";
const CONFIG_FILE: &str = "config.json";
const DATA_FILE: &str = "properties.json";

/// Overrides the app data directory (used by tests and packaging)
pub const HOME_ENV: &str = "KBNB_HOME";

/// Application configuration stored in the app data directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Property data file; defaults to `properties.json` in the app data directory
    #[serde(default)]
    pub data_path: Option<PathBuf>,

    /// Listings per grid page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Maximum type-ahead matches shown (0 = unlimited)
    #[serde(default)]
    pub search_limit: usize,

    /// Super Host maps remembered by the filter engine (0 disables the memo)
    #[serde(default = "default_super_host_cache_size")]
    pub super_host_cache_size: usize,

    /// How to treat two listings whose names only differ by case
    #[serde(default)]
    pub collision_policy: CollisionPolicy,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_super_host_cache_size() -> usize {
    8
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            page_size: default_page_size(),
            search_limit: 0,
            super_host_cache_size: default_super_host_cache_size(),
            collision_policy: CollisionPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Load config from the app data directory, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
            let config: AppConfig = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the app data directory
    pub fn save(&self) -> Result<PathBuf> {
        ensure_app_data_dir()?;
        let config_path = get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file {}", config_path.display()))?;
        Ok(())
    }

    /// The configured data file, falling back to the app data directory
    pub fn effective_data_path(&self) -> Result<PathBuf> {
        match &self.data_path {
            Some(path) => Ok(path.clone()),
            None => Ok(get_app_data_dir()?.join(DATA_FILE)),
        }
    }

    /// Page size with 0 treated as the default
    pub fn effective_page_size(&self) -> usize {
        if self.page_size == 0 {
            default_page_size()
        } else {
            self.page_size
        }
    }

    pub fn index_config(&self) -> IndexConfig {
        IndexConfig {
            collision_policy: self.collision_policy,
        }
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_app_data_dir()?.join(CONFIG_FILE))
}

/// Get the application data directory (not created)
pub fn get_app_data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }

    let base = if cfg!(target_os = "macos") {
        dirs::home_dir()
            .map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.context("Could not determine app data directory")?;
    Ok(base.join(APP_NAME))
}

/// Create the application data directory if needed
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create {}", app_dir.display()))?;
    Ok(app_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.search_limit, 0);
        assert_eq!(config.super_host_cache_size, 8);
        assert_eq!(config.collision_policy, CollisionPolicy::KeepAll);
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_app_config_serialization() {
        let config = AppConfig {
            data_path: Some(PathBuf::from("/srv/listings.json")),
            page_size: 25,
            search_limit: 5,
            super_host_cache_size: 0,
            collision_policy: CollisionPolicy::LastWriteWins,
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"last_write_wins\""));
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_app_config_partial_json() {
        // Should use defaults for missing fields
        let json = r#"{"page_size": 20}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.page_size, 20);
        assert_eq!(config.super_host_cache_size, 8); // default
    }

    #[test]
    fn test_app_config_empty_json() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = AppConfig {
            search_limit: 3,
            ..AppConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_invalid_json_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{ not json").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_effective_values() {
        let mut config = AppConfig {
            data_path: Some(PathBuf::from("data.json")),
            page_size: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.effective_page_size(), 10);
        assert_eq!(config.effective_data_path().unwrap(), PathBuf::from("data.json"));

        config.collision_policy = CollisionPolicy::LastWriteWins;
        assert_eq!(config.index_config().collision_policy, CollisionPolicy::LastWriteWins);
    }
}
