use crate::error::{Result, SdCallerError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_BACKUP_PREFIX: &str = "sdcaller";

/// Configuration for sdcaller, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Prefix for exported backup files (`<prefix>-backup-<timestamp>.json`)
    #[serde(default = "default_backup_prefix")]
    pub backup_prefix: String,

    /// Directory exports are written to when `--out` is not given.
    /// When absent, the current directory is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,
}

fn default_backup_prefix() -> String {
    DEFAULT_BACKUP_PREFIX.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backup_prefix: default_backup_prefix(),
            backup_dir: None,
        }
    }
}

impl AppConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(SdCallerError::Io)?;
        let config: AppConfig =
            serde_json::from_str(&content).map_err(SdCallerError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(SdCallerError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(SdCallerError::Serialization)?;
        fs::write(config_path, content).map_err(SdCallerError::Io)?;
        Ok(())
    }

    /// Set the backup prefix. Only filename-safe characters are accepted.
    pub fn set_backup_prefix(&mut self, prefix: &str) -> std::result::Result<(), String> {
        let valid = !prefix.is_empty()
            && prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(format!(
                "Invalid backup prefix '{}': use letters, digits, '-' or '_'",
                prefix
            ));
        }
        self.backup_prefix = prefix.to_string();
        Ok(())
    }

    /// Get a config value by its CLI key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "backup-prefix" => Some(self.backup_prefix.clone()),
            "backup-dir" => Some(
                self.backup_dir
                    .as_ref()
                    .map(|d| d.display().to_string())
                    .unwrap_or_default(),
            ),
            _ => None,
        }
    }

    /// Set a config value by its CLI key. An empty `backup-dir` unsets it.
    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "backup-prefix" => self.set_backup_prefix(value),
            "backup-dir" => {
                self.backup_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
                Ok(())
            }
            _ => Err(format!("Unknown config key: {}", key)),
        }
    }

    pub fn keys() -> &'static [&'static str] {
        &["backup-prefix", "backup-dir"]
    }

    /// Directory for exports, falling back to `fallback` when unset.
    pub fn backup_dir_or(&self, fallback: &Path) -> PathBuf {
        self.backup_dir
            .clone()
            .unwrap_or_else(|| fallback.to_path_buf())
    }
}
