use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the optional store configuration inside a storage directory.
pub const CONFIG_FILE: &str = "vibestudio.json";

/// Storage key used when none is configured.
pub const DEFAULT_PROJECT_KEY: &str = "vibestudio-filesystem";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings for a [`crate::ProjectStore`].
/// 專案儲存器的設定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_project_key")]
    pub project_key: String,
}

fn default_project_key() -> String {
    DEFAULT_PROJECT_KEY.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            project_key: default_project_key(),
        }
    }
}

impl StoreConfig {
    /// Loads `<dir>/vibestudio.json`, falling back to defaults when absent.
    /// 讀取儲存目錄中的設定檔；若不存在則使用預設值。
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        let mut config: StoreConfig = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|source| ConfigError::Parse { path, source })?,
            Err(err) if err.kind() == ErrorKind::NotFound => StoreConfig::default(),
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        config.sanitize();
        Ok(config)
    }

    /// Replaces an empty or non-portable key with the default.
    pub fn sanitize(&mut self) {
        let portable = !self.project_key.is_empty()
            && self
                .project_key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-'));
        if !portable {
            self.project_key = default_project_key();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::load(dir.path()).unwrap();
        assert_eq!(config.project_key, DEFAULT_PROJECT_KEY);
    }

    #[test]
    fn custom_key_is_read_and_sanitized() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), r#"{"project_key": "scratch-1"}"#).unwrap();
        assert_eq!(StoreConfig::load(dir.path()).unwrap().project_key, "scratch-1");

        fs::write(dir.path().join(CONFIG_FILE), r#"{"project_key": "../escape"}"#).unwrap();
        assert_eq!(
            StoreConfig::load(dir.path()).unwrap().project_key,
            DEFAULT_PROJECT_KEY
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{").unwrap();
        assert!(matches!(
            StoreConfig::load(dir.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
