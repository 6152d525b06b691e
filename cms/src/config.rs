// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "cms.yaml";

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UploadConfig {
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size_bytes(),
            allowed_types: default_allowed_types(),
        }
    }
}

fn default_max_file_size_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_allowed_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/jpg".to_string(),
        "image/png".to_string(),
        "image/gif".to_string(),
        "image/webp".to_string(),
    ]
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SessionConfig {
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
        }
    }
}

fn default_ttl_hours() -> u64 {
    24
}

/// The hidden logo gesture that reveals the admin entry point.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GestureConfig {
    #[serde(default = "default_gesture_clicks")]
    pub clicks: u32,
    #[serde(default = "default_gesture_window_ms")]
    pub window_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            clicks: default_gesture_clicks(),
            window_ms: default_gesture_window_ms(),
        }
    }
}

fn default_gesture_clicks() -> u32 {
    3
}

fn default_gesture_window_ms() -> u64 {
    3000
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HostConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            poll_attempts: default_poll_attempts(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_poll_attempts() -> u32 {
    50
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StorageConfig {
    /// Durable store directory, relative to the runtime root.
    #[serde(default = "default_storage_dir")]
    pub dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

fn default_storage_dir() -> String {
    "state".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct CmsConfig {
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl CmsConfig {
    /// Reads `cms.yaml` under `root`. A missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join(CONFIG_FILE_NAME);
        let config_content = match fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!(
                    "No {} found under {}, using defaults",
                    CONFIG_FILE_NAME,
                    root.display()
                );
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(ConfigError::LoadError(format!(
                    "Failed to read config file '{}': {}",
                    config_path.display(),
                    err
                )));
            }
        };
        Self::from_yaml(&config_content).map_err(|err| match err {
            ConfigError::LoadError(msg) => ConfigError::LoadError(format!(
                "Failed to parse config file '{}': {}",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    pub fn load_and_validate(root: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(root)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload.max_file_size_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "upload.max_file_size_bytes must be greater than 0".to_string(),
            ));
        }
        if self.upload.allowed_types.is_empty() {
            return Err(ConfigError::ValidationError(
                "upload.allowed_types cannot be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .upload
            .allowed_types
            .iter()
            .find(|mime| !mime.starts_with("image/"))
        {
            return Err(ConfigError::ValidationError(format!(
                "upload.allowed_types only accepts image types, got: {}",
                bad
            )));
        }
        if self.session.ttl_hours == 0 {
            return Err(ConfigError::ValidationError(
                "session.ttl_hours must be at least 1".to_string(),
            ));
        }
        if self.gesture.clicks == 0 || self.gesture.window_ms == 0 {
            return Err(ConfigError::ValidationError(format!(
                "gesture needs at least one click and a non-zero window, got: {} clicks in {} ms",
                self.gesture.clicks, self.gesture.window_ms
            )));
        }
        if self.host.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "host.poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.storage.dir.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.dir cannot be empty".to_string(),
            ));
        }
        self.log_level_filter()?;
        Ok(())
    }

    pub fn log_level_filter(&self) -> Result<log::LevelFilter, ConfigError> {
        self.logging
            .level
            .parse::<log::LevelFilter>()
            .map_err(|_| {
                ConfigError::ValidationError(format!(
                    "logging.level must be one of off, error, warn, info, debug, trace, got: {}",
                    self.logging.level
                ))
            })
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session.ttl_hours as i64)
    }

    pub fn gesture_window(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.gesture.window_ms as i64)
    }

    pub fn host_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.host.poll_interval_ms)
    }
}
