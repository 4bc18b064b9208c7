//! Configuration for the AirBeam supervisor.
//!
//! YAML file loading (with `AIRBEAM_` environment overrides), validation,
//! and translation to `airbeam_core::SupervisorConfig`. The core crate never
//! reads files; the binary loads a [`Config`] here and hands the translated
//! value over.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Deserializer, Serialize, de};
use thiserror::Error;
use url::Url;

use airbeam_core::{DeviceSpec, Pacing, SupervisorConfig};

/// Prefix of environment variables that override file values.
/// Nested keys use `__`, e.g. `AIRBEAM_LOG__FILE`.
pub const ENV_PREFIX: &str = "AIRBEAM_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {path}")]
    NotFound { path: String },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] serde_yaml::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── YAML config structs ─────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Log sink settings.
    pub log: LogSettings,

    /// Rotate recordings longer than this many seconds.
    pub rotate_duration: u64,

    /// Per-device storage budget in megabytes. Accepts an integer or an
    /// integer string.
    #[serde(deserialize_with = "megabytes")]
    pub max_dir_size: u64,

    /// Devices, polled in this order.
    pub cameras: Vec<Camera>,

    /// Loop delays.
    #[serde(default)]
    pub pacing: PacingSettings,

    /// Whole-request HTTP timeout in seconds. Unset leaves the client default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogSettings {
    /// File receiving every message at the configured level.
    pub file: PathBuf,

    /// `full`, `compact`, or `json`. Anything else falls back to `full`.
    #[serde(default = "default_log_format")]
    pub format: String,

    /// strftime pattern for timestamps.
    #[serde(default = "default_dateformat")]
    pub dateformat: String,
}

fn default_log_format() -> String {
    "full".into()
}
fn default_dateformat() -> String {
    "%Y-%m-%d %H:%M:%S".into()
}

/// Line layout of the log sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Full,
    Compact,
    Json,
}

impl LogSettings {
    pub fn log_format(&self) -> LogFormat {
        match self.format.trim().to_ascii_lowercase().as_str() {
            "compact" => LogFormat::Compact,
            "json" => LogFormat::Json,
            _ => LogFormat::Full,
        }
    }
}

/// A configured recorder.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Camera {
    /// Display name.
    pub name: String,

    /// Device root URL (e.g., "http://10.0.0.20").
    pub hostname: String,

    /// Local directory for this device's recordings.
    pub store_path: PathBuf,
}

impl Camera {
    /// Filesystem-safe identifier: the name with spaces replaced by `_`.
    pub fn device_id(&self) -> String {
        self.name.replace(' ', "_")
    }
}

/// Loop delays, in seconds.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct PacingSettings {
    pub record_start_settle_secs: u64,
    pub eviction_pause_secs: u64,
    pub device_interval_secs: u64,
    pub failure_backoff_secs: u64,
}

impl Default for PacingSettings {
    fn default() -> Self {
        let pacing = Pacing::default();
        Self {
            record_start_settle_secs: pacing.record_start_settle.as_secs(),
            eviction_pause_secs: pacing.eviction_pause.as_secs(),
            device_interval_secs: pacing.device_interval.as_secs(),
            failure_backoff_secs: pacing.failure_backoff.as_secs(),
        }
    }
}

impl From<PacingSettings> for Pacing {
    fn from(settings: PacingSettings) -> Self {
        Self {
            record_start_settle: Duration::from_secs(settings.record_start_settle_secs),
            eviction_pause: Duration::from_secs(settings.eviction_pause_secs),
            device_interval: Duration::from_secs(settings.device_interval_secs),
            failure_backoff: Duration::from_secs(settings.failure_backoff_secs),
        }
    }
}

fn megabytes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(mb) => Ok(mb),
        Raw::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("expected whole megabytes, got {text:?}"))),
    }
}

// ── Config loading ──────────────────────────────────────────────────

/// Load and validate the config file at `path`, applying environment
/// overrides.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.display().to_string(),
        });
    }

    let config: Config = Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;

    config.validate()?;
    Ok(config)
}

impl Config {
    /// Check everything serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log.file.as_os_str().is_empty() {
            return Err(invalid("log.file", "must not be empty"));
        }
        if StrftimeItems::new(&self.log.dateformat).any(|item| matches!(item, Item::Error)) {
            return Err(invalid(
                "log.dateformat",
                format!("unsupported strftime pattern '{}'", self.log.dateformat),
            ));
        }
        if self.rotate_duration == 0 {
            return Err(invalid("rotate_duration", "must be at least 1 second"));
        }
        if self.cameras.is_empty() {
            return Err(invalid("cameras", "at least one camera is required"));
        }

        let mut ids = HashSet::new();
        for (idx, camera) in self.cameras.iter().enumerate() {
            if camera.name.trim().is_empty() {
                return Err(invalid(format!("cameras[{idx}].name"), "must not be empty"));
            }
            if !ids.insert(camera.device_id()) {
                return Err(invalid(
                    format!("cameras[{idx}].name"),
                    format!("duplicate device id '{}'", camera.device_id()),
                ));
            }
            parse_device_url(&camera.hostname)
                .map_err(|reason| invalid(format!("cameras[{idx}].hostname"), reason))?;
            if camera.store_path.as_os_str().is_empty() {
                return Err(invalid(format!("cameras[{idx}].store_path"), "must not be empty"));
            }
        }

        Ok(())
    }

    /// Build the supervisor's runtime configuration.
    pub fn to_supervisor_config(&self) -> Result<SupervisorConfig, ConfigError> {
        let devices = self
            .cameras
            .iter()
            .enumerate()
            .map(|(idx, camera)| {
                let base_url = parse_device_url(&camera.hostname)
                    .map_err(|reason| invalid(format!("cameras[{idx}].hostname"), reason))?;
                Ok(DeviceSpec {
                    id: camera.device_id(),
                    base_url,
                    store_path: camera.store_path.clone(),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(SupervisorConfig {
            devices,
            rotate_after_secs: self.rotate_duration,
            max_dir_size_mb: self.max_dir_size,
            pacing: self.pacing.into(),
            http_timeout: self.http_timeout_secs.map(Duration::from_secs),
        })
    }

    /// The effective configuration as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn parse_device_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("invalid URL '{raw}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{other}' in '{raw}'")),
    }
}
