use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::infrastructure::api_key::{DEFAULT_LATENCY, DEFAULT_NAMESPACE};
use crate::infrastructure::gate::DEFAULT_PASSKEY;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub gate: GateConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where keys are persisted
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// `file` or `memory`
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Directory for the file backend
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    /// Entry name the key collection is stored under
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_directory")]
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    #[serde(default = "default_passkey")]
    pub passkey: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_backend() -> String {
    "file".to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".lua_auth")
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_latency_ms() -> u64 {
    DEFAULT_LATENCY.as_millis() as u64
}

fn default_export_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_passkey() -> String {
    DEFAULT_PASSKEY.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_storage_path(),
            namespace: default_namespace(),
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
        }
    }
}

impl SimulatorConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_directory(),
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            passkey: default_passkey(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("LUA_AUTH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
