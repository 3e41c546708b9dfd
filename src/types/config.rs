//! Configuration for QMS.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::QmsResult;

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "qms.toml";

/// Main configuration for QMS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data backend settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Lookup cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Self-assessment settings.
    #[serde(default)]
    pub assessment: AssessmentConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Data backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// SQLite database path.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Directory where uploaded objects are stored.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Base URL under which stored objects are published.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            storage_dir: default_storage_dir(),
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".qms/qms.db")
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".qms/storage")
}

fn default_public_base_url() -> String {
    "http://localhost:8080/storage/v1/object/public".to_string()
}

/// Lookup cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enabled. When disabled, lookups always hit the backend.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum cache capacity (number of entries).
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Lookup table time to live in seconds.
    #[serde(default = "default_lookup_ttl")]
    pub lookup_ttl_secs: u64,
}

impl CacheConfig {
    /// Lookup time to live as a [`Duration`].
    pub fn lookup_ttl(&self) -> Duration {
        if self.enabled {
            Duration::from_secs(self.lookup_ttl_secs)
        } else {
            Duration::ZERO
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: default_cache_capacity(),
            lookup_ttl_secs: default_lookup_ttl(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cache_capacity() -> usize {
    256
}

fn default_lookup_ttl() -> u64 {
    300 // 5 minutes
}

/// Self-assessment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentConfig {
    /// Table holding evaluation rows.
    #[serde(default = "default_evaluation_table")]
    pub evaluation_table: String,

    /// Decimal places kept in sheet scores.
    #[serde(default = "default_score_precision")]
    pub score_precision: u32,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            evaluation_table: default_evaluation_table(),
            score_precision: default_score_precision(),
        }
    }
}

fn default_evaluation_table() -> String {
    "danh_gia_tieu_chi".to_string()
}

fn default_score_precision() -> u32 {
    2
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> QmsResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> QmsResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            backend: BackendConfig::default(),
            cache: CacheConfig::default(),
            assessment: AssessmentConfig::default(),
        }
    }

    /// Location of the per-user configuration file, if the platform has one.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("qms").join(CONFIG_FILE))
    }

    /// Tries the current directory, then the user config directory, then defaults.
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::load(CONFIG_FILE) {
            return config;
        }

        Self::user_config_path()
            .and_then(|path| Self::load(path).ok())
            .unwrap_or_else(Self::default_config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
