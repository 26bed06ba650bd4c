//! Deploy-time configuration for usagegate
//!
//! Read from `<config_dir>/usagegate/config.toml`. A missing file means
//! defaults: production environment, JSON backend in the local data dir.
//!
//! ```toml
//! environment = "trusted-development"
//! backend = "sqlite"
//! data_dir = "/var/lib/usagegate"
//!
//! [alerts]
//! warning = 75.0
//! critical = 90.0
//! ```

use crate::error::{CoreError, Result};
use crate::quota::AlertThresholds;
use crate::store::{JsonDirBackend, KvBackend, MemoryBackend, SqliteBackend};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Where the gate runs.
///
/// `TrustedDevelopment` makes every gate check pass. It is a deploy-time
/// switch for internal builds, not a security control: the whole quota
/// system runs on the client and anyone controlling the client can set it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum Environment {
    #[default]
    Production,
    TrustedDevelopment,
}

impl Environment {
    pub fn is_trusted(self) -> bool {
        matches!(self, Self::TrustedDevelopment)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::TrustedDevelopment => "trusted-development",
        }
    }
}

impl FromStr for Environment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "trusted-development" | "development" | "dev" => Ok(Self::TrustedDevelopment),
            other => Err(CoreError::InvalidConfig {
                message: format!(
                    "unknown environment '{}' (expected production or trusted-development)",
                    other
                ),
            }),
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistence backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum BackendKind {
    #[default]
    Json,
    Sqlite,
    Memory,
}

impl FromStr for BackendKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(CoreError::InvalidConfig {
                message: format!("unknown backend '{}' (expected json, sqlite or memory)", other),
            }),
        }
    }
}

impl TryFrom<String> for BackendKind {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Gate configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub environment: Environment,
    pub backend: BackendKind,
    /// Data directory (default: `<data_local_dir>/usagegate`)
    pub data_dir: Option<PathBuf>,
    pub alerts: AlertThresholds,
}

impl GateConfig {
    /// `<config_dir>/usagegate/config.toml`, if a config dir exists
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("usagegate").join("config.toml"))
    }

    /// Load from `path`; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(CoreError::FileRead {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Self = toml::from_str(&content).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let AlertThresholds { warning, critical } = self.alerts;
        if !(0.0..=100.0).contains(&warning) || !(0.0..=100.0).contains(&critical) {
            return Err(CoreError::InvalidConfig {
                message: "alert thresholds must be within 0-100".to_string(),
            });
        }
        if warning > critical {
            return Err(CoreError::InvalidConfig {
                message: format!(
                    "warning threshold ({}) exceeds critical threshold ({})",
                    warning, critical
                ),
            });
        }
        Ok(())
    }

    /// Configured data directory, or the platform default
    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_local_dir().map(|d| d.join("usagegate")))
            .ok_or_else(|| CoreError::InvalidConfig {
                message: "no data_dir configured and no platform data directory".to_string(),
            })
    }

    /// Open the configured backend
    pub fn open_backend(&self) -> Result<Arc<dyn KvBackend>> {
        let backend: Arc<dyn KvBackend> = match self.backend {
            BackendKind::Memory => Arc::new(MemoryBackend::new()),
            BackendKind::Json => Arc::new(JsonDirBackend::new(self.resolved_data_dir()?)),
            BackendKind::Sqlite => Arc::new(SqliteBackend::open_in(&self.resolved_data_dir()?)?),
        };
        Ok(backend)
    }
}
