//! Settings for the `padwatch` binary
//!
//! The SDK itself takes no configuration. The binary reads a small TOML file to pick
//! the frame period, slot count, log level and which event categories to log.
//! The file is `--config <path>` when given, otherwise `padwatch/config.toml` under the
//! platform config directory. A missing file means defaults. `RUST_LOG` overrides the
//! configured level.

use crate::gamepad::event::GamepadEventType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = "padwatch";
const CONFIG_FLAG: &str = "--config";
const CONFIG_FILE: &str = "config.toml";

// Config errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Missing value for {0}")]
    MissingValue(&'static str),
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PadwatchConfig {
    /// Time between frames of the native frame clock (16ms is roughly 60 Hz)
    pub frame_interval_ms: u64,
    /// Number of fixed device slots exposed by the gilrs host
    pub slots: usize,
    /// `tracing` level name: trace, debug, info, warn or error, unless `RUST_LOG` is set
    pub log_level: String,
    /// Event categories the binary logs
    pub log_events: Vec<GamepadEventType>,
}

impl Default for PadwatchConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            slots: 4,
            log_level: String::from("info"),
            log_events: GamepadEventType::ALL.to_vec(),
        }
    }
}

impl PadwatchConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    // e.g. ~/.config/padwatch/config.toml on Linux
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| {
            warn!("Could not determine config directory, using current directory");
            PathBuf::from(".")
        });
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    /// Config path given on the command line, if any
    ///
    /// Accepts `--config <path>` and `--config=<path>`. Other arguments are ignored.
    pub fn path_from_args<I>(args: I) -> Result<Option<PathBuf>, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut path = None;
        while let Some(arg) = args.next() {
            if arg == CONFIG_FLAG {
                let value = args.next().ok_or(ConfigError::MissingValue(CONFIG_FLAG))?;
                path = Some(PathBuf::from(value));
            } else if let Some(value) = arg.strip_prefix("--config=") {
                if value.is_empty() {
                    return Err(ConfigError::MissingValue(CONFIG_FLAG));
                }
                path = Some(PathBuf::from(value));
            } else {
                warn!("Ignoring unknown argument {:?}", arg);
            }
        }
        Ok(path)
    }

    // A non-empty RUST_LOG wins over the file
    pub fn effective_log_level(&self, rust_log: Option<String>) -> String {
        rust_log
            .map(|level| level.trim().to_string())
            .filter(|level| !level.is_empty())
            .unwrap_or_else(|| self.log_level.clone())
    }

    pub fn from_toml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if !exists {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let config = Self::from_toml(path, &content)?;
        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}
