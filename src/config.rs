//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/hyprdock/config.json`.
//! The top-level schema uses a `"dock"` key so the file can be extended with
//! additional sections later without breaking backward compatibility.
//!
//! # Example
//!
//! ```json
//! {
//!   "dock": {
//!     "hide_delay_ms": 1000,
//!     "occlusion_interval_ms": 250,
//!     "occlusion_height": 80,
//!     "pinned_file": "/home/me/.config/hyprdock/dock.json"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
///
/// Every field is optional: a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Dock controller timing and geometry.
    #[serde(default)]
    pub dock: DockConfig,
}

/// Dock controller timing and geometry.
///
/// All durations are in **milliseconds**.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockConfig {
    /// Debounce between "should hide" and actually hiding.
    pub hide_delay_ms: u64,
    /// Period of the occlusion check.
    pub occlusion_interval_ms: u64,
    /// Height of the screen strip (pixels) checked for occlusion.
    pub occlusion_height: u32,
    /// Delay between the compositor becoming ready and the first
    /// workspace census, giving it time to report every client.
    pub initial_census_delay_ms: u64,
    /// Upper bound for one IPC request/reply.
    pub ipc_timeout_ms: u64,
    /// Pause before reconnecting to the compositor.
    pub reconnect_delay_ms: u64,
    /// Where the pinned order is stored.  Defaults to `dock.json` next to
    /// the config file.
    pub pinned_file: Option<PathBuf>,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            hide_delay_ms: 1000,
            occlusion_interval_ms: 250,
            occlusion_height: 80,
            initial_census_delay_ms: 500,
            ipc_timeout_ms: 1000,
            reconnect_delay_ms: 2000,
            pinned_file: None,
        }
    }
}

impl DockConfig {
    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }

    /// Never zero, so the main loop cannot spin.
    pub fn occlusion_interval(&self) -> Duration {
        Duration::from_millis(self.occlusion_interval_ms.max(1))
    }

    pub fn initial_census_delay(&self) -> Duration {
        Duration::from_millis(self.initial_census_delay_ms)
    }

    pub fn ipc_timeout(&self) -> Duration {
        Duration::from_millis(self.ipc_timeout_ms.max(1))
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::Missing(path.to_path_buf())
            } else {
                ConfigError::Read(format!("{}: {}", path.display(), e))
            }
        })?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Default socket path for the UI command listener.
pub fn default_socket_path() -> PathBuf {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(runtime).join("hyprdock.sock")
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/hyprdock`).
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("hyprdock")
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no config file at {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read {0}")]
    Read(String),
    #[error("failed to parse {0}")]
    Parse(String),
}
