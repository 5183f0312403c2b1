//! TOML-based configuration for the agent.
//!
//! ```toml
//! [network]
//! listen_addr = "127.0.0.1:27183"
//!
//! [device]
//! name = "mirror-agent"
//! video_width = 720
//! video_height = 1280
//! device_width = 1080
//! device_height = 1920
//! screen_on = false
//!
//! [control]
//! pooled_pointer_slots = 8
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every field has a `#[serde(default = "...")]`, so a missing file or a
//! partial file both yield a working configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use mirror_core::protocol::{DeviceInfo, Size, DEFAULT_MAX_POOLED_POINTERS, MAX_MOUSE_POINTERS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::device::FrameGeometry;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is not usable.
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level agent configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    /// Address the agent accepts its single peer on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

/// Display geometry advertised to the peer and used for coordinate mapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    #[serde(default = "default_device_name")]
    pub name: String,
    /// Size of the streamed video frame; peers report coordinates against it.
    #[serde(default = "default_video_width")]
    pub video_width: u16,
    #[serde(default = "default_video_height")]
    pub video_height: u16,
    /// Physical display size.
    #[serde(default = "default_device_width")]
    pub device_width: u16,
    #[serde(default = "default_device_height")]
    pub device_height: u16,
    /// Initial state of the simulated display.
    #[serde(default)]
    pub screen_on: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControlConfig {
    /// Largest Mouse contact count served from the pointer pool.  At most
    /// the largest count a Mouse frame can carry.
    #[serde(default = "default_pooled_pointer_slots")]
    pub pooled_pointer_slots: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` filter directive: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_listen_addr() -> String {
    "127.0.0.1:27183".to_string()
}
fn default_device_name() -> String {
    "mirror-agent".to_string()
}
fn default_video_width() -> u16 {
    720
}
fn default_video_height() -> u16 {
    1280
}
fn default_device_width() -> u16 {
    1080
}
fn default_device_height() -> u16 {
    1920
}
fn default_pooled_pointer_slots() -> usize {
    DEFAULT_MAX_POOLED_POINTERS
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: default_device_name(),
            video_width: default_video_width(),
            video_height: default_video_height(),
            device_width: default_device_width(),
            device_height: default_device_height(),
            screen_on: false,
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            pooled_pointer_slots: default_pooled_pointer_slots(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ── Derived values ────────────────────────────────────────────────────────────

impl AgentConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the TOML is malformed, and
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Buckets above the frame limit can never be filled.
        if self.control.pooled_pointer_slots > MAX_MOUSE_POINTERS {
            return Err(ConfigError::Invalid {
                field: "control.pooled_pointer_slots",
                reason: format!(
                    "{} exceeds the largest decodable contact count {MAX_MOUSE_POINTERS}",
                    self.control.pooled_pointer_slots
                ),
            });
        }
        Ok(())
    }

    /// Parsed listen address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `network.listen_addr` is not a socket address.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.network
            .listen_addr
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                field: "network.listen_addr",
                reason: e.to_string(),
            })
    }

    pub fn video_size(&self) -> Size {
        Size::new(self.device.video_width, self.device.video_height)
    }

    pub fn geometry(&self) -> FrameGeometry {
        FrameGeometry::new(
            self.video_size(),
            Size::new(self.device.device_width, self.device.device_height),
        )
    }

    /// Handshake advertised to the peer on connect.
    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo::new(self.device.name.clone(), self.video_size())
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads `AgentConfig` from `path`, returning `AgentConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<AgentConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => AgentConfig::from_toml(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AgentConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
