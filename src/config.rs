//! Configuration loading for airsim-preflight
//!
//! The binary takes no arguments, so configuration is discovered from the
//! environment: `AIRSIM_PREFLIGHT_CONFIG` names a TOML file, otherwise
//! `airsim_preflight.toml` in the invocation directory is used if present,
//! otherwise built-in defaults apply.

use crate::{PreflightError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "AIRSIM_PREFLIGHT_CONFIG";

/// Config file picked up from the invocation directory
pub const DEFAULT_CONFIG_FILE: &str = "airsim_preflight.toml";

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PreflightConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
}

/// Simulator connection settings
#[derive(Clone, Debug, Deserialize)]
pub struct ConnectionConfig {
    /// Simulator host (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: String,

    /// msgpack-rpc port (default: 41451)
    #[serde(default = "default_port")]
    pub port: u16,

    /// TCP connect timeout in milliseconds (default: 5000)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Deadline for a single request/response round trip (default: 30000)
    #[serde(default = "default_rpc_timeout")]
    pub rpc_timeout_ms: u64,

    /// Vehicle name from settings.json; empty selects the default vehicle
    #[serde(default)]
    pub vehicle_name: String,

    /// Take API control and arm the vehicle after connecting (default: true)
    #[serde(default = "default_true")]
    pub enable_api_control: bool,
}

/// Motion command settings
#[derive(Clone, Debug, Deserialize)]
pub struct MotionConfig {
    /// Deadline for each motion command to complete (default: 120000)
    #[serde(default = "default_motion_timeout")]
    pub timeout_ms: u64,
}

/// Output configuration
#[derive(Clone, Debug, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving images and the report (default: AirSim_Test_Results)
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// JSON report file name inside the results directory
    #[serde(default = "default_report_file")]
    pub report_file: String,

    /// Colorize the terminal report
    #[serde(default = "default_true")]
    pub color: bool,

    /// Include failure details and durations in the terminal report
    #[serde(default)]
    pub verbose: bool,
}

/// Point cloud viewer configuration
#[derive(Clone, Debug, Deserialize)]
pub struct ViewerConfig {
    /// Render the lidar scatter at all (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Block until the operator presses Enter (default: true)
    #[serde(default = "default_true")]
    pub pause: bool,

    /// SVG file name inside the results directory
    #[serde(default = "default_svg_file")]
    pub svg_file: String,

    /// Program launched with the SVG path, e.g. "xdg-open"
    #[serde(default)]
    pub open_command: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout(),
            rpc_timeout_ms: default_rpc_timeout(),
            vehicle_name: String::new(),
            enable_api_control: true,
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_motion_timeout(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            report_file: default_report_file(),
            color: true,
            verbose: false,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pause: true,
            svg_file: default_svg_file(),
            open_command: None,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    41451
}
fn default_connect_timeout() -> u64 {
    5000
}
fn default_rpc_timeout() -> u64 {
    30_000
}
fn default_motion_timeout() -> u64 {
    120_000
}
fn default_results_dir() -> PathBuf {
    PathBuf::from("AirSim_Test_Results")
}
fn default_report_file() -> String {
    "report.json".to_string()
}
fn default_svg_file() -> String {
    "lidar_point_cloud.svg".to_string()
}
fn default_true() -> bool {
    true
}

impl ConnectionConfig {
    /// Get the full address string for connection
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }
}

impl MotionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl PreflightConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PreflightError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PreflightError::Config(e.to_string()))
    }

    /// Locate and load the configuration for an argument-free run
    pub fn discover() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            info!("Loading configuration from {} ({})", path, CONFIG_ENV_VAR);
            return Self::load(Path::new(&path));
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            info!("Loading configuration from {}", DEFAULT_CONFIG_FILE);
            return Self::load(local);
        }

        info!("Using default configuration");
        Ok(Self::default())
    }
}
