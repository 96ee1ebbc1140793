//! airsim-preflight library
//!
//! Automated acceptance checks for a simulated multirotor running in AirSim.
//!
//! The harness connects to a running simulator, exercises a fixed sequence of
//! subsystem checks and reports what happened:
//! - Camera capture (scene, thermal and depth views persisted as PNG files)
//! - Lidar capture (point count and a 3D scatter for human inspection)
//! - Navigation (takeoff, move, hover, land)
//! - Battery telemetry (reported when the simulator build exposes it)
//! - Collision avoidance (a short move toward a nearby obstacle)
//!
//! Every check runs behind an isolation boundary, so one failing subsystem
//! never prevents the remaining checks from running.
//!
//! # Example
//!
//! ```no_run
//! use airsim_preflight::cli::console::StdoutConsole;
//! use airsim_preflight::{run_preflight, PreflightConfig};
//!
//! let config = PreflightConfig::default();
//! let report = run_preflight(&config, &StdoutConsole).expect("simulator unreachable");
//! println!("Checks passed: {}", report.summary().passed);
//! ```

pub mod artifacts;
pub mod checks;
pub mod cli;
pub mod config;
pub mod engine;
pub mod sim;
pub mod version;
pub mod viz;

use artifacts::ArtifactStore;
use checks::CheckContext;
use cli::console::Console;
use cli::output::{OutputFormatter, TerminalFormatter};
use engine::orchestrator::{create_all_checks, CheckOrchestrator};
use engine::result::ValidationReport;
use serde::Serialize;
use sim::client::AirSimClient;
use std::fmt;
use tracing::{info, warn};

// Re-exports for public API
pub use config::PreflightConfig;
pub use engine::orchestrator::CheckOrchestrator as Orchestrator;
pub use engine::result::{ResultSummary, ValidationReport as Report};

/// Check result indicating the outcome of a single check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckResult {
    /// Check passed successfully
    Pass {
        message: String,
        duration_ms: u64,
    },
    /// Check completed but part of the subsystem misbehaved
    Warn {
        message: String,
        details: String,
        duration_ms: u64,
    },
    /// Check failed
    Fail {
        message: String,
        details: String,
        duration_ms: u64,
    },
    /// Capability not offered by this simulator build
    Skip {
        reason: String,
    },
}

impl CheckResult {
    /// Short status label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            CheckResult::Pass { .. } => "PASS",
            CheckResult::Warn { .. } => "WARN",
            CheckResult::Fail { .. } => "FAIL",
            CheckResult::Skip { .. } => "SKIP",
        }
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, CheckResult::Fail { .. })
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckResult::Pass { message, .. } => write!(f, "PASS: {}", message),
            CheckResult::Warn { message, details, .. } => {
                write!(f, "WARN: {} ({})", message, details)
            }
            CheckResult::Fail { message, details, .. } => {
                write!(f, "FAIL: {} ({})", message, details)
            }
            CheckResult::Skip { reason } => write!(f, "SKIP: {}", reason),
        }
    }
}

/// Check category for grouping related checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CheckCategory {
    /// Camera and lidar data capture
    Sensor,
    /// Motion commands (navigation, collision avoidance)
    Flight,
    /// Vehicle state readouts
    Telemetry,
}

impl fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckCategory::Sensor => write!(f, "Sensor"),
            CheckCategory::Flight => write!(f, "Flight"),
            CheckCategory::Telemetry => write!(f, "Telemetry"),
        }
    }
}

/// A check with its result.
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    /// Unique identifier (e.g., "CAM-001")
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Check category
    pub category: CheckCategory,
    /// Description of what this check exercises
    pub description: String,
    /// Result of the check (None if not yet executed)
    pub result: Option<CheckResult>,
}

/// Error types for airsim-preflight operations.
#[derive(Debug, thiserror::Error)]
pub enum PreflightError {
    /// Simulator unreachable or the socket broke
    #[error("Connection failed: {0}")]
    Connection(#[from] std::io::Error),

    /// Malformed or unexpected msgpack-rpc traffic
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The simulator answered a call with an error
    #[error("RPC '{method}' failed: {message}")]
    Rpc { method: String, message: String },

    /// A round trip or motion wait exceeded its deadline
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Local filesystem error while persisting artifacts
    #[error("I/O error in {context}: {message}")]
    Io { context: String, message: String },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PreflightError>;

/// Run the full acceptance sequence against a live simulator.
///
/// Connects using `config.connection`, prepares the results directory and
/// runs every check in order. Only connection and output-directory failures
/// are returned as errors; check failures are recorded in the report.
pub fn run_preflight(config: &PreflightConfig, console: &dyn Console) -> Result<ValidationReport> {
    let session = AirSimClient::connect(&config.connection, &config.motion)?;
    console.status("Connected to AirSim.");

    let artifacts = ArtifactStore::prepare(&config.output.results_dir)?;
    info!("Writing results to {}", artifacts.dir().display());

    let viewer = viz::build_viewer(&config.viewer, &artifacts);

    let ctx = CheckContext {
        session: &session,
        artifacts: &artifacts,
        viewer: viewer.as_ref(),
        console,
    };

    Ok(run_checks(&ctx, &config.output))
}

/// Run every registered check against an already-established context.
///
/// Prints the terminal report, writes the JSON report next to the captured
/// images and finishes with the completion line.
pub fn run_checks(ctx: &CheckContext<'_>, output: &config::OutputConfig) -> ValidationReport {
    let mut orchestrator = CheckOrchestrator::new();
    orchestrator.register_checks(create_all_checks());

    let report = orchestrator.run_all(ctx);

    if let Err(e) = ctx.artifacts.write_report(&output.report_file, &report) {
        warn!("Could not write report: {}", e);
    }

    let formatter = TerminalFormatter::new(output.color, output.verbose);
    ctx.console.status(&formatter.format(&report));
    ctx.console.status("All tests completed!");

    report
}
