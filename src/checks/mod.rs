//! Acceptance check modules.
//!
//! One module per vehicle subsystem:
//! - Camera: batched image capture persisted to the results directory
//! - Lidar: point cloud capture handed to the viewer
//! - Navigation: takeoff, move, hover and land in sequence
//! - Telemetry: battery voltage when the simulator exposes it
//! - Proximity: a short move toward a nearby obstacle
//!
//! Checks share nothing but the [`CheckContext`]. Each one writes its own
//! status lines and returns a [`CheckResult`](crate::CheckResult); errors
//! from the simulator are returned with `?` and turned into failures by the
//! orchestrator.

pub mod camera;
pub mod lidar;
pub mod navigation;
pub mod proximity;
pub mod telemetry;

use crate::artifacts::ArtifactStore;
use crate::cli::console::Console;
use crate::sim::VehicleSession;
use crate::viz::PointCloudViewer;
use std::time::Instant;

/// Everything a check may touch during a run
pub struct CheckContext<'a> {
    pub session: &'a dyn VehicleSession,
    pub artifacts: &'a ArtifactStore,
    pub viewer: &'a dyn PointCloudViewer,
    pub console: &'a dyn Console,
}

/// Milliseconds elapsed since `start`
pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
