//! Lidar capture check.

use super::{elapsed_ms, CheckContext};
use crate::{CheckResult, Result};
use std::time::Instant;
use tracing::warn;

/// Sensor name from the simulator settings
pub const LIDAR_SENSOR: &str = "Lidar";

/// Title of the rendered scatter
pub const SCATTER_TITLE: &str = "Lidar Point Cloud";

/// Execute LID-001: Lidar Capture
///
/// An empty cloud ends the check without visualizing anything. Otherwise the
/// points are split into aligned x/y/z sequences and shown to the operator,
/// which blocks until the viewer returns.
pub fn run_lid001(ctx: &CheckContext<'_>) -> Result<CheckResult> {
    let start = Instant::now();
    ctx.console.status("Testing Lidar...");

    let cloud = ctx.session.ranging_points(LIDAR_SENSOR)?;

    if cloud.is_empty() {
        ctx.console.status("No Lidar data received.");
        return Ok(CheckResult::Fail {
            message: "No Lidar data received".to_string(),
            details: format!("Sensor '{}' returned an empty point cloud", LIDAR_SENSOR),
            duration_ms: elapsed_ms(start),
        });
    }

    ctx.console
        .status(&format!("Lidar received {} points.", cloud.len()));

    let (xs, ys, zs) = cloud.axes();
    if let Err(e) = ctx.viewer.show(SCATTER_TITLE, &xs, &ys, &zs, ctx.console) {
        warn!("Point cloud visualization failed: {}", e);
        return Ok(CheckResult::Warn {
            message: format!("{} points received", cloud.len()),
            details: format!("Visualization failed: {}", e),
            duration_ms: elapsed_ms(start),
        });
    }

    Ok(CheckResult::Pass {
        message: format!("{} points received", cloud.len()),
        duration_ms: elapsed_ms(start),
    })
}
