//! Collision avoidance check.
//!
//! Moves toward a point close to the start position and reports completion.
//! Whether the vehicle avoided the obstacle is judged by a human watching the
//! simulator; nothing here inspects the outcome.

use super::{elapsed_ms, CheckContext};
use crate::sim::MotionCommand;
use crate::{CheckResult, Result};
use std::time::Instant;

/// Target of the avoidance maneuver
pub const AVOIDANCE_TARGET: MotionCommand = MotionCommand::MoveToPosition {
    x: 0.0,
    y: 0.0,
    z: -2.0,
    velocity: 2.0,
};

/// Execute PRX-001: Collision Avoidance
pub fn run_prx001(ctx: &CheckContext<'_>) -> Result<CheckResult> {
    let start = Instant::now();
    ctx.console.status("Testing collision avoidance...");

    ctx.session.run_motion(AVOIDANCE_TARGET)?;
    ctx.console
        .status("Collision avoidance test complete (check simulator view for results).");

    Ok(CheckResult::Pass {
        message: "Avoidance maneuver completed; verify visually in the simulator".to_string(),
        duration_ms: elapsed_ms(start),
    })
}
