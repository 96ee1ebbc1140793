//! Navigation check.
//!
//! Drives the vehicle through a fixed maneuver sequence:
//!
//! ```text
//! Grounded --takeoff--> Airborne --move--> AtTarget --hover--> Hovering --land--> Grounded
//! ```
//!
//! Each command is submitted and then waited on before the next one is
//! issued, so two motion commands are never in flight together. Arrival is
//! taken from the simulator completing the command; position is not verified.

use super::{elapsed_ms, CheckContext};
use crate::sim::MotionCommand;
use crate::{CheckResult, PreflightError, Result};
use std::time::Instant;

/// Move target of the navigation sequence (NED, z up is negative)
pub const NAVIGATION_TARGET: MotionCommand = MotionCommand::MoveToPosition {
    x: 10.0,
    y: 10.0,
    z: -10.0,
    velocity: 5.0,
};

/// Flight phase of the vehicle during the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightPhase {
    Grounded,
    Airborne,
    AtTarget,
    Hovering,
}

impl FlightPhase {
    /// Phase reached once `command` completes, or None if it is not allowed here
    pub fn after(self, command: &MotionCommand) -> Option<FlightPhase> {
        use FlightPhase::*;

        match (self, command) {
            (Grounded, MotionCommand::Takeoff) => Some(Airborne),
            (Airborne | AtTarget, MotionCommand::MoveToPosition { .. }) => Some(AtTarget),
            (Airborne | AtTarget, MotionCommand::Hover) => Some(Hovering),
            (Airborne | AtTarget | Hovering, MotionCommand::Land) => Some(Grounded),
            _ => None,
        }
    }
}

/// The maneuver sequence with the status line printed after each step
pub fn flight_plan() -> [(MotionCommand, &'static str); 4] {
    [
        (MotionCommand::Takeoff, "Drone has taken off."),
        (NAVIGATION_TARGET, "Drone moved to position (10, 10, -10)."),
        (MotionCommand::Hover, "Drone is hovering."),
        (MotionCommand::Land, "Drone has landed."),
    ]
}

/// Execute NAV-001: Navigation Sequence
pub fn run_nav001(ctx: &CheckContext<'_>) -> Result<CheckResult> {
    let start = Instant::now();
    ctx.console.status("Testing navigation...");

    let mut phase = FlightPhase::Grounded;
    for (command, done) in flight_plan() {
        let next = phase.after(&command).ok_or_else(|| {
            PreflightError::Protocol(format!("Cannot {} while {:?}", command, phase))
        })?;

        ctx.session.run_motion(command)?;
        phase = next;
        ctx.console.status(done);
    }

    Ok(CheckResult::Pass {
        message: "Takeoff, move, hover and land completed".to_string(),
        duration_ms: elapsed_ms(start),
    })
}
