//! Battery telemetry check.
//!
//! Simulator builds differ in whether the multirotor state carries a battery
//! voltage. A missing field is an expected variant and yields a Skip result.

use super::{elapsed_ms, CheckContext};
use crate::sim::BatteryStatus;
use crate::{CheckResult, Result};
use std::time::Instant;

/// Execute BAT-001: Battery Telemetry
pub fn run_bat001(ctx: &CheckContext<'_>) -> Result<CheckResult> {
    let start = Instant::now();
    ctx.console.status("Testing battery status...");

    let snapshot = ctx.session.telemetry()?;

    Ok(match snapshot.battery {
        BatteryStatus::Voltage(volts) => {
            ctx.console.status(&format!("Battery Voltage: {} V", volts));
            CheckResult::Pass {
                message: format!("Battery at {} V", volts),
                duration_ms: elapsed_ms(start),
            }
        }
        BatteryStatus::Unsupported => {
            ctx.console.status("Battery monitoring not available.");
            CheckResult::Skip {
                reason: "Simulator state does not expose battery voltage".to_string(),
            }
        }
    })
}
