//! Camera capture check.
//!
//! Captures the three configured camera views in one batched call and
//! persists each non-empty image as `image_<index>.png`. A missing or failed
//! image is reported for its index and never stops the remaining ones.

use super::{elapsed_ms, CheckContext};
use crate::sim::{CaptureRequest, ImageKind};
use crate::{CheckResult, Result};
use std::time::Instant;
use tracing::warn;

/// Camera views captured by CAM-001, in file index order
pub fn capture_requests() -> Vec<CaptureRequest> {
    vec![
        CaptureRequest::new("front_center", ImageKind::Scene),
        CaptureRequest::new("thermal_view", ImageKind::Infrared),
        CaptureRequest::new("avoidance_view", ImageKind::DepthPlanar),
    ]
}

/// Execute CAM-001: Camera Capture
pub fn run_cam001(ctx: &CheckContext<'_>) -> Result<CheckResult> {
    let start = Instant::now();
    ctx.console.status("Testing cameras...");

    let requests = capture_requests();
    let responses = ctx.session.capture_images(&requests)?;

    let mut saved = 0usize;
    let mut failures = Vec::new();

    for index in 0..requests.len() {
        let bytes = responses.get(index).and_then(|r| r.bytes());
        let Some(bytes) = bytes else {
            ctx.console
                .status(&format!("Camera {} failed to capture data.", index));
            failures.push(format!("{}: no data", requests[index].camera));
            continue;
        };

        match ctx.artifacts.write_image(index, bytes) {
            Ok(name) => {
                ctx.console.status(&format!("Saved camera image to {}", name));
                saved += 1;
            }
            Err(e) => {
                warn!("Could not persist image {}: {}", index, e);
                ctx.console
                    .status(&format!("Camera {} image could not be saved: {}", index, e));
                failures.push(format!("{}: {}", requests[index].camera, e));
            }
        }
    }

    let duration_ms = elapsed_ms(start);
    let total = requests.len();

    Ok(if failures.is_empty() {
        CheckResult::Pass {
            message: format!("{}/{} camera images saved", saved, total),
            duration_ms,
        }
    } else if saved > 0 {
        CheckResult::Warn {
            message: format!("{}/{} camera images saved", saved, total),
            details: failures.join("; "),
            duration_ms,
        }
    } else {
        CheckResult::Fail {
            message: "No camera produced image data".to_string(),
            details: failures.join("; "),
            duration_ms,
        }
    })
}
