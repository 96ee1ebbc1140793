//! Check execution orchestrator.
//!
//! Runs registered checks strictly in registration order, one at a time.
//!
//! # Isolation
//!
//! Every check runs behind a result-capturing boundary:
//! - `Err` returned by a check: converted to a Fail result carrying the error
//! - Deadline expiry inside a check: Fail result with a timeout message
//! - Check panics: caught via std::panic::catch_unwind, converted to Fail
//!
//! The orchestrator always continues with the next check, so every
//! registered check appears in the report.

use crate::checks::CheckContext;
use crate::engine::result::{ResultAggregator, ValidationReport};
use crate::{Check, CheckCategory, CheckResult, PreflightError, Result};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;
use tracing::{info, warn};

/// Signature of a check body
pub type CheckFn = Box<dyn Fn(&CheckContext<'_>) -> Result<CheckResult> + Send + Sync>;

/// A registered check with its execution function
pub struct RegisteredCheck {
    pub id: String,
    pub name: String,
    pub category: CheckCategory,
    pub description: String,
    pub check_fn: CheckFn,
}

/// Check orchestrator
#[derive(Default)]
pub struct CheckOrchestrator {
    checks: Vec<RegisteredCheck>,
}

impl CheckOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register checks for execution
    pub fn register_checks(&mut self, checks: Vec<RegisteredCheck>) {
        self.checks.extend(checks);
    }

    /// Register a single check
    pub fn register_check(&mut self, check: RegisteredCheck) {
        self.checks.push(check);
    }

    /// Ids of registered checks in execution order
    pub fn check_ids(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.id.as_str()).collect()
    }

    /// Run all registered checks sequentially
    pub fn run_all(&self, ctx: &CheckContext<'_>) -> ValidationReport {
        let start = Instant::now();
        let mut aggregator = ResultAggregator::new();

        for check in &self.checks {
            info!("Running {} ({})", check.id, check.name);
            let result = Self::execute_check(check, ctx);

            if let CheckResult::Fail { message, details, .. } = &result {
                warn!("{} failed: {} ({})", check.id, message, details);
                ctx.console.status(&format!("{} failed: {}", check.name, details));
            }

            aggregator.add_result(Check {
                id: check.id.clone(),
                name: check.name.clone(),
                category: check.category,
                description: check.description.clone(),
                result: Some(result),
            });
        }

        if aggregator.has_failures() {
            let failed: Vec<&str> = aggregator.get_failures().iter().map(|c| c.id.as_str()).collect();
            warn!("Failed checks: {}", failed.join(", "));
        }

        aggregator.set_total_duration(start.elapsed().as_millis() as u64);
        aggregator.into_report()
    }

    /// Execute a single check inside the isolation boundary
    fn execute_check(check: &RegisteredCheck, ctx: &CheckContext<'_>) -> CheckResult {
        let start = Instant::now();

        let outcome = catch_unwind(AssertUnwindSafe(|| (check.check_fn)(ctx)));
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(PreflightError::Timeout { operation, timeout_ms })) => CheckResult::Fail {
                message: format!("{} timed out", check.name),
                details: format!("{} did not finish within {}ms", operation, timeout_ms),
                duration_ms,
            },
            Ok(Err(e)) => CheckResult::Fail {
                message: format!("{} aborted", check.name),
                details: e.to_string(),
                duration_ms,
            },
            Err(panic) => CheckResult::Fail {
                message: "Check panicked during execution".to_string(),
                details: panic_message(panic.as_ref()),
                duration_ms,
            },
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "An unexpected error occurred".to_string()
    }
}

/// Create all checks in their fixed execution order
pub fn create_all_checks() -> Vec<RegisteredCheck> {
    use crate::checks::{camera, lidar, navigation, proximity, telemetry};

    vec![
        RegisteredCheck {
            id: "CAM-001".to_string(),
            name: "Camera Capture".to_string(),
            category: CheckCategory::Sensor,
            description: "Capture scene, thermal and depth views and persist them".to_string(),
            check_fn: Box::new(camera::run_cam001),
        },
        RegisteredCheck {
            id: "LID-001".to_string(),
            name: "Lidar Capture".to_string(),
            category: CheckCategory::Sensor,
            description: "Query the lidar and display its point cloud".to_string(),
            check_fn: Box::new(lidar::run_lid001),
        },
        RegisteredCheck {
            id: "NAV-001".to_string(),
            name: "Navigation Sequence".to_string(),
            category: CheckCategory::Flight,
            description: "Take off, move to (10, 10, -10), hover and land".to_string(),
            check_fn: Box::new(navigation::run_nav001),
        },
        RegisteredCheck {
            id: "BAT-001".to_string(),
            name: "Battery Telemetry".to_string(),
            category: CheckCategory::Telemetry,
            description: "Report battery voltage when the simulator exposes it".to_string(),
            check_fn: Box::new(telemetry::run_bat001),
        },
        RegisteredCheck {
            id: "PRX-001".to_string(),
            name: "Collision Avoidance".to_string(),
            category: CheckCategory::Flight,
            description: "Move toward a nearby obstacle at (0, 0, -2)".to_string(),
            check_fn: Box::new(proximity::run_prx001),
        },
    ]
}
