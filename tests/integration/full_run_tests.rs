//! Full run integration tests.
//!
//! Tests for complete acceptance runs, including orchestration order,
//! failure isolation and result aggregation.

use crate::mocks::{context, Fault, MockSession, Op, RecordingConsole, RecordingViewer};
use airsim_preflight::artifacts::ArtifactStore;
use airsim_preflight::checks::CheckContext;
use airsim_preflight::config::OutputConfig;
use airsim_preflight::engine::orchestrator::{create_all_checks, CheckOrchestrator, RegisteredCheck};
use airsim_preflight::sim::{BatteryStatus, RangingPointSet};
use airsim_preflight::{run_checks, CheckCategory, CheckResult, PreflightError};
use tempfile::TempDir;

const SECTION_HEADERS: [&str; 5] = [
    "Testing cameras...",
    "Testing Lidar...",
    "Testing navigation...",
    "Testing battery status...",
    "Testing collision avoidance...",
];

fn results_dir() -> (TempDir, ArtifactStore) {
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::prepare(tmp.path().join("AirSim_Test_Results")).unwrap();
    (tmp, store)
}

fn plain_output() -> OutputConfig {
    OutputConfig {
        color: false,
        ..OutputConfig::default()
    }
}

fn section_positions(console: &RecordingConsole) -> Vec<usize> {
    SECTION_HEADERS
        .iter()
        .map(|h| console.position(h).unwrap_or_else(|| panic!("missing '{}'", h)))
        .collect()
}

fn assert_ascending(positions: &[usize]) {
    assert!(
        positions.windows(2).all(|w| w[0] < w[1]),
        "sections out of order: {:?}",
        positions
    );
}

// Helper to create a check that always passes
fn create_passing_check(id: &str) -> RegisteredCheck {
    let id_clone = id.to_string();
    RegisteredCheck {
        id: id.to_string(),
        name: format!("Check {}", id),
        category: CheckCategory::Sensor,
        description: format!("Test check {}", id),
        check_fn: Box::new(move |ctx: &CheckContext<'_>| {
            ctx.console.status(&format!("{} ran", id_clone));
            Ok(CheckResult::Pass {
                message: format!("{} passed", id_clone),
                duration_ms: 1,
            })
        }),
    }
}

#[test]
fn test_registered_order() {
    let mut orchestrator = CheckOrchestrator::new();
    orchestrator.register_checks(create_all_checks());

    assert_eq!(
        orchestrator.check_ids(),
        vec!["CAM-001", "LID-001", "NAV-001", "BAT-001", "PRX-001"]
    );
}

#[test]
fn test_healthy_run_prints_every_section_in_order() {
    let (_tmp, store) = results_dir();
    let session = MockSession::healthy();
    let viewer = RecordingViewer::default();
    let console = RecordingConsole::default();

    let report = run_checks(&context(&session, &store, &viewer, &console), &plain_output());

    assert_ascending(&section_positions(&console));
    assert_eq!(console.lines().last().map(String::as_str), Some("All tests completed!"));

    let summary = report.summary();
    assert_eq!(summary.total, 5);
    assert_eq!(summary.passed, 5);
    assert_eq!(summary.failed, 0);
    assert_eq!(viewer.shown().len(), 1);
}

#[test]
fn test_run_writes_json_report() {
    let (_tmp, store) = results_dir();
    let session = MockSession::healthy().with_battery(BatteryStatus::Unsupported);
    let viewer = RecordingViewer::default();
    let console = RecordingConsole::default();

    run_checks(&context(&session, &store, &viewer, &console), &plain_output());

    let raw = std::fs::read_to_string(store.dir().join("report.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let checks = json["checks"].as_array().unwrap();
    assert_eq!(checks.len(), 5);
    assert_eq!(checks[0]["id"], "CAM-001");
    assert_eq!(checks[0]["result"]["status"], "pass");
    assert_eq!(checks[3]["id"], "BAT-001");
    assert_eq!(checks[3]["result"]["status"], "skip");
    assert_eq!(json["summary"]["skipped"], 1);
}

#[test]
fn test_panicking_check_does_not_stop_the_run() {
    let (_tmp, store) = results_dir();
    let session = MockSession::healthy().with_fault(Op::Lidar, Fault::Panic);
    let viewer = RecordingViewer::default();
    let console = RecordingConsole::default();

    let report = run_checks(&context(&session, &store, &viewer, &console), &plain_output());

    let lidar = report.get("LID-001").unwrap();
    match lidar.result.as_ref().unwrap() {
        CheckResult::Fail { message, details, .. } => {
            assert_eq!(message, "Check panicked during execution");
            assert!(details.contains("injected panic in getLidarData"));
        }
        other => panic!("expected failure, got {:?}", other),
    }

    assert_ascending(&section_positions(&console));
    assert!(console
        .position("Lidar Capture failed: injected panic in getLidarData")
        .is_some());
    assert_eq!(console.lines().last().map(String::as_str), Some("All tests completed!"));
    assert!(session.events().contains(&"telemetry".to_string()));
    assert_eq!(report.summary().failed, 1);
    assert_eq!(report.summary().passed, 4);
}

#[test]
fn test_erroring_check_is_isolated() {
    let (_tmp, store) = results_dir();
    let session = MockSession::healthy().with_fault(Op::Capture, Fault::Error);
    let viewer = RecordingViewer::default();
    let console = RecordingConsole::default();

    let report = run_checks(&context(&session, &store, &viewer, &console), &plain_output());

    match report.get("CAM-001").unwrap().result.as_ref().unwrap() {
        CheckResult::Fail { message, .. } => assert_eq!(message, "Camera Capture aborted"),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(viewer.shown().len(), 1);
    assert_eq!(report.summary().passed, 4);
}

#[test]
fn test_motion_deadline_fails_both_flight_checks() {
    let (_tmp, store) = results_dir();
    let session = MockSession::healthy().with_fault(Op::Motion, Fault::Timeout);
    let viewer = RecordingViewer::default();
    let console = RecordingConsole::default();

    let report = run_checks(&context(&session, &store, &viewer, &console), &plain_output());

    for id in ["NAV-001", "PRX-001"] {
        match report.get(id).unwrap().result.as_ref().unwrap() {
            CheckResult::Fail { message, .. } => assert!(message.ends_with("timed out")),
            other => panic!("expected timeout failure for {}, got {:?}", id, other),
        }
    }
    assert_eq!(report.summary().passed, 3);
    assert_eq!(console.lines().last().map(String::as_str), Some("All tests completed!"));
}

#[test]
fn test_degraded_simulator_still_completes() {
    let (_tmp, store) = results_dir();
    let session = MockSession::healthy()
        .with_lidar(RangingPointSet::default())
        .with_battery(BatteryStatus::Unsupported);
    let viewer = RecordingViewer::default();
    let console = RecordingConsole::default();

    let report = run_checks(&context(&session, &store, &viewer, &console), &plain_output());

    assert!(console.position("No Lidar data received.").is_some());
    assert!(console.position("Battery monitoring not available.").is_some());
    assert!(viewer.shown().is_empty());

    let summary = report.summary();
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.passed, 3);
}

#[test]
fn test_custom_checks_run_in_registration_order() {
    let (_tmp, store) = results_dir();
    let session = MockSession::healthy();
    let viewer = RecordingViewer::default();
    let console = RecordingConsole::default();

    let mut orchestrator = CheckOrchestrator::new();
    orchestrator.register_check(create_passing_check("T-001"));
    orchestrator.register_check(RegisteredCheck {
        id: "T-002".to_string(),
        name: "Broken".to_string(),
        category: CheckCategory::Flight,
        description: "Returns an error".to_string(),
        check_fn: Box::new(|_: &CheckContext<'_>| Err(PreflightError::Protocol("bad frame".to_string()))),
    });
    orchestrator.register_check(create_passing_check("T-003"));

    let report = orchestrator.run_all(&context(&session, &store, &viewer, &console));

    assert_eq!(
        console.lines(),
        vec!["T-001 ran", "Broken failed: Protocol error: bad frame", "T-003 ran"]
    );
    let ids: Vec<&str> = report.checks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["T-001", "T-002", "T-003"]);
    assert_eq!(report.summary().failed, 1);
}

#[test]
fn test_empty_orchestrator() {
    let (_tmp, store) = results_dir();
    let session = MockSession::healthy();
    let viewer = RecordingViewer::default();
    let console = RecordingConsole::default();

    let report = CheckOrchestrator::new().run_all(&context(&session, &store, &viewer, &console));

    assert!(report.checks.is_empty());
    assert_eq!(report.summary().total, 0);
    assert!(console.lines().is_empty());
}
