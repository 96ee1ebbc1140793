//! Terminal report formatting over real run results.

use crate::mocks::{context, Fault, MockSession, Op, RecordingConsole, RecordingViewer};
use airsim_preflight::artifacts::ArtifactStore;
use airsim_preflight::cli::output::{OutputFormatter, TerminalFormatter};
use airsim_preflight::engine::orchestrator::{create_all_checks, CheckOrchestrator};
use airsim_preflight::engine::result::ValidationReport;
use airsim_preflight::sim::BatteryStatus;

fn run(session: &MockSession) -> ValidationReport {
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::prepare(tmp.path()).unwrap();
    let viewer = RecordingViewer::default();
    let console = RecordingConsole::default();

    let mut orchestrator = CheckOrchestrator::new();
    orchestrator.register_checks(create_all_checks());
    orchestrator.run_all(&context(session, &store, &viewer, &console))
}

#[test]
fn test_report_lists_checks_in_run_order() {
    let report = run(&MockSession::healthy());
    let output = TerminalFormatter::new(false, false).format(&report);

    let positions: Vec<usize> = ["CAM-001", "LID-001", "NAV-001", "BAT-001", "PRX-001"]
        .iter()
        .map(|id| output.find(id).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(output.contains("SUMMARY: 5 passed, 0 warnings, 0 failed, 0 skipped"));
}

#[test]
fn test_report_marks_failures_and_skips() {
    let session = MockSession::healthy()
        .with_battery(BatteryStatus::Unsupported)
        .with_fault(Op::Lidar, Fault::Error);
    let report = run(&session);
    let output = TerminalFormatter::new(false, false).format(&report);

    assert!(output.contains("[FAIL] LID-001"));
    assert!(output.contains("[SKIP] BAT-001"));
    assert!(output.contains("[PASS] NAV-001"));
    assert!(output.contains("SUMMARY: 3 passed, 0 warnings, 1 failed, 1 skipped"));
}

#[test]
fn test_verbose_report_includes_error_details() {
    let session = MockSession::healthy().with_fault(Op::Telemetry, Fault::Error);
    let report = run(&session);

    let quiet = TerminalFormatter::new(false, false).format(&report);
    let verbose = TerminalFormatter::new(false, true).format(&report);

    assert!(!quiet.contains("injected failure"));
    assert!(verbose.contains("RPC 'getMultirotorState' failed: injected failure"));
}
