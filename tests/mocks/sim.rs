//! Mock simulator session, console and viewer.

use airsim_preflight::artifacts::ArtifactStore;
use airsim_preflight::checks::CheckContext;
use airsim_preflight::cli::console::Console;
use airsim_preflight::sim::{
    BatteryStatus, CaptureRequest, CaptureResponse, MotionCommand, MotionTicket, Point3,
    RangingPointSet, TelemetrySnapshot, VehicleSession,
};
use airsim_preflight::viz::PointCloudViewer;
use airsim_preflight::{PreflightError, Result};
use std::sync::Mutex;

/// Session operation a failure can be injected into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Capture,
    Lidar,
    Motion,
    Telemetry,
}

/// How an injected failure manifests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Error,
    Timeout,
    Panic,
}

/// In-memory vehicle session with an event log
pub struct MockSession {
    images: Vec<CaptureResponse>,
    lidar: RangingPointSet,
    battery: BatteryStatus,
    faults: Vec<(Op, Fault)>,
    events: Mutex<Vec<String>>,
    next_ticket: Mutex<u32>,
}

impl MockSession {
    /// Every sensor responds and the battery is reported
    pub fn healthy() -> Self {
        Self {
            images: vec![
                CaptureResponse::with_bytes(png_bytes(0)),
                CaptureResponse::with_bytes(png_bytes(1)),
                CaptureResponse::with_bytes(png_bytes(2)),
            ],
            lidar: point_cloud(500),
            battery: BatteryStatus::Voltage(12.6),
            faults: Vec::new(),
            events: Mutex::new(Vec::new()),
            next_ticket: Mutex::new(0),
        }
    }

    pub fn with_images(mut self, images: Vec<CaptureResponse>) -> Self {
        self.images = images;
        self
    }

    pub fn with_lidar(mut self, lidar: RangingPointSet) -> Self {
        self.lidar = lidar;
        self
    }

    pub fn with_battery(mut self, battery: BatteryStatus) -> Self {
        self.battery = battery;
        self
    }

    pub fn with_fault(mut self, op: Op, fault: Fault) -> Self {
        self.faults.push((op, fault));
        self
    }

    /// Operations seen so far, in call order
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    fn inject(&self, op: Op, operation: &str) -> Result<()> {
        let fault = self.faults.iter().find(|(o, _)| *o == op).map(|(_, f)| *f);
        match fault {
            None => Ok(()),
            Some(Fault::Error) => Err(PreflightError::Rpc {
                method: operation.to_string(),
                message: "injected failure".to_string(),
            }),
            Some(Fault::Timeout) => Err(PreflightError::Timeout {
                operation: operation.to_string(),
                timeout_ms: 50,
            }),
            Some(Fault::Panic) => panic!("injected panic in {}", operation),
        }
    }
}

impl VehicleSession for MockSession {
    fn capture_images(&self, requests: &[CaptureRequest]) -> Result<Vec<CaptureResponse>> {
        self.record(format!("capture:{}", requests.len()));
        self.inject(Op::Capture, "simGetImages")?;
        Ok(self.images.clone())
    }

    fn ranging_points(&self, sensor: &str) -> Result<RangingPointSet> {
        self.record(format!("lidar:{}", sensor));
        self.inject(Op::Lidar, "getLidarData")?;
        Ok(self.lidar.clone())
    }

    fn submit_motion(&self, command: MotionCommand) -> Result<MotionTicket> {
        self.record(format!("submit:{}", command));
        let mut next = self.next_ticket.lock().unwrap();
        let id = *next;
        *next += 1;
        Ok(MotionTicket { id, command })
    }

    fn await_motion(&self, ticket: MotionTicket) -> Result<()> {
        self.record(format!("await:{}", ticket.command));
        self.inject(Op::Motion, "motion")
    }

    fn telemetry(&self) -> Result<TelemetrySnapshot> {
        self.record("telemetry".to_string());
        self.inject(Op::Telemetry, "getMultirotorState")?;
        Ok(TelemetrySnapshot {
            battery: self.battery,
            landed: None,
            timestamp_ns: None,
        })
    }
}

/// Console that keeps every status line
#[derive(Default)]
pub struct RecordingConsole {
    lines: Mutex<Vec<String>>,
}

impl RecordingConsole {
    /// Recorded output split into individual lines
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .flat_map(|l| l.lines().map(str::to_string).collect::<Vec<_>>())
            .collect()
    }

    /// Index of the first line equal to `line`
    pub fn position(&self, line: &str) -> Option<usize> {
        self.lines().iter().position(|l| l == line)
    }
}

impl Console for RecordingConsole {
    fn status(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}

/// One call to a viewer
#[derive(Debug, Clone)]
pub struct ShownCloud {
    pub title: String,
    pub xs: Vec<f32>,
    pub ys: Vec<f32>,
    pub zs: Vec<f32>,
}

/// Viewer that records what it was asked to show
#[derive(Default)]
pub struct RecordingViewer {
    shown: Mutex<Vec<ShownCloud>>,
    fail: bool,
}

impl RecordingViewer {
    pub fn failing() -> Self {
        Self {
            shown: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn shown(&self) -> Vec<ShownCloud> {
        self.shown.lock().unwrap().clone()
    }
}

impl PointCloudViewer for RecordingViewer {
    fn show(
        &self,
        title: &str,
        xs: &[f32],
        ys: &[f32],
        zs: &[f32],
        _console: &dyn Console,
    ) -> Result<()> {
        self.shown.lock().unwrap().push(ShownCloud {
            title: title.to_string(),
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            zs: zs.to_vec(),
        });
        if self.fail {
            return Err(PreflightError::Io {
                context: "display".to_string(),
                message: "no display attached".to_string(),
            });
        }
        Ok(())
    }
}

/// Fake PNG payload that differs per index
pub fn png_bytes(index: u8) -> Vec<u8> {
    vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, index]
}

/// A cloud of `n` distinct points
pub fn point_cloud(n: usize) -> RangingPointSet {
    RangingPointSet::new(
        (0..n)
            .map(|i| Point3 {
                x: i as f32,
                y: i as f32 * 0.5,
                z: -(i as f32) * 0.1,
            })
            .collect(),
    )
}

/// Wire up a check context from test-owned parts
pub fn context<'a>(
    session: &'a MockSession,
    store: &'a ArtifactStore,
    viewer: &'a RecordingViewer,
    console: &'a RecordingConsole,
) -> CheckContext<'a> {
    CheckContext {
        session,
        artifacts: store,
        viewer,
        console,
    }
}
