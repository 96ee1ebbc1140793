//! Simulator boundary.
//!
//! Checks talk to the vehicle only through [`VehicleSession`]. The live
//! implementation is [`client::AirSimClient`], which speaks msgpack-rpc to
//! the simulator; tests substitute an in-memory session.

pub mod client;
pub mod rpc;
pub mod types;

pub use types::{
    BatteryStatus, CaptureRequest, CaptureResponse, ImageKind, LandedState, MotionCommand,
    MotionTicket, Point3, RangingPointSet, TelemetrySnapshot,
};

use crate::Result;

/// A live connection to the vehicle simulator.
///
/// Shared by reference across all checks. Vehicle state only changes through
/// the motion commands submitted here.
pub trait VehicleSession {
    /// Capture one image per request; the result is aligned with `requests`.
    fn capture_images(&self, requests: &[CaptureRequest]) -> Result<Vec<CaptureResponse>>;

    /// Query a named lidar sensor for its latest point cloud.
    fn ranging_points(&self, sensor: &str) -> Result<RangingPointSet>;

    /// Submit a motion command without waiting for it to finish.
    fn submit_motion(&self, command: MotionCommand) -> Result<MotionTicket>;

    /// Block until a submitted motion command completes or its deadline passes.
    fn await_motion(&self, ticket: MotionTicket) -> Result<()>;

    /// Read an instantaneous state snapshot.
    fn telemetry(&self) -> Result<TelemetrySnapshot>;

    /// Submit a command and wait for it before returning.
    fn run_motion(&self, command: MotionCommand) -> Result<()> {
        let ticket = self.submit_motion(command)?;
        self.await_motion(ticket)
    }
}
