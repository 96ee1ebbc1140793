//! AirSim multirotor client.
//!
//! Implements [`VehicleSession`] over the simulator's msgpack-rpc API.

use super::rpc::RpcChannel;
use super::types::{
    CaptureRequest, CaptureResponse, MotionCommand, MotionTicket, RangingPointSet,
    TelemetrySnapshot,
};
use super::VehicleSession;
use crate::config::{ConnectionConfig, MotionConfig};
use crate::{PreflightError, Result};
use rmpv::Value;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Drivetrain code for "max degree of freedom" moves
const DRIVETRAIN_MAX_DOF: u8 = 0;

/// Live session with an AirSim multirotor
pub struct AirSimClient {
    channel: Mutex<RpcChannel>,
    vehicle_name: String,
    rpc_timeout: Duration,
    motion_timeout: Duration,
}

impl AirSimClient {
    /// Establish the session: connect, confirm with `ping` and optionally take
    /// API control. Any failure here is fatal for the run.
    pub fn connect(connection: &ConnectionConfig, motion: &MotionConfig) -> Result<Self> {
        let addr = connection.address();
        info!("Connecting to AirSim at {}", addr);

        let channel = RpcChannel::connect(&addr, connection.connect_timeout())?;
        let client = Self {
            channel: Mutex::new(channel),
            vehicle_name: connection.vehicle_name.clone(),
            rpc_timeout: connection.rpc_timeout(),
            motion_timeout: motion.timeout(),
        };

        client.confirm_connection()?;

        if connection.enable_api_control {
            client.enable_api_control()?;
            client.arm()?;
        }

        Ok(client)
    }

    fn channel(&self) -> Result<MutexGuard<'_, RpcChannel>> {
        self.channel
            .lock()
            .map_err(|_| PreflightError::Protocol("RPC channel poisoned by a panicked check".to_string()))
    }

    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        self.channel()?.call(method, params, self.rpc_timeout)
    }

    fn vehicle(&self) -> Value {
        Value::from(self.vehicle_name.as_str())
    }

    fn confirm_connection(&self) -> Result<()> {
        let pong = self.call("ping", vec![])?;
        if pong.as_bool() != Some(true) {
            return Err(PreflightError::Protocol(format!(
                "Unexpected ping reply: {}",
                pong
            )));
        }

        match self.call("getServerVersion", vec![]) {
            Ok(version) => info!("Simulator API version {}", version),
            Err(e) => debug!("Server version unavailable: {}", e),
        }
        Ok(())
    }

    fn enable_api_control(&self) -> Result<()> {
        self.call("enableApiControl", vec![Value::from(true), self.vehicle()])?;
        debug!("API control enabled");
        Ok(())
    }

    fn arm(&self) -> Result<()> {
        let armed = self.call("armDisarm", vec![Value::from(true), self.vehicle()])?;
        if armed.as_bool() == Some(false) {
            warn!("Simulator refused to arm the vehicle");
        }
        Ok(())
    }

    /// Method name and parameters for a motion command
    fn motion_request(&self, command: &MotionCommand) -> (&'static str, Vec<Value>) {
        let timeout_sec = Value::F32(self.motion_timeout.as_secs_f32());

        match *command {
            MotionCommand::Takeoff => ("takeoff", vec![timeout_sec, self.vehicle()]),
            MotionCommand::MoveToPosition { x, y, z, velocity } => {
                let yaw_mode = Value::Map(vec![
                    (Value::from("is_rate"), Value::from(true)),
                    (Value::from("yaw_or_rate"), Value::F32(0.0)),
                ]);
                (
                    "moveToPosition",
                    vec![
                        Value::F32(x),
                        Value::F32(y),
                        Value::F32(z),
                        Value::F32(velocity),
                        timeout_sec,
                        Value::from(DRIVETRAIN_MAX_DOF),
                        yaw_mode,
                        Value::F32(-1.0),
                        Value::F32(1.0),
                        self.vehicle(),
                    ],
                )
            }
            MotionCommand::Hover => ("hover", vec![self.vehicle()]),
            MotionCommand::Land => ("land", vec![timeout_sec, self.vehicle()]),
        }
    }
}

impl VehicleSession for AirSimClient {
    fn capture_images(&self, requests: &[CaptureRequest]) -> Result<Vec<CaptureResponse>> {
        let encoded = Value::Array(requests.iter().map(CaptureRequest::to_value).collect());
        let result = self.call("simGetImages", vec![encoded, self.vehicle(), Value::from(false)])?;
        Ok(CaptureResponse::aligned_from_value(&result, requests.len()))
    }

    fn ranging_points(&self, sensor: &str) -> Result<RangingPointSet> {
        let result = self.call("getLidarData", vec![Value::from(sensor), self.vehicle()])?;
        Ok(RangingPointSet::from_value(&result))
    }

    fn submit_motion(&self, command: MotionCommand) -> Result<MotionTicket> {
        let (method, params) = self.motion_request(&command);
        let id = self.channel()?.send(method, params)?;
        debug!(id, %command, "motion submitted");
        Ok(MotionTicket { id, command })
    }

    fn await_motion(&self, ticket: MotionTicket) -> Result<()> {
        let (method, _) = self.motion_request(&ticket.command);
        // The simulator enforces `motion_timeout` itself and answers `false`;
        // waiting one round trip longer lets that answer arrive first.
        let wait = self.motion_timeout + self.rpc_timeout;
        let result = self.channel()?.wait(ticket.id, method, wait)?;

        // Motion calls answer `false` when the simulator cancelled them
        if result.as_bool() == Some(false) {
            return Err(PreflightError::Rpc {
                method: method.to_string(),
                message: format!("{} did not complete", ticket.command),
            });
        }
        Ok(())
    }

    fn telemetry(&self) -> Result<TelemetrySnapshot> {
        let result = self.call("getMultirotorState", vec![self.vehicle()])?;
        Ok(TelemetrySnapshot::from_value(&result))
    }
}
