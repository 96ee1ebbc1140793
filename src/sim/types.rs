//! Data exchanged with the simulator.
//!
//! Decoding works on dynamic msgpack values so that fields missing from a
//! given simulator build degrade to `None`/empty instead of failing the call.

use super::rpc::map_field;
use rmpv::Value;
use std::fmt;
use tracing::warn;

/// Image kinds understood by `simGetImages`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Scene,
    DepthPlanar,
    DepthPerspective,
    DepthVis,
    Segmentation,
    SurfaceNormals,
    /// Infrared rendering, used as the thermal view
    Infrared,
}

impl ImageKind {
    /// Wire code of the kind
    pub fn code(self) -> u8 {
        match self {
            ImageKind::Scene => 0,
            ImageKind::DepthPlanar => 1,
            ImageKind::DepthPerspective => 2,
            ImageKind::DepthVis => 3,
            ImageKind::Segmentation => 5,
            ImageKind::SurfaceNormals => 6,
            ImageKind::Infrared => 7,
        }
    }
}

/// One named camera and one image kind.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    pub camera: String,
    pub kind: ImageKind,
    pub pixels_as_float: bool,
    pub compress: bool,
}

impl CaptureRequest {
    /// Compressed (PNG) capture of `kind` from `camera`
    pub fn new(camera: impl Into<String>, kind: ImageKind) -> Self {
        Self {
            camera: camera.into(),
            kind,
            pixels_as_float: false,
            compress: true,
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Map(vec![
            (Value::from("camera_name"), Value::from(self.camera.as_str())),
            (Value::from("image_type"), Value::from(self.kind.code())),
            (Value::from("pixels_as_float"), Value::from(self.pixels_as_float)),
            (Value::from("compress"), Value::from(self.compress)),
        ])
    }
}

/// Encoded image bytes, or nothing when the camera produced no data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaptureResponse {
    pub data: Option<Vec<u8>>,
}

impl CaptureResponse {
    pub fn absent() -> Self {
        Self { data: None }
    }

    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            Self::absent()
        } else {
            Self { data: Some(bytes) }
        }
    }

    /// Decode one `ImageResponse` map
    pub fn from_value(value: &Value) -> Self {
        let bytes = match map_field(value, "image_data_uint8") {
            Some(Value::Binary(bytes)) => bytes.clone(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect(),
            _ => Vec::new(),
        };
        Self::with_bytes(bytes)
    }

    /// Decode a `simGetImages` result and align it with `expected` requests.
    ///
    /// Missing trailing responses become absent; extra responses are dropped.
    pub fn aligned_from_value(value: &Value, expected: usize) -> Vec<Self> {
        let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
        if items.len() != expected {
            warn!(
                "Simulator returned {} image responses for {} requests",
                items.len(),
                expected
            );
        }

        (0..expected)
            .map(|i| items.get(i).map(Self::from_value).unwrap_or_else(Self::absent))
            .collect()
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }
}

/// A single lidar return in the vehicle frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Ordered lidar returns from one query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RangingPointSet {
    pub points: Vec<Point3>,
}

impl RangingPointSet {
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    /// Decode a `LidarData` map.
    ///
    /// The flat `point_cloud` array is grouped into xyz triples. A lone
    /// `[0.0]` is the simulator's marker for "no returns".
    pub fn from_value(value: &Value) -> Self {
        let floats: Vec<f32> = map_field(value, "point_cloud")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(|v| v.as_f64().map(|f| f as f32)).collect())
            .unwrap_or_default();

        if floats.len() < 3 {
            return Self::default();
        }
        if floats.len() % 3 != 0 {
            warn!(
                "Lidar point cloud has {} floats; dropping trailing partial point",
                floats.len()
            );
        }

        let points = floats
            .chunks_exact(3)
            .map(|c| Point3 { x: c[0], y: c[1], z: c[2] })
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Project the points onto three aligned coordinate sequences
    pub fn axes(&self) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
        let mut xs = Vec::with_capacity(self.points.len());
        let mut ys = Vec::with_capacity(self.points.len());
        let mut zs = Vec::with_capacity(self.points.len());
        for p in &self.points {
            xs.push(p.x);
            ys.push(p.y);
            zs.push(p.z);
        }
        (xs, ys, zs)
    }
}

/// A maneuver submitted to the vehicle.
///
/// Positions are NED meters, so negative `z` is above the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionCommand {
    Takeoff,
    MoveToPosition { x: f32, y: f32, z: f32, velocity: f32 },
    Hover,
    Land,
}

impl fmt::Display for MotionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionCommand::Takeoff => write!(f, "takeoff"),
            MotionCommand::MoveToPosition { x, y, z, velocity } => {
                write!(f, "move to ({}, {}, {}) at {} m/s", x, y, z, velocity)
            }
            MotionCommand::Hover => write!(f, "hover"),
            MotionCommand::Land => write!(f, "land"),
        }
    }
}

/// Handle for a submitted motion command
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionTicket {
    pub id: u32,
    pub command: MotionCommand,
}

/// Battery readout, modelled structurally instead of probed at runtime
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BatteryStatus {
    Voltage(f64),
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandedState {
    Landed,
    Flying,
}

/// Vehicle state at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySnapshot {
    pub battery: BatteryStatus,
    pub landed: Option<LandedState>,
    pub timestamp_ns: Option<u64>,
}

impl TelemetrySnapshot {
    /// Decode a `MultirotorState` map
    pub fn from_value(value: &Value) -> Self {
        let battery = map_field(value, "battery_voltage")
            .and_then(Value::as_f64)
            .map(BatteryStatus::Voltage)
            .unwrap_or(BatteryStatus::Unsupported);

        let landed = map_field(value, "landed_state")
            .and_then(Value::as_u64)
            .and_then(|code| match code {
                0 => Some(LandedState::Landed),
                1 => Some(LandedState::Flying),
                _ => None,
            });

        Self {
            battery,
            landed,
            timestamp_ns: map_field(value, "timestamp").and_then(Value::as_u64),
        }
    }
}
