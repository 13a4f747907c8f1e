//! Fundamental types for the Kinetrack engine.

use chrono::{DateTime, Utc};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Timestamp wrapper with nanosecond precision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_nanos_opt().unwrap_or(0))
    }

    pub fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    pub fn from_secs_f64(secs: f64) -> Self {
        Self((secs * 1_000_000_000.0) as i64)
    }

    pub fn as_nanos(&self) -> i64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }

    /// Seconds elapsed since `earlier`. Negative if `earlier` is in the future.
    pub fn secs_since(&self, earlier: Timestamp) -> f64 {
        // Widened so stamps at opposite ends of the i64 range cannot overflow
        (i128::from(self.0) - i128::from(earlier.0)) as f64 / 1_000_000_000.0
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }
}

/// Single tracked body keypoint in normalized image space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position, 0-1 normalized (left to right)
    pub x: f64,
    /// Vertical position, 0-1 normalized (top to bottom)
    pub y: f64,
    /// Depth relative to the hip midpoint
    #[serde(default)]
    pub z: f64,
    /// Detection confidence in [0, 1]
    #[serde(default = "default_visibility")]
    pub visibility: f64,
}

fn default_visibility() -> f64 {
    1.0
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    /// Landmark at `(x, y)` with zero depth and full visibility
    pub fn at(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 1.0)
    }

    /// Image-plane projection
    pub fn xy(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

/// Landmark indices of the 33-point pose topology consumed by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PoseLandmark {
    Nose = 0,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftHip = 23,
    RightHip = 24,
}

impl PoseLandmark {
    /// Number of landmarks in a complete frame
    pub const COUNT: usize = 33;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: u8) -> Option<Self> {
        match idx {
            0 => Some(Self::Nose),
            11 => Some(Self::LeftShoulder),
            12 => Some(Self::RightShoulder),
            13 => Some(Self::LeftElbow),
            14 => Some(Self::RightElbow),
            15 => Some(Self::LeftWrist),
            16 => Some(Self::RightWrist),
            23 => Some(Self::LeftHip),
            24 => Some(Self::RightHip),
            _ => None,
        }
    }
}

/// Body side, from the subject's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn shoulder(self) -> PoseLandmark {
        match self {
            Side::Left => PoseLandmark::LeftShoulder,
            Side::Right => PoseLandmark::RightShoulder,
        }
    }

    pub fn elbow(self) -> PoseLandmark {
        match self {
            Side::Left => PoseLandmark::LeftElbow,
            Side::Right => PoseLandmark::RightElbow,
        }
    }

    pub fn wrist(self) -> PoseLandmark {
        match self {
            Side::Left => PoseLandmark::LeftWrist,
            Side::Right => PoseLandmark::RightWrist,
        }
    }

    pub fn hip(self) -> PoseLandmark {
        match self {
            Side::Left => PoseLandmark::LeftHip,
            Side::Right => PoseLandmark::RightHip,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// One frame of landmarks as delivered by the pose estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    pub timestamp: Timestamp,
    pub landmarks: Vec<Landmark>,
}

impl PoseFrame {
    pub fn new(timestamp: Timestamp, landmarks: Vec<Landmark>) -> Self {
        Self {
            timestamp,
            landmarks,
        }
    }

    /// Frame stamped with the wall clock at call time
    pub fn now(landmarks: Vec<Landmark>) -> Self {
        Self::new(Timestamp::now(), landmarks)
    }

    /// True when the frame carries the full 33-point topology
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() >= PoseLandmark::COUNT
    }

    pub fn landmark(&self, which: PoseLandmark) -> Option<&Landmark> {
        self.landmarks.get(which.index())
    }
}
