//! Joint-angle geometry derived from pose landmarks.
//!
//! All angles are measured in the image plane (x/y); the estimator's relative
//! depth is too noisy to help for a side-raise seen from the front.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Landmark, PoseFrame, PoseLandmark, Side};

const DEGENERATE_EPS: f64 = 1e-9;

/// Calculate angle between two vectors in radians.
///
/// Returns `None` when either vector has (near) zero length, or when the
/// components are so large that the cosine overflows.
pub fn angle_between(v1: &Vector2<f64>, v2: &Vector2<f64>) -> Option<f64> {
    let norms = v1.norm() * v2.norm();
    if norms < DEGENERATE_EPS {
        return None;
    }

    let cos = v1.dot(v2) / norms;
    if cos.is_finite() {
        Some(cos.clamp(-1.0, 1.0).acos())
    } else {
        None
    }
}

/// Angle in degrees at `joint` between the segments `joint→a` and `joint→b`.
///
/// 180° = fully straight. A zero-length segment yields 180° (assume straight).
pub fn joint_angle(a: &Landmark, joint: &Landmark, b: &Landmark) -> f64 {
    let v1 = a.xy() - joint.xy();
    let v2 = b.xy() - joint.xy();
    angle_between(&v1, &v2).map_or(180.0, f64::to_degrees)
}

/// Arm elevation in degrees: 0° = hanging straight down, 90° = horizontal,
/// 180° = straight up.
///
/// Below shoulder height the angle is `atan(|dx| / dy)`; at or above it is
/// `90° + atan(|dy| / |dx|)`. Image y grows downward.
pub fn elevation_angle(shoulder: &Landmark, wrist: &Landmark) -> f64 {
    let dx = (wrist.x - shoulder.x).abs();
    let dy = wrist.y - shoulder.y;

    if dx < DEGENERATE_EPS && dy.abs() < DEGENERATE_EPS {
        return 0.0;
    }

    let degrees = if dy > 0.0 {
        dx.atan2(dy).to_degrees()
    } else {
        90.0 + (-dy).atan2(dx).to_degrees()
    };

    degrees.clamp(0.0, 180.0)
}

/// Per-frame joint angles for both arms
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AngleSet {
    pub left_elevation: f64,
    pub right_elevation: f64,
    pub left_elbow: f64,
    pub right_elbow: f64,
    pub average_elevation: f64,
    /// Absolute left/right elevation difference
    pub symmetry_diff: f64,
    /// Hip-midpoint y minus shoulder-midpoint y (normalized image units)
    pub torso_height: f64,
}

impl AngleSet {
    pub fn new(
        left_elevation: f64,
        right_elevation: f64,
        left_elbow: f64,
        right_elbow: f64,
        torso_height: f64,
    ) -> Self {
        Self {
            left_elevation,
            right_elevation,
            left_elbow,
            right_elbow,
            average_elevation: (left_elevation + right_elevation) / 2.0,
            symmetry_diff: (left_elevation - right_elevation).abs(),
            torso_height,
        }
    }

    /// Extract angles from one frame of landmarks.
    ///
    /// Fails with [`Error::InsufficientLandmarks`] unless the full 33-point
    /// topology is present, and with [`Error::InvalidInput`] when a tracked
    /// landmark has non-finite coordinates.
    pub fn from_landmarks(landmarks: &[Landmark]) -> Result<Self> {
        if landmarks.len() < PoseLandmark::COUNT {
            return Err(Error::InsufficientLandmarks {
                required: PoseLandmark::COUNT,
                available: landmarks.len(),
            });
        }

        let at = |lm: PoseLandmark| &landmarks[lm.index()];

        for side in Side::BOTH {
            for lm in [side.shoulder(), side.elbow(), side.wrist(), side.hip()] {
                let point = at(lm);
                if !(point.x.is_finite() && point.y.is_finite()) {
                    return Err(Error::InvalidInput(format!(
                        "non-finite coordinates for {lm:?}"
                    )));
                }
            }
        }

        let arm = |side: Side| {
            let shoulder = at(side.shoulder());
            let elbow = at(side.elbow());
            let wrist = at(side.wrist());
            (
                elevation_angle(shoulder, wrist),
                joint_angle(shoulder, elbow, wrist),
            )
        };

        let (left_elevation, left_elbow) = arm(Side::Left);
        let (right_elevation, right_elbow) = arm(Side::Right);

        let shoulder_mid_y =
            (at(PoseLandmark::LeftShoulder).y + at(PoseLandmark::RightShoulder).y) / 2.0;
        let hip_mid_y = (at(PoseLandmark::LeftHip).y + at(PoseLandmark::RightHip).y) / 2.0;

        Ok(Self::new(
            left_elevation,
            right_elevation,
            left_elbow,
            right_elbow,
            hip_mid_y - shoulder_mid_y,
        ))
    }

    pub fn from_frame(frame: &PoseFrame) -> Result<Self> {
        Self::from_landmarks(&frame.landmarks)
    }

    pub fn elevation(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.left_elevation,
            Side::Right => self.right_elevation,
        }
    }

    pub fn elbow(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.left_elbow,
            Side::Right => self.right_elbow,
        }
    }
}
