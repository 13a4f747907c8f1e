//! Synthetic pose generation for replays, tests and benchmarks.
//!
//! Produces front-facing 33-point frames with straight arms raised sideways
//! to a requested elevation. Only the landmarks the engine consumes are
//! placed meaningfully; the rest sit at the image center.

use serde::{Deserialize, Serialize};

use crate::types::{Landmark, PoseFrame, PoseLandmark, Side, Timestamp};

/// Builder for a single synthetic pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticPose {
    left_elevation: f64,
    right_elevation: f64,
    shrug: f64,
    arm_length: f64,
}

impl Default for SyntheticPose {
    fn default() -> Self {
        Self {
            left_elevation: 0.0,
            right_elevation: 0.0,
            shrug: 0.0,
            arm_length: 0.25,
        }
    }
}

impl SyntheticPose {
    const SHOULDER_Y: f64 = 0.35;
    const HIP_Y: f64 = 0.65;
    const SHOULDER_HALF_WIDTH: f64 = 0.1;
    const HIP_HALF_WIDTH: f64 = 0.07;

    pub fn new() -> Self {
        Self::default()
    }

    /// Both arms at the same elevation (degrees)
    pub fn arms(mut self, elevation: f64) -> Self {
        self.left_elevation = elevation;
        self.right_elevation = elevation;
        self
    }

    pub fn left(mut self, elevation: f64) -> Self {
        self.left_elevation = elevation;
        self
    }

    pub fn right(mut self, elevation: f64) -> Self {
        self.right_elevation = elevation;
        self
    }

    /// Lift both shoulders by `amount` normalized image units
    pub fn shrug(mut self, amount: f64) -> Self {
        self.shrug = amount;
        self
    }

    pub fn landmarks(&self) -> Vec<Landmark> {
        let mut landmarks = vec![Landmark::at(0.5, 0.5); PoseLandmark::COUNT];
        landmarks[PoseLandmark::Nose.index()] = Landmark::at(0.5, 0.2);

        for side in Side::BOTH {
            // Subject's left appears on the image right
            let outward = match side {
                Side::Left => 1.0,
                Side::Right => -1.0,
            };
            let elevation = match side {
                Side::Left => self.left_elevation,
                Side::Right => self.right_elevation,
            };

            let shoulder = Landmark::at(
                0.5 + outward * Self::SHOULDER_HALF_WIDTH,
                Self::SHOULDER_Y - self.shrug,
            );
            let theta = elevation.to_radians();
            let reach_x = outward * self.arm_length * theta.sin();
            let reach_y = self.arm_length * theta.cos();

            let wrist = Landmark::at(shoulder.x + reach_x, shoulder.y + reach_y);
            let elbow = Landmark::at(shoulder.x + reach_x / 2.0, shoulder.y + reach_y / 2.0);
            let hip = Landmark::at(0.5 + outward * Self::HIP_HALF_WIDTH, Self::HIP_Y);

            landmarks[side.shoulder().index()] = shoulder;
            landmarks[side.elbow().index()] = elbow;
            landmarks[side.wrist().index()] = wrist;
            landmarks[side.hip().index()] = hip;
        }

        landmarks
    }

    pub fn frame(&self, timestamp: Timestamp) -> PoseFrame {
        PoseFrame::new(timestamp, self.landmarks())
    }
}

/// Timing of a synthetic raise session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaiseProfile {
    pub reps: u32,
    pub fps: f64,
    pub rest_angle: f64,
    pub peak_angle: f64,
    pub rest_secs: f64,
    pub raise_secs: f64,
    pub hold_secs: f64,
    pub lower_secs: f64,
}

impl Default for RaiseProfile {
    fn default() -> Self {
        Self {
            reps: 3,
            fps: 30.0,
            rest_angle: 10.0,
            peak_angle: 90.0,
            rest_secs: 1.0,
            raise_secs: 3.0,
            hold_secs: 3.5,
            lower_secs: 2.0,
        }
    }
}

impl RaiseProfile {
    /// Elevation trace for the whole session, one sample per frame
    pub fn elevation_trace(&self) -> Vec<f64> {
        let frames = |secs: f64| (secs * self.fps).round().max(0.0) as usize;
        let ramp = |from: f64, to: f64, n: usize| {
            (0..n).map(move |i| from + (to - from) * (i + 1) as f64 / n as f64)
        };

        let mut trace = Vec::new();
        trace.extend(std::iter::repeat(self.rest_angle).take(frames(self.rest_secs)));
        for _ in 0..self.reps {
            trace.extend(ramp(self.rest_angle, self.peak_angle, frames(self.raise_secs)));
            trace.extend(std::iter::repeat(self.peak_angle).take(frames(self.hold_secs)));
            trace.extend(ramp(self.peak_angle, self.rest_angle, frames(self.lower_secs)));
            trace.extend(std::iter::repeat(self.rest_angle).take(frames(self.rest_secs)));
        }
        trace
    }

    /// Frames for the whole session, starting at t = 0
    pub fn frames(&self) -> Vec<PoseFrame> {
        frames_from_trace(&self.elevation_trace(), self.fps)
    }
}

/// One frame per elevation sample at a fixed frame rate, starting at t = 0
pub fn frames_from_trace(trace: &[f64], fps: f64) -> Vec<PoseFrame> {
    trace
        .iter()
        .enumerate()
        .map(|(i, &angle)| {
            SyntheticPose::new()
                .arms(angle)
                .frame(Timestamp::from_secs_f64(i as f64 / fps))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::AngleSet;

    #[test]
    fn test_synthetic_pose_elevations() {
        for angle in [0.0, 30.0, 90.0, 120.0, 170.0] {
            let angles = AngleSet::from_landmarks(&SyntheticPose::new().arms(angle).landmarks())
                .unwrap();
            assert!((angles.left_elevation - angle).abs() < 1e-6);
            assert!((angles.right_elevation - angle).abs() < 1e-6);
            assert!((angles.left_elbow - 180.0).abs() < 1e-6);
            assert!(angles.symmetry_diff < 1e-6);
        }
    }

    #[test]
    fn test_shrug_raises_torso_height() {
        let relaxed = AngleSet::from_landmarks(&SyntheticPose::new().landmarks()).unwrap();
        let shrugged =
            AngleSet::from_landmarks(&SyntheticPose::new().shrug(0.05).landmarks()).unwrap();
        assert!((shrugged.torso_height - relaxed.torso_height - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_profile_trace_shape() {
        let profile = RaiseProfile {
            reps: 1,
            ..RaiseProfile::default()
        };
        let trace = profile.elevation_trace();
        // rest + raise + hold + lower + rest
        assert_eq!(trace.len(), 30 + 90 + 105 + 60 + 30);
        let peak = trace.iter().cloned().fold(0.0, f64::max);
        assert_eq!(peak, 90.0);
        assert_eq!(*trace.last().unwrap(), 10.0);

        let frames = profile.frames();
        assert_eq!(frames.len(), trace.len());
        assert!(frames.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }
}
