//! Resting shoulder baseline.
//!
//! While the subject stands at rest the engine averages the vertical
//! shoulder-to-hip distance. Once calibrated, a raised torso height during a
//! rep means the shoulders are shrugging toward the ears.

use serde::{Deserialize, Serialize};

const MIN_BASELINE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct ShoulderCalibration {
    target_samples: usize,
    sum: f64,
    samples: usize,
    baseline: Option<f64>,
}

/// Read-only view of the calibration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationStatus {
    pub calibrated: bool,
    pub samples: usize,
    pub shoulder_baseline: Option<f64>,
}

impl ShoulderCalibration {
    /// `target_samples == 0` disables calibration
    pub fn new(target_samples: usize) -> Self {
        Self {
            target_samples,
            sum: 0.0,
            samples: 0,
            baseline: None,
        }
    }

    /// Add a resting torso-height sample. Returns `true` on the sample that
    /// completes calibration.
    pub fn observe(&mut self, torso_height: f64) -> bool {
        if self.target_samples == 0 || self.baseline.is_some() || !torso_height.is_finite() {
            return false;
        }

        self.sum += torso_height;
        self.samples += 1;
        if self.samples < self.target_samples {
            return false;
        }

        let mean = self.sum / self.samples as f64;
        if mean > MIN_BASELINE {
            self.baseline = Some(mean);
            true
        } else {
            // Degenerate pose (hips on shoulders); start over
            self.sum = 0.0;
            self.samples = 0;
            false
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    /// Relative torso-height increase over the baseline, once calibrated
    pub fn shoulder_lift(&self, torso_height: f64) -> Option<f64> {
        self.baseline
            .map(|baseline| (torso_height - baseline) / baseline)
    }

    pub fn status(&self) -> CalibrationStatus {
        CalibrationStatus {
            calibrated: self.is_calibrated(),
            samples: self.samples,
            shoulder_baseline: self.baseline,
        }
    }

    pub fn reset(&mut self) {
        self.sum = 0.0;
        self.samples = 0;
        self.baseline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibrates_after_target_samples() {
        let mut calibration = ShoulderCalibration::new(3);
        assert!(!calibration.observe(0.30));
        assert!(!calibration.observe(0.32));
        assert!(calibration.observe(0.28));
        assert!(calibration.is_calibrated());
        assert!((calibration.baseline().unwrap() - 0.30).abs() < 1e-12);

        // Further samples do not move the baseline
        assert!(!calibration.observe(0.50));
        assert!((calibration.baseline().unwrap() - 0.30).abs() < 1e-12);
    }

    #[test]
    fn test_shoulder_lift() {
        let mut calibration = ShoulderCalibration::new(1);
        assert_eq!(calibration.shoulder_lift(0.33), None);
        calibration.observe(0.30);
        let lift = calibration.shoulder_lift(0.33).unwrap();
        assert!((lift - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_disabled_never_calibrates() {
        let mut calibration = ShoulderCalibration::new(0);
        for _ in 0..100 {
            assert!(!calibration.observe(0.3));
        }
        assert!(!calibration.is_calibrated());
    }

    #[test]
    fn test_degenerate_baseline_restarts() {
        let mut calibration = ShoulderCalibration::new(2);
        calibration.observe(0.0);
        assert!(!calibration.observe(0.0));
        assert!(!calibration.is_calibrated());
        assert_eq!(calibration.status().samples, 0);
    }

    #[test]
    fn test_reset() {
        let mut calibration = ShoulderCalibration::new(1);
        calibration.observe(0.3);
        calibration.reset();
        assert_eq!(calibration, ShoulderCalibration::new(1));
    }
}
