//! Analyzer configuration.
//!
//! Every threshold the engine uses lives here. Values can be loaded from a
//! file (any format the `config` crate understands) with `KINETRACK_`
//! environment overrides, e.g. `KINETRACK_PHASE__HOLD_SECS=2.5`.

use kinetrack_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Complete analyzer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Number of frames averaged by the temporal smoother
    pub smoothing_window: usize,

    /// Resting frames collected for the shoulder baseline (0 disables calibration)
    pub calibration_frames: usize,

    /// Phase state machine thresholds
    pub phase: PhaseThresholds,

    /// Form-error rule thresholds
    pub form: FormThresholds,
}

/// Hysteresis bands for the phase state machine (degrees / seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseThresholds {
    /// Arms are resting below this elevation
    pub rest_angle: f64,
    /// Lower bound of the target (hold) band
    pub target_min: f64,
    /// Upper bound of the target (hold) band
    pub target_max: f64,
    /// How far below `target_min` the arms must drop to leave the hold early
    pub hold_exit_margin: f64,
    /// Hold duration that completes the hold
    pub hold_secs: f64,
    /// Minimum peak elevation for a rep to count
    pub min_rep_peak: f64,
}

/// Thresholds for the form-error rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormThresholds {
    /// Elevation above which an arm is raised too high
    pub max_elevation: f64,
    /// Largest tolerated left/right elevation difference
    pub symmetry_tolerance: f64,
    /// Elbow flexion below which the arm counts as bent
    pub min_elbow_angle: f64,
    /// Shortest acceptable time from leaving rest to reaching the target band
    pub min_raise_secs: f64,
    /// Relative torso-height increase that counts as shrugging
    pub shrug_tolerance: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 5, // ~1/6 s at 30 fps
            calibration_frames: 30,
            phase: PhaseThresholds::default(),
            form: FormThresholds::default(),
        }
    }
}

impl Default for PhaseThresholds {
    fn default() -> Self {
        Self {
            rest_angle: 30.0,
            target_min: 80.0,
            target_max: 100.0,
            hold_exit_margin: 10.0,
            hold_secs: 3.0,
            min_rep_peak: 70.0,
        }
    }
}

impl Default for FormThresholds {
    fn default() -> Self {
        Self {
            max_elevation: 110.0,
            symmetry_tolerance: 15.0,
            min_elbow_angle: 140.0,
            min_raise_secs: 1.5,
            shrug_tolerance: 0.08,
        }
    }
}

impl PhaseThresholds {
    pub fn in_target(&self, angle: f64) -> bool {
        angle >= self.target_min && angle <= self.target_max
    }

    /// Elevation below which a hold ends before its timer completes
    pub fn hold_exit_angle(&self) -> f64 {
        self.target_min - self.hold_exit_margin
    }
}

impl AnalyzerConfig {
    /// Load configuration from file, with environment overrides
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(Self::environment())
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Self::finish(settings)
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(Self::environment())
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Self::finish(settings)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("KINETRACK")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn finish(settings: config::Config) -> Result<Self> {
        let config: Self = settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that thresholds describe a usable state machine
    pub fn validate(&self) -> Result<()> {
        if self.smoothing_window == 0 {
            return Err(Error::Config("smoothing_window must be at least 1".into()));
        }

        let p = &self.phase;
        let f = &self.form;
        let values = [
            ("phase.rest_angle", p.rest_angle),
            ("phase.target_min", p.target_min),
            ("phase.target_max", p.target_max),
            ("phase.hold_exit_margin", p.hold_exit_margin),
            ("phase.hold_secs", p.hold_secs),
            ("phase.min_rep_peak", p.min_rep_peak),
            ("form.max_elevation", f.max_elevation),
            ("form.symmetry_tolerance", f.symmetry_tolerance),
            ("form.min_elbow_angle", f.min_elbow_angle),
            ("form.min_raise_secs", f.min_raise_secs),
            ("form.shrug_tolerance", f.shrug_tolerance),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if p.rest_angle >= p.target_min {
            return Err(Error::Config(format!(
                "phase.rest_angle ({}) must be below phase.target_min ({})",
                p.rest_angle, p.target_min
            )));
        }
        if p.target_min > p.target_max {
            return Err(Error::Config(format!(
                "phase.target_min ({}) must not exceed phase.target_max ({})",
                p.target_min, p.target_max
            )));
        }

        Ok(())
    }
}
