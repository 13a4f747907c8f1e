//! Rule-based form-error detection.
//!
//! Rules are independent and stateless: each frame is judged from its raw
//! joint angles, the current phase and the rep telemetry kept by the phase
//! tracker. All comparisons are strict, so a value sitting exactly on a
//! threshold is not a defect.

use std::collections::BTreeSet;
use std::fmt;

use kinetrack_core::{AngleSet, Side};
use serde::{Deserialize, Serialize};

use crate::config::FormThresholds;
use crate::phase::{MovementPhase, RepRecord};

/// Named form defect.
///
/// Variants are declared in feedback priority order (most important first);
/// the derived `Ord` is what [`FormErrors`] iterates by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormError {
    InsufficientHeight,
    AsymmetricMovement,
    ArmTooHighLeft,
    ArmTooHighRight,
    ElbowBentLeft,
    ElbowBentRight,
    TooFastRaising,
    ShouldersRaised,
}

impl FormError {
    pub const ALL: [FormError; 8] = [
        FormError::InsufficientHeight,
        FormError::AsymmetricMovement,
        FormError::ArmTooHighLeft,
        FormError::ArmTooHighRight,
        FormError::ElbowBentLeft,
        FormError::ElbowBentRight,
        FormError::TooFastRaising,
        FormError::ShouldersRaised,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormError::InsufficientHeight => "insufficient_height",
            FormError::AsymmetricMovement => "asymmetric_movement",
            FormError::ArmTooHighLeft => "arm_too_high_left",
            FormError::ArmTooHighRight => "arm_too_high_right",
            FormError::ElbowBentLeft => "elbow_bent_left",
            FormError::ElbowBentRight => "elbow_bent_right",
            FormError::TooFastRaising => "too_fast_raising",
            FormError::ShouldersRaised => "shoulders_raised",
        }
    }

    pub fn arm_too_high(side: Side) -> Self {
        match side {
            Side::Left => FormError::ArmTooHighLeft,
            Side::Right => FormError::ArmTooHighRight,
        }
    }

    pub fn elbow_bent(side: Side) -> Self {
        match side {
            Side::Left => FormError::ElbowBentLeft,
            Side::Right => FormError::ElbowBentRight,
        }
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of defects present on one frame, iterated in priority order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormErrors(BTreeSet<FormError>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the error was already present
    pub fn insert(&mut self, error: FormError) -> bool {
        self.0.insert(error)
    }

    pub fn contains(&self, error: FormError) -> bool {
        self.0.contains(&error)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FormError> + '_ {
        self.0.iter().copied()
    }

    /// The one defect worth telling the user about
    pub fn highest_priority(&self) -> Option<FormError> {
        self.0.first().copied()
    }

    pub fn to_vec(&self) -> Vec<FormError> {
        self.iter().collect()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<FormError> for FormErrors {
    fn from_iter<I: IntoIterator<Item = FormError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Everything the rules look at for one frame
#[derive(Debug, Clone, Copy)]
pub struct FormContext<'a> {
    pub angles: &'a AngleSet,
    pub phase: MovementPhase,
    pub rep: &'a RepRecord,
    /// Relative shoulder lift over the resting baseline, once calibrated
    pub shoulder_lift: Option<f64>,
}

/// Evaluates the fixed rule set
#[derive(Debug, Clone, PartialEq)]
pub struct FormDetector {
    thresholds: FormThresholds,
    min_rep_peak: f64,
}

impl FormDetector {
    pub fn new(thresholds: FormThresholds, min_rep_peak: f64) -> Self {
        Self {
            thresholds,
            min_rep_peak,
        }
    }

    pub fn detect(&self, ctx: &FormContext<'_>) -> FormErrors {
        let t = &self.thresholds;
        let mut errors = FormErrors::new();

        for side in Side::BOTH {
            if ctx.angles.elevation(side) > t.max_elevation {
                errors.insert(FormError::arm_too_high(side));
            }
            if ctx.angles.elbow(side) < t.min_elbow_angle {
                errors.insert(FormError::elbow_bent(side));
            }
        }

        if ctx.phase.is_active() {
            if ctx.angles.symmetry_diff > t.symmetry_tolerance {
                errors.insert(FormError::AsymmetricMovement);
            }
            if ctx.shoulder_lift.is_some_and(|lift| lift > t.shrug_tolerance) {
                errors.insert(FormError::ShouldersRaised);
            }
        }

        match ctx.phase {
            MovementPhase::Holding => {
                if ctx
                    .rep
                    .raise_duration_secs
                    .is_some_and(|secs| secs < t.min_raise_secs)
                {
                    errors.insert(FormError::TooFastRaising);
                }
            }
            MovementPhase::Lowering => {
                if ctx.rep.peak_angle < self.min_rep_peak {
                    errors.insert(FormError::InsufficientHeight);
                }
            }
            MovementPhase::Resting | MovementPhase::Raising => {}
        }

        errors
    }

    pub fn thresholds(&self) -> &FormThresholds {
        &self.thresholds
    }
}

impl Default for FormDetector {
    fn default() -> Self {
        Self::new(FormThresholds::default(), 70.0)
    }
}
