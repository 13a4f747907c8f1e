//! Form scoring and user-facing feedback.

use serde::{Deserialize, Serialize};

use crate::form::{FormError, FormErrors};
use crate::phase::MovementPhase;

pub const MAX_SCORE: f64 = 100.0;

impl FormError {
    /// Points deducted from a perfect score while this error is present
    pub fn penalty(&self) -> f64 {
        match self {
            FormError::InsufficientHeight => 25.0,
            FormError::AsymmetricMovement => 20.0,
            FormError::TooFastRaising | FormError::ShouldersRaised => 15.0,
            FormError::ArmTooHighLeft
            | FormError::ArmTooHighRight
            | FormError::ElbowBentLeft
            | FormError::ElbowBentRight => 10.0,
        }
    }

    /// Corrective cue shown to the user
    pub fn message(&self) -> &'static str {
        match self {
            FormError::InsufficientHeight => "Raise your arms higher, up to shoulder level",
            FormError::AsymmetricMovement => "Keep both arms at the same height",
            FormError::ArmTooHighLeft => "Lower your left arm to shoulder level",
            FormError::ArmTooHighRight => "Lower your right arm to shoulder level",
            FormError::ElbowBentLeft => "Straighten your left elbow",
            FormError::ElbowBentRight => "Straighten your right elbow",
            FormError::TooFastRaising => "Slow down, raise your arms with control",
            FormError::ShouldersRaised => "Relax your shoulders away from your ears",
        }
    }
}

/// Form quality of a single frame, in `[0, 100]`
pub fn form_score(errors: &FormErrors) -> f64 {
    let penalty: f64 = errors.iter().map(|e| e.penalty()).sum();
    (MAX_SCORE - penalty).clamp(0.0, MAX_SCORE)
}

/// Severity bucket used as the overlay color key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackLevel {
    #[default]
    Good,
    Warning,
    Error,
}

impl FeedbackLevel {
    pub fn from_error_count(count: usize) -> Self {
        match count {
            0 => FeedbackLevel::Good,
            1..=2 => FeedbackLevel::Warning,
            _ => FeedbackLevel::Error,
        }
    }

    pub fn from_errors(errors: &FormErrors) -> Self {
        Self::from_error_count(errors.len())
    }
}

/// One-line cue for the current frame.
///
/// With errors present only the highest-priority one is reported so the
/// user gets a single correction at a time.
pub fn compose_feedback(errors: &FormErrors, phase: MovementPhase, angle: f64) -> String {
    if let Some(error) = errors.highest_priority() {
        return error.message().to_string();
    }

    match phase {
        MovementPhase::Resting => format!("Ready at {angle:.0}°, raise both arms out to the sides"),
        MovementPhase::Raising => format!("Keep raising, {angle:.0}°"),
        MovementPhase::Holding => format!("Good, hold it there at {angle:.0}°"),
        MovementPhase::Lowering => format!("Lower slowly, {angle:.0}°"),
    }
}
