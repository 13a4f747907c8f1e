//! Per-session movement analyzer.
//!
//! One [`MovementAnalyzer`] owns all mutable state for one exercise session.
//! Frames must be fed in temporal order; every duration is measured from
//! frame timestamps, so a replay yields the same results as the live run.

use kinetrack_core::{AngleSet, PoseFrame, Result, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::calibration::{CalibrationStatus, ShoulderCalibration};
use crate::config::AnalyzerConfig;
use crate::form::{FormContext, FormDetector, FormError, FormErrors};
use crate::phase::{MovementPhase, PhaseTracker, PhaseTransition, RepOutcome, RepRecord};
use crate::scoring::{compose_feedback, form_score, FeedbackLevel, MAX_SCORE};
use crate::session::{SessionStats, SessionSummary};
use crate::smoothing::AngleSmoother;

/// Everything that changes from frame to frame
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerState {
    tracker: PhaseTracker,
    smoother: AngleSmoother,
    calibration: ShoulderCalibration,
    errors: FormErrors,
    form_score: f64,
    stats: SessionStats,
}

impl AnalyzerState {
    fn new(config: &AnalyzerConfig) -> Self {
        Self {
            tracker: PhaseTracker::new(config.phase.clone()),
            smoother: AngleSmoother::new(config.smoothing_window),
            calibration: ShoulderCalibration::new(config.calibration_frames),
            errors: FormErrors::new(),
            form_score: MAX_SCORE,
            stats: SessionStats::new(),
        }
    }

    pub fn phase(&self) -> MovementPhase {
        self.tracker.phase()
    }

    pub fn previous_phase(&self) -> MovementPhase {
        self.tracker.previous_phase()
    }

    pub fn rep_count(&self) -> u32 {
        self.tracker.rep_count()
    }

    pub fn current_rep(&self) -> &RepRecord {
        self.tracker.current_rep()
    }

    /// Recent average elevations, oldest first
    pub fn angle_history(&self) -> impl Iterator<Item = f64> + '_ {
        self.smoother.history()
    }

    pub fn active_errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn form_score(&self) -> f64 {
        self.form_score
    }

    pub fn calibration(&self) -> CalibrationStatus {
        self.calibration.status()
    }

    fn reset(&mut self) {
        self.tracker.reset();
        self.smoother.reset();
        self.calibration.reset();
        self.errors.clear();
        self.form_score = MAX_SCORE;
        self.stats.reset();
    }
}

/// Output for one accepted frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub timestamp: Timestamp,
    pub phase: MovementPhase,
    pub previous_phase: MovementPhase,
    pub transition: Option<PhaseTransition>,
    pub angles: AngleSet,
    pub smoothed_angle: f64,
    /// Active form errors, highest priority first
    pub errors: Vec<FormError>,
    pub rep_count: u32,
    /// A rep was counted on this frame
    pub rep_completed: bool,
    pub form_score: f64,
    pub feedback: String,
    pub feedback_level: FeedbackLevel,
    pub hold_duration_secs: f64,
    pub hold_complete: bool,
}

/// Lightweight session progress for UI polling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub rep_count: u32,
    pub phase: MovementPhase,
    pub form_score: f64,
}

#[derive(Debug)]
pub struct MovementAnalyzer {
    config: AnalyzerConfig,
    detector: FormDetector,
    state: AnalyzerState,
}

impl MovementAnalyzer {
    /// Build an analyzer without validating `config`
    pub fn new(config: AnalyzerConfig) -> Self {
        let detector = FormDetector::new(config.form.clone(), config.phase.min_rep_peak);
        let state = AnalyzerState::new(&config);
        Self {
            config,
            detector,
            state,
        }
    }

    pub fn try_new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn with_defaults() -> Self {
        Self::new(AnalyzerConfig::default())
    }

    /// Process one frame.
    ///
    /// Returns `None` for frames that cannot be measured (too few landmarks,
    /// non-finite coordinates); those leave the session untouched.
    pub fn analyze(&mut self, frame: &PoseFrame) -> Option<AnalysisResult> {
        let angles = match AngleSet::from_frame(frame) {
            Ok(angles) => angles,
            Err(err) => {
                debug!(%err, "skipping frame");
                return None;
            }
        };

        let now = frame.timestamp;
        let state = &mut self.state;

        let smoothed = state.smoother.push(angles.average_elevation);
        trace!(
            left = angles.left_elevation,
            right = angles.right_elevation,
            smoothed,
            "frame angles"
        );

        let update = state.tracker.update(smoothed, now);
        if let Some(transition) = update.transition {
            debug!(
                from = transition.from.name(),
                to = transition.to.name(),
                angle = smoothed,
                "phase transition"
            );
        }

        let phase = state.tracker.phase();
        if phase == MovementPhase::Resting && state.calibration.observe(angles.torso_height) {
            info!(
                baseline = state.calibration.baseline().unwrap_or_default(),
                "shoulder calibration complete"
            );
        }

        let rep = *state.tracker.current_rep();
        let errors = self.detector.detect(&FormContext {
            angles: &angles,
            phase,
            rep: &rep,
            shoulder_lift: state.calibration.shoulder_lift(angles.torso_height),
        });
        let score = form_score(&errors);
        let feedback = compose_feedback(&errors, phase, smoothed);
        let feedback_level = FeedbackLevel::from_errors(&errors);

        let mut rep_completed = false;
        if let Some(outcome) = &update.outcome {
            match outcome {
                RepOutcome::Counted { peak_angle, .. } => {
                    rep_completed = true;
                    info!(rep = state.tracker.rep_count(), peak_angle, "rep counted");
                }
                RepOutcome::Rejected { peak_angle } => {
                    debug!(peak_angle, "rep rejected");
                }
                RepOutcome::Aborted { peak_angle } => {
                    debug!(peak_angle, "rep aborted");
                }
            }
            state.stats.record_outcome(outcome);
        }

        state.stats.record_frame(score, &errors);
        let error_list = errors.to_vec();
        state.errors = errors;
        state.form_score = score;

        Some(AnalysisResult {
            timestamp: now,
            phase,
            previous_phase: state.tracker.previous_phase(),
            transition: update.transition,
            angles,
            smoothed_angle: smoothed,
            errors: error_list,
            rep_count: state.tracker.rep_count(),
            rep_completed,
            form_score: score,
            feedback,
            feedback_level,
            hold_duration_secs: rep.hold_duration_secs,
            hold_complete: rep.hold_complete,
        })
    }

    /// Clear all session state in place
    pub fn reset(&mut self) {
        self.state.reset();
        debug!("analyzer reset");
    }

    pub fn progress(&self) -> Progress {
        Progress {
            rep_count: self.state.rep_count(),
            phase: self.state.phase(),
            form_score: self.state.form_score,
        }
    }

    pub fn state(&self) -> &AnalyzerState {
        &self.state
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn summary(&self) -> SessionSummary {
        self.state.stats.summary()
    }
}

impl Default for MovementAnalyzer {
    fn default() -> Self {
        Self::with_defaults()
    }
}
