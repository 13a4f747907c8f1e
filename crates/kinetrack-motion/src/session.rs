//! Per-session aggregates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::form::{FormError, FormErrors};
use crate::phase::RepOutcome;

/// Snapshot of a session so far
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub frames_analyzed: u64,
    pub reps_counted: u32,
    pub reps_rejected: u32,
    pub reps_aborted: u32,
    /// Mean per-frame form score (100 before any frame)
    pub mean_form_score: f64,
    /// Highest peak elevation of a counted rep
    pub best_peak_angle: Option<f64>,
    /// How many times each error appeared after being absent
    pub error_onsets: BTreeMap<FormError, u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    frames: u64,
    score_sum: f64,
    counted: u32,
    rejected: u32,
    aborted: u32,
    best_peak: Option<f64>,
    onsets: BTreeMap<FormError, u32>,
    last_errors: FormErrors,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frame(&mut self, score: f64, errors: &FormErrors) {
        self.frames += 1;
        self.score_sum += score;

        for error in errors.iter() {
            if !self.last_errors.contains(error) {
                *self.onsets.entry(error).or_insert(0) += 1;
            }
        }
        self.last_errors.clone_from(errors);
    }

    pub fn record_outcome(&mut self, outcome: &RepOutcome) {
        match *outcome {
            RepOutcome::Counted { peak_angle, .. } => {
                self.counted += 1;
                self.best_peak = Some(self.best_peak.map_or(peak_angle, |p| p.max(peak_angle)));
            }
            RepOutcome::Rejected { .. } => self.rejected += 1,
            RepOutcome::Aborted { .. } => self.aborted += 1,
        }
    }

    pub fn frames_analyzed(&self) -> u64 {
        self.frames
    }

    pub fn mean_form_score(&self) -> f64 {
        if self.frames == 0 {
            100.0
        } else {
            self.score_sum / self.frames as f64
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            frames_analyzed: self.frames,
            reps_counted: self.counted,
            reps_rejected: self.rejected,
            reps_aborted: self.aborted,
            mean_form_score: self.mean_form_score(),
            best_peak_angle: self.best_peak,
            error_onsets: self.onsets.clone(),
        }
    }

    pub fn reset(&mut self) {
        self.frames = 0;
        self.score_sum = 0.0;
        self.counted = 0;
        self.rejected = 0;
        self.aborted = 0;
        self.best_peak = None;
        self.onsets.clear();
        self.last_errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors(list: &[FormError]) -> FormErrors {
        list.iter().copied().collect()
    }

    #[test]
    fn test_empty_session() {
        let summary = SessionStats::new().summary();
        assert_eq!(summary.frames_analyzed, 0);
        assert_eq!(summary.mean_form_score, 100.0);
        assert!(summary.error_onsets.is_empty());
    }

    #[test]
    fn test_onsets_count_rising_edges() {
        let mut stats = SessionStats::new();
        let elbow = errors(&[FormError::ElbowBentLeft]);

        stats.record_frame(90.0, &elbow);
        stats.record_frame(90.0, &elbow);
        stats.record_frame(100.0, &FormErrors::new());
        stats.record_frame(90.0, &elbow);

        let summary = stats.summary();
        assert_eq!(summary.frames_analyzed, 4);
        assert_eq!(summary.error_onsets[&FormError::ElbowBentLeft], 2);
        assert!((summary.mean_form_score - 92.5).abs() < 1e-9);
    }

    #[test]
    fn test_outcomes() {
        let mut stats = SessionStats::new();
        stats.record_outcome(&RepOutcome::Counted {
            peak_angle: 88.0,
            raise_duration_secs: Some(2.0),
            hold_duration_secs: 3.0,
        });
        stats.record_outcome(&RepOutcome::Counted {
            peak_angle: 93.0,
            raise_duration_secs: Some(2.0),
            hold_duration_secs: 3.0,
        });
        stats.record_outcome(&RepOutcome::Rejected { peak_angle: 65.0 });
        stats.record_outcome(&RepOutcome::Aborted { peak_angle: 40.0 });

        let summary = stats.summary();
        assert_eq!(summary.reps_counted, 2);
        assert_eq!(summary.reps_rejected, 1);
        assert_eq!(summary.reps_aborted, 1);
        assert_eq!(summary.best_peak_angle, Some(93.0));
    }

    #[test]
    fn test_reset() {
        let mut stats = SessionStats::new();
        stats.record_frame(50.0, &errors(&[FormError::AsymmetricMovement]));
        stats.record_outcome(&RepOutcome::Aborted { peak_angle: 40.0 });
        stats.reset();
        assert_eq!(stats, SessionStats::new());
    }
}
