//! Movement phase state machine.
//!
//! ```text
//!            a > rest            target_min <= a <= target_max
//!  RESTING ───────────▶ RAISING ─────────────────────────────▶ HOLDING
//!     ▲                   │                                       │
//!     │      a < rest     │        hold >= hold_secs              │
//!     ├───────────────────┘        or a < target_min - margin     │
//!     │                                                           ▼
//!     └────────────────────────── a < rest ──────────────────── LOWERING
//! ```
//!
//! Entering and leaving the hold use different thresholds so a smoothed
//! angle sitting on a band edge cannot flap. A rep is closed (and counted
//! when its peak qualifies) only on `LOWERING → RESTING`.

use kinetrack_core::Timestamp;
use serde::{Deserialize, Serialize};

use crate::config::PhaseThresholds;

/// Phase of a single repetition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementPhase {
    #[default]
    Resting,
    Raising,
    Holding,
    Lowering,
}

impl MovementPhase {
    pub fn name(&self) -> &'static str {
        match self {
            MovementPhase::Resting => "RESTING",
            MovementPhase::Raising => "RAISING",
            MovementPhase::Holding => "HOLDING",
            MovementPhase::Lowering => "LOWERING",
        }
    }

    /// Arms are actively moving up or held up
    pub fn is_active(&self) -> bool {
        matches!(self, MovementPhase::Raising | MovementPhase::Holding)
    }
}

/// A phase change observed on one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: MovementPhase,
    pub to: MovementPhase,
}

/// Telemetry for the repetition in progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RepRecord {
    /// When the arms left the resting band
    pub start: Option<Timestamp>,
    /// Highest smoothed elevation seen during the rep
    pub peak_angle: f64,
    /// Time from `start` to entering the target band
    pub raise_duration_secs: Option<f64>,
    pub hold_start: Option<Timestamp>,
    pub hold_duration_secs: f64,
    pub hold_complete: bool,
}

/// How a repetition ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RepOutcome {
    /// Returned to rest after reaching the qualifying height
    Counted {
        peak_angle: f64,
        raise_duration_secs: Option<f64>,
        hold_duration_secs: f64,
    },
    /// Returned to rest without reaching the qualifying height
    Rejected { peak_angle: f64 },
    /// Dropped back to rest before reaching the target band
    Aborted { peak_angle: f64 },
}

/// Result of feeding one smoothed angle to the tracker
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseUpdate {
    pub transition: Option<PhaseTransition>,
    pub outcome: Option<RepOutcome>,
}

/// Phase state machine with rep counting
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTracker {
    thresholds: PhaseThresholds,
    current: MovementPhase,
    previous: MovementPhase,
    rep_count: u32,
    rep: RepRecord,
}

impl PhaseTracker {
    pub fn new(thresholds: PhaseThresholds) -> Self {
        Self {
            thresholds,
            current: MovementPhase::Resting,
            previous: MovementPhase::Resting,
            rep_count: 0,
            rep: RepRecord::default(),
        }
    }

    /// Advance the machine with the smoothed elevation observed at `now`
    pub fn update(&mut self, angle: f64, now: Timestamp) -> PhaseUpdate {
        self.previous = self.current;
        self.track_rep(angle, now);

        let Some(next) = self.next_phase(angle) else {
            return PhaseUpdate::default();
        };

        let outcome = self.enter(next, angle, now);
        let transition = PhaseTransition {
            from: self.current,
            to: next,
        };
        self.current = next;

        PhaseUpdate {
            transition: Some(transition),
            outcome,
        }
    }

    /// Peak and hold bookkeeping for the phase we are in
    fn track_rep(&mut self, angle: f64, now: Timestamp) {
        if self.current != MovementPhase::Resting {
            self.rep.peak_angle = self.rep.peak_angle.max(angle);
        }

        if self.current == MovementPhase::Holding {
            if let Some(hold_start) = self.rep.hold_start {
                self.rep.hold_duration_secs = now.secs_since(hold_start).max(0.0);
            }
            if self.rep.hold_duration_secs >= self.thresholds.hold_secs {
                self.rep.hold_complete = true;
            }
        }
    }

    fn next_phase(&self, angle: f64) -> Option<MovementPhase> {
        let t = &self.thresholds;
        match self.current {
            MovementPhase::Resting if angle > t.rest_angle => Some(MovementPhase::Raising),
            MovementPhase::Raising if angle < t.rest_angle => Some(MovementPhase::Resting),
            MovementPhase::Raising if t.in_target(angle) => Some(MovementPhase::Holding),
            MovementPhase::Holding
                if self.rep.hold_complete || angle < t.hold_exit_angle() =>
            {
                Some(MovementPhase::Lowering)
            }
            MovementPhase::Lowering if angle < t.rest_angle => Some(MovementPhase::Resting),
            _ => None,
        }
    }

    fn enter(&mut self, next: MovementPhase, angle: f64, now: Timestamp) -> Option<RepOutcome> {
        match (self.current, next) {
            (MovementPhase::Resting, MovementPhase::Raising) => {
                self.rep = RepRecord {
                    start: Some(now),
                    peak_angle: angle,
                    ..RepRecord::default()
                };
                None
            }
            (MovementPhase::Raising, MovementPhase::Resting) => {
                let outcome = RepOutcome::Aborted {
                    peak_angle: self.rep.peak_angle,
                };
                self.rep = RepRecord::default();
                Some(outcome)
            }
            (MovementPhase::Raising, MovementPhase::Holding) => {
                self.rep.raise_duration_secs = self.rep.start.map(|start| now.secs_since(start));
                self.rep.hold_start.get_or_insert(now);
                None
            }
            (MovementPhase::Lowering, MovementPhase::Resting) => {
                let peak_angle = self.rep.peak_angle;
                let outcome = if peak_angle >= self.thresholds.min_rep_peak {
                    self.rep_count += 1;
                    RepOutcome::Counted {
                        peak_angle,
                        raise_duration_secs: self.rep.raise_duration_secs,
                        hold_duration_secs: self.rep.hold_duration_secs,
                    }
                } else {
                    RepOutcome::Rejected { peak_angle }
                };
                self.rep = RepRecord::default();
                Some(outcome)
            }
            _ => None,
        }
    }

    pub fn phase(&self) -> MovementPhase {
        self.current
    }

    /// Phase at the previous frame
    pub fn previous_phase(&self) -> MovementPhase {
        self.previous
    }

    pub fn rep_count(&self) -> u32 {
        self.rep_count
    }

    pub fn current_rep(&self) -> &RepRecord {
        &self.rep
    }

    pub fn thresholds(&self) -> &PhaseThresholds {
        &self.thresholds
    }

    pub fn reset(&mut self) {
        self.current = MovementPhase::Resting;
        self.previous = MovementPhase::Resting;
        self.rep_count = 0;
        self.rep = RepRecord::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FPS: f64 = 30.0;

    /// Feed one sample per frame at 30 fps, starting at `start_frame`
    fn feed(tracker: &mut PhaseTracker, angles: &[f64], start_frame: usize) -> Vec<PhaseUpdate> {
        angles
            .iter()
            .enumerate()
            .map(|(i, &a)| {
                let t = Timestamp::from_secs_f64((start_frame + i) as f64 / FPS);
                tracker.update(a, t)
            })
            .collect()
    }

    fn transitions(updates: &[PhaseUpdate]) -> Vec<MovementPhase> {
        updates
            .iter()
            .filter_map(|u| u.transition.map(|t| t.to))
            .collect()
    }

    #[test]
    fn test_full_cycle_counts_once() {
        let mut tracker = PhaseTracker::new(PhaseThresholds::default());
        let mut angles = vec![10.0, 40.0, 60.0, 85.0];
        angles.extend(std::iter::repeat(90.0).take(100)); // > 3 s hold
        angles.extend([60.0, 40.0, 20.0]);

        let updates = feed(&mut tracker, &angles, 0);

        assert_eq!(
            transitions(&updates),
            vec![
                MovementPhase::Raising,
                MovementPhase::Holding,
                MovementPhase::Lowering,
                MovementPhase::Resting,
            ]
        );
        assert_eq!(tracker.rep_count(), 1);
        assert!(matches!(
            updates.last().unwrap().outcome,
            Some(RepOutcome::Counted { peak_angle, .. }) if peak_angle == 90.0
        ));
        assert_eq!(*tracker.current_rep(), RepRecord::default());
    }

    #[test]
    fn test_hold_timer_completes_hold() {
        let mut tracker = PhaseTracker::new(PhaseThresholds::default());
        feed(&mut tracker, &[40.0, 90.0], 0);
        assert_eq!(tracker.phase(), MovementPhase::Holding);

        // 89 more frames: 2.97 s into the hold
        feed(&mut tracker, &[90.0; 89], 2);
        assert_eq!(tracker.phase(), MovementPhase::Holding);
        assert!(!tracker.current_rep().hold_complete);

        feed(&mut tracker, &[90.0; 2], 91);
        assert_eq!(tracker.phase(), MovementPhase::Lowering);
        assert!(tracker.current_rep().hold_complete);
        assert!(tracker.current_rep().hold_duration_secs >= 3.0);
    }

    #[test]
    fn test_hold_exit_uses_wider_band() {
        let mut tracker = PhaseTracker::new(PhaseThresholds::default());
        feed(&mut tracker, &[40.0, 85.0], 0);
        assert_eq!(tracker.phase(), MovementPhase::Holding);

        // Below the entry bound but above the exit bound: stay
        feed(&mut tracker, &[75.0, 72.0, 70.0], 2);
        assert_eq!(tracker.phase(), MovementPhase::Holding);

        feed(&mut tracker, &[69.9], 5);
        assert_eq!(tracker.phase(), MovementPhase::Lowering);
        assert!(!tracker.current_rep().hold_complete);
    }

    #[test]
    fn test_early_abort_is_not_counted() {
        let mut tracker = PhaseTracker::new(PhaseThresholds::default());
        let updates = feed(&mut tracker, &[10.0, 35.0, 50.0, 45.0, 25.0], 0);

        assert_eq!(
            transitions(&updates),
            vec![MovementPhase::Raising, MovementPhase::Resting]
        );
        assert_eq!(tracker.rep_count(), 0);
        assert!(matches!(
            updates.last().unwrap().outcome,
            Some(RepOutcome::Aborted { peak_angle }) if peak_angle == 50.0
        ));
    }

    #[test]
    fn test_between_bands_holds_phase() {
        let mut tracker = PhaseTracker::new(PhaseThresholds::default());
        feed(&mut tracker, &[40.0], 0);
        // Above the target band while raising: no transition
        let updates = feed(&mut tracker, &[105.0, 120.0], 1);
        assert!(updates.iter().all(|u| u.transition.is_none()));
        assert_eq!(tracker.phase(), MovementPhase::Raising);
        assert_eq!(tracker.current_rep().peak_angle, 120.0);
    }

    #[test]
    fn test_rest_threshold_is_exclusive() {
        let mut tracker = PhaseTracker::new(PhaseThresholds::default());
        feed(&mut tracker, &[30.0], 0);
        assert_eq!(tracker.phase(), MovementPhase::Resting);
        feed(&mut tracker, &[30.1], 1);
        assert_eq!(tracker.phase(), MovementPhase::Raising);
    }

    #[test]
    fn test_short_peak_is_rejected() {
        let thresholds = PhaseThresholds {
            target_min: 60.0,
            ..PhaseThresholds::default()
        };
        let mut tracker = PhaseTracker::new(thresholds);
        let mut angles = vec![40.0, 65.0];
        angles.extend(std::iter::repeat(65.0).take(100));
        angles.push(10.0);

        let updates = feed(&mut tracker, &angles, 0);
        assert_eq!(tracker.rep_count(), 0);
        assert!(matches!(
            updates.last().unwrap().outcome,
            Some(RepOutcome::Rejected { .. })
        ));
    }

    #[test]
    fn test_peak_only_increases_within_rep() {
        let mut tracker = PhaseTracker::new(PhaseThresholds::default());
        let mut last_peak = 0.0;
        for (i, a) in [40.0, 70.0, 95.0, 88.0, 82.0, 60.0, 40.0].iter().enumerate() {
            tracker.update(*a, Timestamp::from_secs_f64(i as f64 / FPS));
            let peak = tracker.current_rep().peak_angle;
            assert!(peak >= last_peak);
            last_peak = peak;
        }
        assert_eq!(last_peak, 95.0);
    }

    #[test]
    fn test_reset() {
        let mut tracker = PhaseTracker::new(PhaseThresholds::default());
        let mut angles = vec![40.0, 90.0];
        angles.extend(std::iter::repeat(90.0).take(100));
        angles.push(10.0);
        feed(&mut tracker, &angles, 0);
        assert_eq!(tracker.rep_count(), 1);

        tracker.reset();
        assert_eq!(tracker, PhaseTracker::new(PhaseThresholds::default()));
    }
}
