//! Per-session exercise state and the accumulator reducer

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::classifier::{Classification, Phase};
use crate::exercise::ExerciseType;

/// Longest interval between two holding ticks that still counts as one
/// continuous hold. Anything longer is a gap in observation (skipped
/// ticks, classification paused), not time spent holding.
const HOLD_GAP_TOLERANCE: Duration = Duration::from_millis(250);

/// Mutable per-session exercise state.
///
/// Created at session start, updated once per detector tick, discarded at
/// session end. Persistence of final results is the caller's job.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseState {
    /// Exercise being tracked
    pub exercise: ExerciseType,
    /// Last confirmed phase (`Unknown` until the first definite frame)
    pub phase: Phase,
    /// Completed repetitions
    pub reps: u32,
    /// Accumulated hold time (hold exercises only)
    #[serde(serialize_with = "serialize_duration_ms")]
    pub hold_duration: Duration,
    /// Whether the hold condition was true on the last tick
    pub holding: bool,
    /// Measured body angle on the last tick (hold exercises)
    pub body_angle: f32,
    /// When the phase last changed
    #[serde(skip)]
    pub last_phase_change: Option<Instant>,
    /// Whether the last frame showed acceptable form
    pub form_ok: bool,
    /// User-facing feedback message key
    pub feedback: Option<&'static str>,
    /// Previous holding tick, used to accumulate continuous hold time
    #[serde(skip)]
    last_holding_tick: Option<Instant>,
}

fn serialize_duration_ms<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl ExerciseState {
    pub fn new(exercise: ExerciseType) -> Self {
        Self {
            exercise,
            phase: Phase::Unknown,
            reps: 0,
            hold_duration: Duration::ZERO,
            holding: false,
            body_angle: 0.0,
            last_phase_change: None,
            form_ok: false,
            feedback: None,
            last_holding_tick: None,
        }
    }

    /// Apply one classified frame.
    ///
    /// `Unknown` phases never update the confirmed phase: single-frame
    /// classifier flicker cannot produce phantom transitions. Hold time
    /// accumulates only across consecutive holding ticks; a not-holding
    /// tick resets the accumulation anchor without discarding time
    /// already banked, and two holding ticks further apart than
    /// `HOLD_GAP_TOLERANCE` re-anchor without crediting the gap.
    pub fn apply(&mut self, classification: Classification, now: Instant) {
        match classification {
            Classification::Phase(Phase::Unknown) => {
                self.form_ok = false;
                self.feedback = Some("feedback.adjust_position");
            }
            Classification::Phase(phase) => {
                self.form_ok = true;
                self.feedback = None;
                if phase != self.phase {
                    if self.exercise.counting_transition() == Some((self.phase, phase)) {
                        self.reps += 1;
                        debug!(
                            exercise = ?self.exercise,
                            reps = self.reps,
                            "Repetition completed"
                        );
                    }
                    self.phase = phase;
                    self.last_phase_change = Some(now);
                }
            }
            Classification::Hold { holding, body_angle } => {
                self.body_angle = body_angle;
                self.form_ok = holding;
                self.feedback = if holding {
                    None
                } else {
                    Some("feedback.hold_position")
                };
                if holding {
                    if let Some(prev) = self.last_holding_tick {
                        let interval = now.duration_since(prev);
                        if interval <= HOLD_GAP_TOLERANCE {
                            self.hold_duration += interval;
                        }
                    }
                    self.last_holding_tick = Some(now);
                } else {
                    self.last_holding_tick = None;
                }
                if holding != self.holding {
                    self.holding = holding;
                    self.last_phase_change = Some(now);
                }
            }
        }
    }

    /// Drop the hold anchor without touching banked time.
    ///
    /// Called when observation stops mid-hold (classification paused),
    /// so the unobserved window is never credited on resume.
    pub fn break_hold(&mut self) {
        self.last_holding_tick = None;
        self.holding = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(p: Phase) -> Classification {
        Classification::Phase(p)
    }

    fn hold(holding: bool) -> Classification {
        Classification::Hold {
            holding,
            body_angle: 0.0,
        }
    }

    #[test]
    fn test_pushup_counts_down_up() {
        let mut state = ExerciseState::new(ExerciseType::PushUps);
        let t = Instant::now();

        state.apply(phase(Phase::Up), t);
        assert_eq!(state.reps, 0);
        state.apply(phase(Phase::Down), t);
        assert_eq!(state.reps, 0);
        state.apply(phase(Phase::Up), t);
        assert_eq!(state.reps, 1);
    }

    #[test]
    fn test_unknown_is_debounced() {
        let mut state = ExerciseState::new(ExerciseType::PushUps);
        let t = Instant::now();

        // Up, flicker, Up again: no rep without a confirmed Down
        state.apply(phase(Phase::Up), t);
        state.apply(phase(Phase::Unknown), t);
        state.apply(phase(Phase::Up), t);
        assert_eq!(state.reps, 0);
        assert_eq!(state.phase, Phase::Up);

        // Unknown straight into Up from start: still no rep
        let mut fresh = ExerciseState::new(ExerciseType::PushUps);
        fresh.apply(phase(Phase::Unknown), t);
        fresh.apply(phase(Phase::Up), t);
        assert_eq!(fresh.reps, 0);
    }

    #[test]
    fn test_unknown_between_valid_phases_still_counts() {
        let mut state = ExerciseState::new(ExerciseType::Squats);
        let t = Instant::now();

        state.apply(phase(Phase::Down), t);
        state.apply(phase(Phase::Unknown), t);
        state.apply(phase(Phase::Unknown), t);
        state.apply(phase(Phase::Up), t);
        assert_eq!(state.reps, 1);
    }

    #[test]
    fn test_crunch_counts_up_down() {
        let mut state = ExerciseState::new(ExerciseType::Crunches);
        let t = Instant::now();

        state.apply(phase(Phase::Down), t);
        state.apply(phase(Phase::Up), t);
        assert_eq!(state.reps, 0);
        state.apply(phase(Phase::Down), t);
        assert_eq!(state.reps, 1);
    }

    #[test]
    fn test_alternating_squat_sequence() {
        let mut state = ExerciseState::new(ExerciseType::Squats);
        let t = Instant::now();

        for p in [
            Phase::Down,
            Phase::Up,
            Phase::Unknown,
            Phase::Down,
            Phase::Unknown,
            Phase::Up,
            Phase::Down,
            Phase::Up,
        ] {
            state.apply(phase(p), t);
        }
        assert_eq!(state.reps, 3);
    }

    #[test]
    fn test_hold_accumulates_only_while_holding() {
        let mut state = ExerciseState::new(ExerciseType::Plank);
        let dt = Duration::from_millis(50);
        let t0 = Instant::now();

        // 3 holding ticks, 2 not-holding, 2 holding again
        state.apply(hold(true), t0);
        state.apply(hold(true), t0 + dt);
        state.apply(hold(true), t0 + 2 * dt);
        state.apply(hold(false), t0 + 3 * dt);
        state.apply(hold(false), t0 + 4 * dt);
        state.apply(hold(true), t0 + 5 * dt);
        state.apply(hold(true), t0 + 6 * dt);

        // First run: 2 intervals, second run: 1 interval. The gap and the
        // resume tick itself contribute nothing.
        assert_eq!(state.hold_duration, 3 * dt);
    }

    #[test]
    fn test_hold_gap_is_not_credited() {
        let mut state = ExerciseState::new(ExerciseType::Plank);
        let dt = Duration::from_millis(50);
        let t0 = Instant::now();

        // A minute between two holding observations is unobserved time,
        // not a minute of plank
        state.apply(hold(true), t0);
        state.apply(hold(true), t0 + Duration::from_secs(60));
        assert_eq!(state.hold_duration, Duration::ZERO);

        // Accumulation resumes at detector cadence from the new anchor
        state.apply(hold(true), t0 + Duration::from_secs(60) + dt);
        assert_eq!(state.hold_duration, dt);
    }

    #[test]
    fn test_break_hold_clears_anchor_keeps_banked_time() {
        let mut state = ExerciseState::new(ExerciseType::Plank);
        let dt = Duration::from_millis(50);
        let t0 = Instant::now();

        state.apply(hold(true), t0);
        state.apply(hold(true), t0 + dt);
        assert_eq!(state.hold_duration, dt);

        state.break_hold();
        assert!(!state.holding);

        // Resume tick re-anchors; only intervals after it count
        state.apply(hold(true), t0 + 4 * dt);
        assert_eq!(state.hold_duration, dt);
        state.apply(hold(true), t0 + 5 * dt);
        assert_eq!(state.hold_duration, 2 * dt);
    }

    #[test]
    fn test_hold_starting_mid_hold() {
        let mut state = ExerciseState::new(ExerciseType::WallSit);
        let dt = Duration::from_millis(50);
        let t0 = Instant::now();

        // First observed tick is already holding: accumulation starts
        // there, not at session start
        state.apply(hold(true), t0 + 10 * dt);
        assert_eq!(state.hold_duration, Duration::ZERO);
        state.apply(hold(true), t0 + 11 * dt);
        assert_eq!(state.hold_duration, dt);
    }

    #[test]
    fn test_phase_change_timestamp() {
        let mut state = ExerciseState::new(ExerciseType::PushUps);
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(50);

        state.apply(phase(Phase::Up), t0);
        assert_eq!(state.last_phase_change, Some(t0));
        // Same phase again: timestamp unchanged
        state.apply(phase(Phase::Up), t1);
        assert_eq!(state.last_phase_change, Some(t0));
        state.apply(phase(Phase::Down), t1);
        assert_eq!(state.last_phase_change, Some(t1));
    }

    #[test]
    fn test_feedback_on_unknown() {
        let mut state = ExerciseState::new(ExerciseType::PushUps);
        state.apply(phase(Phase::Unknown), Instant::now());
        assert!(!state.form_ok);
        assert!(state.feedback.is_some());
    }
}
