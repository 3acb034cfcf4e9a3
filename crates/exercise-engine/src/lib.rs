//! Exercise Classification Engine
//!
//! Turns per-frame body landmarks into exercise tracking state:
//! - Geometric phase classification per exercise type
//! - Repetition counting on confirmed phase transitions
//! - Hold-time accumulation for plank-style exercises
//! - Visibility checks with directional user guidance

pub mod classifier;
pub mod config;
pub mod exercise;
pub mod state;
pub mod visibility;

pub use classifier::{Classification, Phase};
pub use config::{EngineConfig, Thresholds};
pub use exercise::ExerciseType;
pub use state::ExerciseState;
pub use visibility::{check_visibility, Direction, VisibilityCheck};

use std::time::Instant;

use pose_types::PoseFrame;
use serde::Serialize;
use thiserror::Error;

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result of processing one detector tick.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseAnalysis {
    /// Whether a pose was present in the frame
    pub pose_detected: bool,
    /// Classifier output (absent when no pose was detected)
    pub classification: Option<Classification>,
    /// Visibility and guidance for this tick
    pub visibility: VisibilityCheck,
    /// Snapshot of the session state after applying this tick
    pub state: ExerciseState,
}

/// Per-session classification engine.
///
/// Owns the mutable `ExerciseState`; the detector loop feeds it one
/// landmark frame (or an out-of-frame signal) per tick.
pub struct ExerciseEngine {
    config: EngineConfig,
    exercise: ExerciseType,
    state: ExerciseState,
}

impl ExerciseEngine {
    pub fn new(exercise: ExerciseType, config: EngineConfig) -> Result<Self, EngineError> {
        config
            .thresholds
            .validate()
            .map_err(EngineError::Config)?;
        Ok(Self {
            state: ExerciseState::new(exercise),
            exercise,
            config,
        })
    }

    pub fn exercise(&self) -> ExerciseType {
        self.exercise
    }

    pub fn state(&self) -> &ExerciseState {
        &self.state
    }

    /// Process a frame with a detected pose.
    pub fn process(&mut self, frame: &PoseFrame, now: Instant) -> ExerciseAnalysis {
        let classification = classifier::classify(
            self.exercise,
            frame,
            &self.config.thresholds,
            self.config.visibility_threshold,
        );
        self.state.apply(classification, now);

        let visibility =
            check_visibility(self.exercise, frame, self.config.visibility_threshold);

        ExerciseAnalysis {
            pose_detected: true,
            classification: Some(classification),
            visibility,
            state: self.state.clone(),
        }
    }

    /// Process a tick where no pose was detected at all.
    ///
    /// Distinct from low visibility: the user is entirely out of frame.
    /// Holds are broken; rep state is left untouched.
    pub fn process_absent(&mut self, now: Instant) -> ExerciseAnalysis {
        if self.exercise.is_hold() {
            self.state.apply(
                Classification::Hold {
                    holding: false,
                    body_angle: 0.0,
                },
                now,
            );
        }
        self.state.form_ok = false;
        self.state.feedback = Some("guidance.back_into_frame");

        ExerciseAnalysis {
            pose_detected: false,
            classification: None,
            visibility: VisibilityCheck::out_of_frame(),
            state: self.state.clone(),
        }
    }

    /// Suspend observation without resetting the set.
    ///
    /// Breaks any in-progress hold so a paused window is never credited
    /// when ticks resume; reps and banked hold time are kept.
    pub fn suspend(&mut self) {
        self.state.break_hold();
    }

    /// Reset state (new set of the same exercise).
    pub fn reset(&mut self) {
        self.state = ExerciseState::new(self.exercise);
    }
}
