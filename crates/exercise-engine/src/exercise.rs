//! Exercise types and their required landmark sets

use pose_types::LandmarkIndex;
use serde::{Deserialize, Serialize};

use crate::classifier::Phase;

/// Supported exercise types. Selected once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseType {
    PushUps,
    Squats,
    Plank,
    JumpingJacks,
    Lunges,
    Crunches,
    ShoulderPress,
    LegRaises,
    HighKnees,
    PullUps,
    WallSit,
    SidePlank,
}

use LandmarkIndex::*;

const ARMS: &[LandmarkIndex] = &[
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
];

const LEGS: &[LandmarkIndex] = &[
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
];

const TRUNK_TO_ANKLES: &[LandmarkIndex] = &[
    LeftShoulder,
    RightShoulder,
    LeftHip,
    RightHip,
    LeftAnkle,
    RightAnkle,
];

const TRUNK_TO_KNEES: &[LandmarkIndex] = &[
    LeftShoulder,
    RightShoulder,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
];

const FULL_SPREAD: &[LandmarkIndex] = &[
    LeftShoulder,
    RightShoulder,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftAnkle,
    RightAnkle,
];

impl ExerciseType {
    /// Landmarks that must be visible for classification to be trusted.
    pub fn required_landmarks(self) -> &'static [LandmarkIndex] {
        match self {
            Self::PushUps | Self::ShoulderPress | Self::PullUps => ARMS,
            Self::Squats | Self::Lunges | Self::WallSit => LEGS,
            Self::Plank | Self::LegRaises | Self::SidePlank => TRUNK_TO_ANKLES,
            Self::Crunches | Self::HighKnees => TRUNK_TO_KNEES,
            Self::JumpingJacks => FULL_SPREAD,
        }
    }

    /// Whether this is a hold exercise (timed, not rep-counted).
    pub fn is_hold(self) -> bool {
        matches!(self, Self::Plank | Self::WallSit | Self::SidePlank)
    }

    /// The phase transition that completes one repetition.
    ///
    /// Most exercises count when returning to the top of the motion
    /// (`Down → Up`); crunches and leg raises count on the return to the
    /// lying position (`Up → Down`). Hold exercises count no reps.
    pub fn counting_transition(self) -> Option<(Phase, Phase)> {
        match self {
            Self::PushUps
            | Self::Squats
            | Self::JumpingJacks
            | Self::Lunges
            | Self::ShoulderPress
            | Self::PullUps
            | Self::HighKnees => Some((Phase::Down, Phase::Up)),
            Self::Crunches | Self::LegRaises => Some((Phase::Up, Phase::Down)),
            Self::Plank | Self::WallSit | Self::SidePlank => None,
        }
    }
}
