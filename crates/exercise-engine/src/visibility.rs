//! Visibility checks and directional guidance
//!
//! When required landmarks are occluded, the user gets a single
//! directional hint derived from which body buckets are missing.

use pose_types::{LandmarkIndex, PoseFrame};
use serde::{Deserialize, Serialize};

use crate::exercise::ExerciseType;

/// Directional movement suggestion for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Back,
    Down,
}

/// Per-tick visibility result.
///
/// Invariant: `direction` is `None` exactly when `all_visible` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityCheck {
    pub all_visible: bool,
    pub direction: Option<Direction>,
    /// Message key for the caller's localization layer
    pub message: &'static str,
}

impl VisibilityCheck {
    fn visible() -> Self {
        Self {
            all_visible: true,
            direction: None,
            message: "visibility.ok",
        }
    }

    /// The user is entirely out of frame: strongest directive.
    pub fn out_of_frame() -> Self {
        Self {
            all_visible: false,
            direction: Some(Direction::Back),
            message: "guidance.back_into_frame",
        }
    }

    fn guidance(direction: Direction) -> Self {
        Self {
            all_visible: false,
            direction: Some(direction),
            message: match direction {
                Direction::Left => "guidance.move_left",
                Direction::Right => "guidance.move_right",
                Direction::Back => "guidance.move_back",
                Direction::Down => "guidance.move_down",
            },
        }
    }
}

/// Check whether the exercise's required landmarks are visible and derive
/// a directional hint when they are not.
///
/// Missing landmarks are bucketed into left-side, right-side, upper-body
/// and lower-body groups. With unequal side counts the hint follows the
/// mirrored front camera: more right-side landmarks missing means "move
/// right". On a side tie, missing lower body maps to "move back", missing
/// upper body to "move down", and "move back" is the fallback.
pub fn check_visibility(
    exercise: ExerciseType,
    frame: &PoseFrame,
    threshold: f32,
) -> VisibilityCheck {
    let mut left = 0usize;
    let mut right = 0usize;
    let mut upper = 0usize;
    let mut lower = 0usize;

    for &idx in exercise.required_landmarks() {
        if is_missing(frame, idx, threshold) {
            if idx.is_left_side() {
                left += 1;
            }
            if idx.is_right_side() {
                right += 1;
            }
            if idx.is_upper_body() {
                upper += 1;
            }
            if idx.is_lower_body() {
                lower += 1;
            }
        }
    }

    if left == 0 && right == 0 && upper == 0 && lower == 0 {
        return VisibilityCheck::visible();
    }

    let direction = if right > left {
        Direction::Right
    } else if left > right {
        Direction::Left
    } else if lower > 0 {
        Direction::Back
    } else if upper > 0 {
        Direction::Down
    } else {
        Direction::Back
    };

    VisibilityCheck::guidance(direction)
}

fn is_missing(frame: &PoseFrame, idx: LandmarkIndex, threshold: f32) -> bool {
    frame
        .get(idx)
        .map_or(true, |lm| !lm.is_visible(threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pose_types::Landmark;

    fn frame_with_visibility(vis: f32) -> PoseFrame {
        PoseFrame::new(
            vec![Landmark::new(0.5, 0.5, 0.0, vis); LandmarkIndex::COUNT],
            720,
            1280,
        )
    }

    fn hide(frame: &mut PoseFrame, indices: &[LandmarkIndex]) {
        for &idx in indices {
            frame.landmarks[idx as usize].visibility = 0.1;
        }
    }

    #[test]
    fn test_all_visible() {
        let frame = frame_with_visibility(0.9);
        let check = check_visibility(ExerciseType::PushUps, &frame, 0.5);
        assert!(check.all_visible);
        assert!(check.direction.is_none());
    }

    #[test]
    fn test_direction_none_iff_all_visible() {
        for vis in [0.1, 0.9] {
            let frame = frame_with_visibility(vis);
            let check = check_visibility(ExerciseType::Squats, &frame, 0.5);
            assert_eq!(check.all_visible, check.direction.is_none());
        }
    }

    #[test]
    fn test_right_side_missing_moves_right() {
        let mut frame = frame_with_visibility(0.9);
        hide(
            &mut frame,
            &[
                LandmarkIndex::RightShoulder,
                LandmarkIndex::RightElbow,
                LandmarkIndex::RightWrist,
            ],
        );
        let check = check_visibility(ExerciseType::PushUps, &frame, 0.5);
        assert_eq!(check.direction, Some(Direction::Right));
        assert_eq!(check.message, "guidance.move_right");
    }

    #[test]
    fn test_left_side_missing_moves_left() {
        let mut frame = frame_with_visibility(0.9);
        hide(
            &mut frame,
            &[LandmarkIndex::LeftShoulder, LandmarkIndex::LeftElbow],
        );
        let check = check_visibility(ExerciseType::PushUps, &frame, 0.5);
        assert_eq!(check.direction, Some(Direction::Left));
    }

    #[test]
    fn test_side_tie_with_lower_missing_moves_back() {
        let mut frame = frame_with_visibility(0.9);
        hide(
            &mut frame,
            &[LandmarkIndex::LeftAnkle, LandmarkIndex::RightAnkle],
        );
        let check = check_visibility(ExerciseType::Squats, &frame, 0.5);
        assert_eq!(check.direction, Some(Direction::Back));
    }

    #[test]
    fn test_side_tie_upper_only_moves_down() {
        let mut frame = frame_with_visibility(0.9);
        hide(
            &mut frame,
            &[LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder],
        );
        let check = check_visibility(ExerciseType::PushUps, &frame, 0.5);
        assert_eq!(check.direction, Some(Direction::Down));
    }

    #[test]
    fn test_out_of_frame_is_strongest_directive() {
        let check = VisibilityCheck::out_of_frame();
        assert!(!check.all_visible);
        assert_eq!(check.direction, Some(Direction::Back));
        assert_eq!(check.message, "guidance.back_into_frame");
    }

    #[test]
    fn test_short_landmark_list_counts_as_missing() {
        let frame = PoseFrame::new(vec![], 720, 1280);
        let check = check_visibility(ExerciseType::Squats, &frame, 0.5);
        assert!(!check.all_visible);
    }
}
