//! Per-exercise phase classification rules
//!
//! Every rule follows the same shape: locate the joint triplets for the
//! exercise, reject the frame when a required joint is below the
//! visibility threshold, compute planar angles at the middle joints,
//! average across the visible sides, and compare against two fixed
//! bounds with an `Unknown` dead zone between them.

use pose_types::{angle_at, angle_from_vertical, distance, Landmark, LandmarkIndex, PoseFrame};
use serde::{Deserialize, Serialize};

use crate::config::Thresholds;
use crate::exercise::ExerciseType;

/// Discrete exercise phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    Up,
    Down,
    /// Not classifiable this frame: joints occluded or angle in the
    /// dead zone. Treated as a no-op by the accumulator.
    #[default]
    Unknown,
}

/// Classifier output for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Classification {
    /// Rep exercise phase
    Phase(Phase),
    /// Hold exercise state with the measured body angle in degrees
    Hold { holding: bool, body_angle: f32 },
}

type Triplet = [LandmarkIndex; 3];

use LandmarkIndex::*;

const LEFT_ELBOW: Triplet = [LeftShoulder, LeftElbow, LeftWrist];
const RIGHT_ELBOW: Triplet = [RightShoulder, RightElbow, RightWrist];
const LEFT_KNEE: Triplet = [LeftHip, LeftKnee, LeftAnkle];
const RIGHT_KNEE: Triplet = [RightHip, RightKnee, RightAnkle];
const LEFT_HIP_FLEX: Triplet = [LeftShoulder, LeftHip, LeftKnee];
const RIGHT_HIP_FLEX: Triplet = [RightShoulder, RightHip, RightKnee];
const LEFT_HIP_EXT: Triplet = [LeftShoulder, LeftHip, LeftAnkle];
const RIGHT_HIP_EXT: Triplet = [RightShoulder, RightHip, RightAnkle];

/// Classify one frame for the given exercise.
pub fn classify(
    exercise: ExerciseType,
    frame: &PoseFrame,
    thresholds: &Thresholds,
    visibility_threshold: f32,
) -> Classification {
    let ctx = RuleContext {
        frame,
        vt: visibility_threshold,
    };
    match exercise {
        ExerciseType::PushUps => ctx.angle_rule(
            LEFT_ELBOW,
            RIGHT_ELBOW,
            thresholds.pushup_down_max,
            thresholds.pushup_up_min,
        ),
        ExerciseType::Squats => ctx.angle_rule(
            LEFT_KNEE,
            RIGHT_KNEE,
            thresholds.squat_down_max,
            thresholds.squat_up_min,
        ),
        ExerciseType::ShoulderPress => ctx.angle_rule(
            LEFT_ELBOW,
            RIGHT_ELBOW,
            thresholds.press_down_max,
            thresholds.press_up_min,
        ),
        ExerciseType::Crunches => ctx.inverted_angle_rule(
            LEFT_HIP_FLEX,
            RIGHT_HIP_FLEX,
            thresholds.crunch_up_max,
            thresholds.crunch_down_min,
        ),
        ExerciseType::LegRaises => ctx.inverted_angle_rule(
            LEFT_HIP_EXT,
            RIGHT_HIP_EXT,
            thresholds.leg_raise_up_max,
            thresholds.leg_raise_down_min,
        ),
        ExerciseType::PullUps => ctx.inverted_angle_rule(
            LEFT_ELBOW,
            RIGHT_ELBOW,
            thresholds.pullup_up_max,
            thresholds.pullup_down_min,
        ),
        ExerciseType::Lunges => ctx.asymmetric_rule(
            LEFT_KNEE,
            RIGHT_KNEE,
            thresholds.lunge_down_max,
            thresholds.lunge_up_min,
        ),
        ExerciseType::HighKnees => ctx.asymmetric_rule(
            LEFT_HIP_FLEX,
            RIGHT_HIP_FLEX,
            thresholds.high_knee_down_max,
            thresholds.high_knee_up_min,
        ),
        ExerciseType::JumpingJacks => ctx.jumping_jacks(thresholds),
        ExerciseType::Plank => ctx.plank(thresholds),
        ExerciseType::WallSit => ctx.wall_sit(thresholds),
        ExerciseType::SidePlank => ctx.side_plank(thresholds),
    }
}

struct RuleContext<'a> {
    frame: &'a PoseFrame,
    vt: f32,
}

impl RuleContext<'_> {
    /// Angle at the middle joint, only when all three joints are visible.
    fn side_angle(&self, triplet: Triplet) -> Option<f32> {
        let a = self.frame.get_visible(triplet[0], self.vt)?;
        let b = self.frame.get_visible(triplet[1], self.vt)?;
        let c = self.frame.get_visible(triplet[2], self.vt)?;
        Some(angle_at(a, b, c))
    }

    /// Average of the visible sides; the single visible side if only one.
    fn averaged_angle(&self, left: Triplet, right: Triplet) -> Option<f32> {
        match (self.side_angle(left), self.side_angle(right)) {
            (Some(l), Some(r)) => Some((l + r) / 2.0),
            (Some(l), None) => Some(l),
            (None, Some(r)) => Some(r),
            (None, None) => None,
        }
    }

    /// Midpoint of the left/right pair, from whichever sides are visible.
    fn midpoint(&self, left: LandmarkIndex, right: LandmarkIndex) -> Option<Landmark> {
        match (
            self.frame.get_visible(left, self.vt),
            self.frame.get_visible(right, self.vt),
        ) {
            (Some(l), Some(r)) => Some(Landmark::new(
                (l.x + r.x) / 2.0,
                (l.y + r.y) / 2.0,
                (l.z + r.z) / 2.0,
                l.visibility.min(r.visibility),
            )),
            (Some(l), None) => Some(*l),
            (None, Some(r)) => Some(*r),
            (None, None) => None,
        }
    }

    /// Small angle means `Down`, large angle means `Up` (push-ups, squats).
    fn angle_rule(&self, left: Triplet, right: Triplet, down_max: f32, up_min: f32) -> Classification {
        let phase = match self.averaged_angle(left, right) {
            Some(angle) if angle <= down_max => Phase::Down,
            Some(angle) if angle >= up_min => Phase::Up,
            _ => Phase::Unknown,
        };
        Classification::Phase(phase)
    }

    /// Small angle means `Up`, large angle means `Down` (crunches,
    /// leg raises, pull-ups).
    fn inverted_angle_rule(
        &self,
        left: Triplet,
        right: Triplet,
        up_max: f32,
        down_min: f32,
    ) -> Classification {
        let phase = match self.averaged_angle(left, right) {
            Some(angle) if angle <= up_max => Phase::Up,
            Some(angle) if angle >= down_min => Phase::Down,
            _ => Phase::Unknown,
        };
        Classification::Phase(phase)
    }

    /// Single-sided motions (lunges, high knees): the working side bends
    /// while the other stays extended, so averaging would land in the dead
    /// zone. `Down` when the most-bent visible side crosses the bound,
    /// `Up` when every visible side is extended.
    fn asymmetric_rule(
        &self,
        left: Triplet,
        right: Triplet,
        down_max: f32,
        up_min: f32,
    ) -> Classification {
        let angles: Vec<f32> = [self.side_angle(left), self.side_angle(right)]
            .into_iter()
            .flatten()
            .collect();
        if angles.is_empty() {
            return Classification::Phase(Phase::Unknown);
        }
        let min = angles.iter().copied().fold(f32::INFINITY, f32::min);
        let phase = if min <= down_max {
            Phase::Down
        } else if angles.iter().all(|&a| a >= up_min) {
            Phase::Up
        } else {
            Phase::Unknown
        };
        Classification::Phase(phase)
    }

    /// Span of `a`..`b` divided by the `base` pair's span. All four
    /// landmarks must be visible and the base span nonzero.
    fn span_ratio(
        &self,
        a: LandmarkIndex,
        b: LandmarkIndex,
        base_a: LandmarkIndex,
        base_b: LandmarkIndex,
    ) -> Option<f32> {
        let a = self.frame.get_visible(a, self.vt)?;
        let b = self.frame.get_visible(b, self.vt)?;
        let base_a = self.frame.get_visible(base_a, self.vt)?;
        let base_b = self.frame.get_visible(base_b, self.vt)?;
        let base = distance(base_a, base_b);
        if base <= f32::EPSILON {
            return None;
        }
        Some(distance(a, b) / base)
    }

    /// Both the arm spread and the leg spread must independently cross
    /// their bounds; a partial spread (arms only) stays `Unknown` so
    /// single-limb motion cannot register reps.
    fn jumping_jacks(&self, t: &Thresholds) -> Classification {
        let arms = self.span_ratio(LeftWrist, RightWrist, LeftShoulder, RightShoulder);
        let legs = self.span_ratio(LeftAnkle, RightAnkle, LeftHip, RightHip);
        let (Some(arms), Some(legs)) = (arms, legs) else {
            return Classification::Phase(Phase::Unknown);
        };

        let phase = if arms >= t.jack_arm_spread_min && legs >= t.jack_leg_spread_min {
            Phase::Down
        } else if arms <= t.jack_arm_closed_max && legs <= t.jack_leg_closed_max {
            Phase::Up
        } else {
            Phase::Unknown
        };
        Classification::Phase(phase)
    }

    /// Straightness check shared by plank variants: the path through the
    /// hip must not exceed the direct shoulder-ankle distance by more than
    /// the configured ratio.
    fn body_line(&self) -> Option<(f32, f32)> {
        let shoulder = self.midpoint(LeftShoulder, RightShoulder)?;
        let hip = self.midpoint(LeftHip, RightHip)?;
        let ankle = self.midpoint(LeftAnkle, RightAnkle)?;

        let direct = distance(&shoulder, &ankle);
        if direct <= f32::EPSILON {
            return None;
        }
        let through_hip = distance(&shoulder, &hip) + distance(&hip, &ankle);
        let angle = angle_from_vertical(&shoulder, &ankle);
        Some((through_hip / direct, angle))
    }

    fn plank(&self, t: &Thresholds) -> Classification {
        let Some((straightness, body_angle)) = self.body_line() else {
            return Classification::Hold {
                holding: false,
                body_angle: 0.0,
            };
        };
        let near_horizontal = body_angle <= t.plank_horizontal_band
            || body_angle >= 180.0 - t.plank_horizontal_band;
        Classification::Hold {
            holding: straightness <= t.straightness_max_ratio && near_horizontal,
            body_angle,
        }
    }

    fn side_plank(&self, t: &Thresholds) -> Classification {
        let Some((straightness, body_angle)) = self.body_line() else {
            return Classification::Hold {
                holding: false,
                body_angle: 0.0,
            };
        };
        let tilted = body_angle >= t.side_plank_tilt_min && body_angle <= t.side_plank_tilt_max;
        Classification::Hold {
            holding: straightness <= t.straightness_max_ratio && tilted,
            body_angle,
        }
    }

    fn wall_sit(&self, t: &Thresholds) -> Classification {
        let Some(knee) = self.averaged_angle(LEFT_KNEE, RIGHT_KNEE) else {
            return Classification::Hold {
                holding: false,
                body_angle: 0.0,
            };
        };
        Classification::Hold {
            holding: knee >= t.wall_sit_knee_min && knee <= t.wall_sit_knee_max,
            body_angle: knee,
        }
    }
}
