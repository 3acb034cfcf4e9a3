//! Engine configuration
//!
//! All angle thresholds are empirically tuned constants. They are carried
//! as configuration so a deployment can override them, but the defaults
//! are the tuned values and should not be second-guessed.

use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Landmark visibility below this value is treated as missing
    pub visibility_threshold: f32,
    /// Per-exercise angle and ratio thresholds
    pub thresholds: Thresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: pose_types::VISIBILITY_THRESHOLD,
            thresholds: Thresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Relaxed visibility for low-light rooms.
    pub fn low_light() -> Self {
        Self {
            visibility_threshold: 0.35,
            ..Default::default()
        }
    }
}

/// Fixed per-exercise classification thresholds.
///
/// Angles are in degrees over raw normalized coordinates; spread values
/// are limb-span to shoulder/hip-width ratios. For each rep exercise the
/// pair of bounds leaves an `Unknown` dead zone between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    /// Push-ups: elbow angle at or below → down
    pub pushup_down_max: f32,
    /// Push-ups: elbow angle at or above → up
    pub pushup_up_min: f32,

    /// Squats: knee angle at or below → down
    pub squat_down_max: f32,
    /// Squats: knee angle at or above → up
    pub squat_up_min: f32,

    /// Jumping jacks: wrist-span / shoulder-width at or above → arms spread
    pub jack_arm_spread_min: f32,
    /// Jumping jacks: wrist-span / shoulder-width at or below → arms closed
    pub jack_arm_closed_max: f32,
    /// Jumping jacks: ankle-span / hip-width at or above → legs spread
    pub jack_leg_spread_min: f32,
    /// Jumping jacks: ankle-span / hip-width at or below → legs closed
    pub jack_leg_closed_max: f32,

    /// Lunges: front knee angle at or below → down
    pub lunge_down_max: f32,
    /// Lunges: both knee angles at or above → up
    pub lunge_up_min: f32,

    /// Crunches: shoulder-hip-knee angle at or below → up (crunched)
    pub crunch_up_max: f32,
    /// Crunches: shoulder-hip-knee angle at or above → down (lying)
    pub crunch_down_min: f32,

    /// Shoulder press: elbow angle at or below → down (racked)
    pub press_down_max: f32,
    /// Shoulder press: elbow angle at or above → up (locked out)
    pub press_up_min: f32,

    /// Leg raises: shoulder-hip-ankle angle at or below → up (legs raised)
    pub leg_raise_up_max: f32,
    /// Leg raises: shoulder-hip-ankle angle at or above → down (lying flat)
    pub leg_raise_down_min: f32,

    /// High knees: raised-side hip flexion at or below → down (knee up)
    pub high_knee_down_max: f32,
    /// High knees: both hip flexions at or above → up (standing)
    pub high_knee_up_min: f32,

    /// Pull-ups: elbow angle at or below → up (chin over bar)
    pub pullup_up_max: f32,
    /// Pull-ups: elbow angle at or above → down (dead hang)
    pub pullup_down_min: f32,

    /// Wall sit: knee angle band for holding
    pub wall_sit_knee_min: f32,
    pub wall_sit_knee_max: f32,

    /// Plank: body angle from vertical must be within [0, band] or
    /// [180 - band, 180]
    pub plank_horizontal_band: f32,
    /// Side plank: body angle from vertical band
    pub side_plank_tilt_min: f32,
    pub side_plank_tilt_max: f32,
    /// Holds: (shoulder→hip + hip→ankle) / (shoulder→ankle) at or below
    /// this ratio counts as a straight body
    pub straightness_max_ratio: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            pushup_down_max: 100.0,
            pushup_up_min: 150.0,

            squat_down_max: 100.0,
            squat_up_min: 160.0,

            jack_arm_spread_min: 2.0,
            jack_arm_closed_max: 1.5,
            jack_leg_spread_min: 1.5,
            jack_leg_closed_max: 1.2,

            lunge_down_max: 100.0,
            lunge_up_min: 160.0,

            crunch_up_max: 120.0,
            crunch_down_min: 150.0,

            press_down_max: 90.0,
            press_up_min: 160.0,

            leg_raise_up_max: 100.0,
            leg_raise_down_min: 160.0,

            high_knee_down_max: 110.0,
            high_knee_up_min: 150.0,

            pullup_up_max: 90.0,
            pullup_down_min: 160.0,

            wall_sit_knee_min: 70.0,
            wall_sit_knee_max: 120.0,

            plank_horizontal_band: 30.0,
            side_plank_tilt_min: 20.0,
            side_plank_tilt_max: 160.0,
            straightness_max_ratio: 1.18,
        }
    }
}

impl Thresholds {
    /// Reject configurations whose dead zones are inverted.
    pub fn validate(&self) -> Result<(), String> {
        let pairs: [(&str, f32, f32); 8] = [
            ("pushup", self.pushup_down_max, self.pushup_up_min),
            ("squat", self.squat_down_max, self.squat_up_min),
            ("lunge", self.lunge_down_max, self.lunge_up_min),
            ("crunch", self.crunch_up_max, self.crunch_down_min),
            ("press", self.press_down_max, self.press_up_min),
            ("leg_raise", self.leg_raise_up_max, self.leg_raise_down_min),
            ("high_knee", self.high_knee_down_max, self.high_knee_up_min),
            ("pullup", self.pullup_up_max, self.pullup_down_min),
        ];
        for (name, low, high) in pairs {
            if low >= high {
                return Err(format!(
                    "{name}: lower bound {low} must be below upper bound {high}"
                ));
            }
        }
        if self.wall_sit_knee_min >= self.wall_sit_knee_max {
            return Err("wall_sit: knee band is inverted".to_string());
        }
        if self.straightness_max_ratio < 1.0 {
            return Err("straightness_max_ratio must be at least 1.0".to_string());
        }
        Ok(())
    }
}
