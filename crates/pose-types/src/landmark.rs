//! Landmark types produced by the pose estimator

use serde::{Deserialize, Serialize};

/// The 33 body landmark indices returned by the pose estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    pub const COUNT: usize = 33;

    /// Left-side landmark indices (odd-numbered body points).
    pub fn is_left_side(self) -> bool {
        matches!(
            self,
            Self::LeftEyeInner
                | Self::LeftEye
                | Self::LeftEyeOuter
                | Self::LeftEar
                | Self::MouthLeft
                | Self::LeftShoulder
                | Self::LeftElbow
                | Self::LeftWrist
                | Self::LeftPinky
                | Self::LeftIndex
                | Self::LeftThumb
                | Self::LeftHip
                | Self::LeftKnee
                | Self::LeftAnkle
                | Self::LeftHeel
                | Self::LeftFootIndex
        )
    }

    pub fn is_right_side(self) -> bool {
        matches!(
            self,
            Self::RightEyeInner
                | Self::RightEye
                | Self::RightEyeOuter
                | Self::RightEar
                | Self::MouthRight
                | Self::RightShoulder
                | Self::RightElbow
                | Self::RightWrist
                | Self::RightPinky
                | Self::RightIndex
                | Self::RightThumb
                | Self::RightHip
                | Self::RightKnee
                | Self::RightAnkle
                | Self::RightHeel
                | Self::RightFootIndex
        )
    }

    /// Upper-body landmarks: face through hands (indices 0..=22).
    pub fn is_upper_body(self) -> bool {
        (self as usize) <= Self::RightThumb as usize
    }

    /// Lower-body landmarks: hips through feet (indices 23..=32).
    pub fn is_lower_body(self) -> bool {
        (self as usize) >= Self::LeftHip as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Nose),
            1 => Some(Self::LeftEyeInner),
            2 => Some(Self::LeftEye),
            3 => Some(Self::LeftEyeOuter),
            4 => Some(Self::RightEyeInner),
            5 => Some(Self::RightEye),
            6 => Some(Self::RightEyeOuter),
            7 => Some(Self::LeftEar),
            8 => Some(Self::RightEar),
            9 => Some(Self::MouthLeft),
            10 => Some(Self::MouthRight),
            11 => Some(Self::LeftShoulder),
            12 => Some(Self::RightShoulder),
            13 => Some(Self::LeftElbow),
            14 => Some(Self::RightElbow),
            15 => Some(Self::LeftWrist),
            16 => Some(Self::RightWrist),
            17 => Some(Self::LeftPinky),
            18 => Some(Self::RightPinky),
            19 => Some(Self::LeftIndex),
            20 => Some(Self::RightIndex),
            21 => Some(Self::LeftThumb),
            22 => Some(Self::RightThumb),
            23 => Some(Self::LeftHip),
            24 => Some(Self::RightHip),
            25 => Some(Self::LeftKnee),
            26 => Some(Self::RightKnee),
            27 => Some(Self::LeftAnkle),
            28 => Some(Self::RightAnkle),
            29 => Some(Self::LeftHeel),
            30 => Some(Self::RightHeel),
            31 => Some(Self::LeftFootIndex),
            32 => Some(Self::RightFootIndex),
            _ => None,
        }
    }
}

/// A single detected body landmark.
///
/// Coordinates are normalized to the frame: x and y in [0, 1], z is a
/// relative depth estimate. Visibility is the estimator's confidence
/// in [0, 1] that the landmark is actually in frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self { x, y, z, visibility }
    }

    /// Whether this landmark clears the given visibility threshold.
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility >= threshold
    }
}

/// One frame's worth of landmarks plus the source frame dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseFrame {
    /// All 33 landmarks, indexed by `LandmarkIndex as usize`.
    pub landmarks: Vec<Landmark>,
    /// Source frame width in pixels.
    pub frame_width: u32,
    /// Source frame height in pixels.
    pub frame_height: u32,
}

impl PoseFrame {
    pub fn new(landmarks: Vec<Landmark>, frame_width: u32, frame_height: u32) -> Self {
        Self {
            landmarks,
            frame_width,
            frame_height,
        }
    }

    /// Get a landmark by index. Returns `None` if the landmark list is
    /// incomplete (estimator returned fewer than 33 points).
    pub fn get(&self, index: LandmarkIndex) -> Option<&Landmark> {
        self.landmarks.get(index as usize)
    }

    /// Get a landmark only if it clears the visibility threshold.
    pub fn get_visible(&self, index: LandmarkIndex, threshold: f32) -> Option<&Landmark> {
        self.get(index).filter(|l| l.is_visible(threshold))
    }
}
