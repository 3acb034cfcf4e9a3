//! Body landmark types and planar geometry
//!
//! Shared vocabulary for the pose pipeline:
//! - 33-point body landmark enumeration
//! - Normalized landmark coordinates with visibility scores
//! - Two-vector joint angle and distance helpers

pub mod geometry;
pub mod landmark;

pub use geometry::{angle_at, angle_from_vertical, distance};
pub use landmark::{Landmark, LandmarkIndex, PoseFrame};

/// Visibility score below which a landmark is treated as unreliable.
pub const VISIBILITY_THRESHOLD: f32 = 0.5;
