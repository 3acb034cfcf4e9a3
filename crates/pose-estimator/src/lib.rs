//! Pose Estimation
//!
//! Thin boundary around the body landmark model:
//! - `PoseEstimator` trait consumed by the detector loop
//! - ONNX-backed implementation (optional model path, mock fallback)
//! - Scripted estimator for deterministic tests
//!
//! Accuracy and latency of the underlying model are not this crate's
//! concern; any model error is surfaced so the caller can skip the tick.

pub mod onnx;
pub mod scripted;

pub use onnx::{EstimatorConfig, OnnxPoseEstimator};
pub use scripted::ScriptedEstimator;

use pose_types::Landmark;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Estimator error types
#[derive(Error, Debug)]
pub enum EstimatorError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Image decoding failed: {0}")]
    ImageDecode(String),

    #[error("Estimator not initialized")]
    NotInitialized,
}

/// Result of one detection call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoseDetection {
    /// Whether any pose was found in the frame
    pub detected: bool,
    /// The 33 body landmarks (empty when `detected` is false)
    pub landmarks: Vec<Landmark>,
}

impl PoseDetection {
    /// A detection with no pose in frame.
    pub fn none() -> Self {
        Self::default()
    }
}

/// A body pose estimator.
///
/// Implementations own their model resources; `detect` is called by a
/// single detector loop, never concurrently.
pub trait PoseEstimator: Send {
    /// Run detection on one encoded snapshot.
    fn detect(
        &mut self,
        image_bytes: &[u8],
        width: u32,
        height: u32,
        rotation: u32,
    ) -> Result<PoseDetection, EstimatorError>;
}
