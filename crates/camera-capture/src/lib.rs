//! Camera Capture Library for the Pose Pipeline
//!
//! Provides snapshot-based frame capture:
//! - Front camera snapshots spooled as transient image files
//! - Per-tick read-and-delete of the spooled file
//! - Mock capture source for tests and headless runs

pub mod snapshot;
pub mod source;

pub use snapshot::Snapshot;
pub use source::{FrameSource, MockCamera, SpoolCamera};

use thiserror::Error;

/// Camera error types
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open camera spool: {0}")]
    Open(String),

    #[error("Snapshot decode failed: {0}")]
    Decode(String),

    #[error("No snapshot available")]
    NoSnapshot,

    #[error("Camera not initialized")]
    NotInitialized,

    #[error("Spool I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Camera configuration
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Directory where the camera spools snapshot files
    pub spool_dir: std::path::PathBuf,
    /// Expected capture width
    pub width: u32,
    /// Expected capture height
    pub height: u32,
    /// Sensor rotation in degrees (0, 90, 180, 270)
    pub rotation: u32,
    /// Whether the image is mirrored (front camera)
    pub mirrored: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self::front()
    }
}

impl CameraConfig {
    /// Front (selfie) camera config used for exercise tracking
    pub fn front() -> Self {
        Self {
            spool_dir: std::env::temp_dir().join("reptrack-frames"),
            width: 720,
            height: 1280,
            rotation: 0,
            mirrored: true,
        }
    }

    /// Rear camera config (preview only, not mirrored)
    pub fn rear() -> Self {
        Self {
            spool_dir: std::env::temp_dir().join("reptrack-frames"),
            width: 1080,
            height: 1920,
            rotation: 0,
            mirrored: false,
        }
    }
}
