//! Frame capture sources

use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::fs;
use tracing::{debug, warn};

use crate::{CameraConfig, CameraError, Snapshot};

/// A source of camera snapshots.
///
/// The detector loop owns the source exclusively; `capture` is called at
/// most once at a time (calls never overlap).
pub trait FrameSource: Send {
    /// Capture the next snapshot. Consumes the underlying artifact: for
    /// file-spooled cameras the spool file is deleted after reading.
    fn capture(&mut self) -> impl std::future::Future<Output = Result<Snapshot, CameraError>> + Send;

    /// Release the camera and clean up any leftover artifacts.
    fn release(&mut self) -> impl std::future::Future<Output = ()> + Send;
}

/// Camera source backed by a snapshot spool directory.
///
/// The platform camera writes one encoded image file per capture request;
/// this source reads the file's bytes and immediately deletes it. The
/// write-read-delete round trip per tick is the dominant latency cost and
/// is accepted as-is.
pub struct SpoolCamera {
    config: CameraConfig,
    sequence: u32,
}

impl SpoolCamera {
    pub fn new(config: CameraConfig) -> Result<Self, CameraError> {
        if !config.spool_dir.is_dir() {
            return Err(CameraError::Open(format!(
                "spool directory {} does not exist",
                config.spool_dir.display()
            )));
        }
        Ok(Self {
            config,
            sequence: 0,
        })
    }

    /// Newest spool file by modification time, if any.
    async fn newest_spool_file(&self) -> Result<Option<PathBuf>, CameraError> {
        let mut newest: Option<(SystemTime, PathBuf)> = None;
        let mut entries = fs::read_dir(&self.config.spool_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let modified = meta.modified()?;
            if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
                newest = Some((modified, entry.path()));
            }
        }
        Ok(newest.map(|(_, p)| p))
    }
}

impl FrameSource for SpoolCamera {
    async fn capture(&mut self) -> Result<Snapshot, CameraError> {
        let path = self
            .newest_spool_file()
            .await?
            .ok_or(CameraError::NoSnapshot)?;

        let bytes = fs::read(&path).await?;

        // The spool file is transient: consumed exactly once.
        if let Err(e) = fs::remove_file(&path).await {
            warn!("Failed to delete spool file {}: {}", path.display(), e);
        }

        let timestamp_ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);

        self.sequence = self.sequence.wrapping_add(1);
        debug!("Captured snapshot #{} ({} bytes)", self.sequence, bytes.len());

        Snapshot::from_encoded(bytes, self.config.rotation, timestamp_ns, self.sequence)
    }

    async fn release(&mut self) {
        // Remove anything still spooled so a stopped session leaves no
        // temp files behind.
        if let Ok(mut entries) = fs::read_dir(&self.config.spool_dir).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                let _ = fs::remove_file(entry.path()).await;
            }
        }
    }
}

/// In-memory capture source for tests and headless demos.
///
/// Yields queued snapshots in order; returns `NoSnapshot` when drained.
pub struct MockCamera {
    frames: VecDeque<Snapshot>,
    captured: u32,
}

impl MockCamera {
    pub fn new(frames: Vec<Snapshot>) -> Self {
        Self {
            frames: frames.into(),
            captured: 0,
        }
    }

    /// Number of capture calls that returned a frame.
    pub fn captured(&self) -> u32 {
        self.captured
    }
}

impl FrameSource for MockCamera {
    async fn capture(&mut self) -> Result<Snapshot, CameraError> {
        match self.frames.pop_front() {
            Some(snap) => {
                self.captured += 1;
                Ok(snap)
            }
            None => Err(CameraError::NoSnapshot),
        }
    }

    async fn release(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(seq: u32) -> Snapshot {
        Snapshot::with_dimensions(vec![0u8; 16], 720, 1280, 0, 0, seq)
    }

    #[tokio::test]
    async fn test_mock_camera_drains_in_order() {
        let mut cam = MockCamera::new(vec![snap(1), snap(2)]);
        assert_eq!(cam.capture().await.unwrap().sequence, 1);
        assert_eq!(cam.capture().await.unwrap().sequence, 2);
        assert!(matches!(
            cam.capture().await,
            Err(CameraError::NoSnapshot)
        ));
        assert_eq!(cam.captured(), 2);
    }

    #[tokio::test]
    async fn test_spool_camera_requires_directory() {
        let config = CameraConfig {
            spool_dir: PathBuf::from("/nonexistent/reptrack-spool"),
            ..CameraConfig::front()
        };
        assert!(matches!(
            SpoolCamera::new(config),
            Err(CameraError::Open(_))
        ));
    }

    #[tokio::test]
    async fn test_spool_capture_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        // Minimal JPEG: encode a 2x2 image through the image crate
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30]));
        let path = dir.path().join("frame-0001.jpg");
        img.save_with_format(&path, image::ImageFormat::Jpeg).unwrap();

        let config = CameraConfig {
            spool_dir: dir.path().to_path_buf(),
            ..CameraConfig::front()
        };
        let mut cam = SpoolCamera::new(config).unwrap();

        let snap = cam.capture().await.unwrap();
        assert_eq!((snap.width, snap.height), (2, 2));
        assert!(!path.exists(), "spool file must be deleted after capture");

        assert!(matches!(
            cam.capture().await,
            Err(CameraError::NoSnapshot)
        ));
    }

    #[tokio::test]
    async fn test_release_clears_spool() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stale.jpg"), b"leftover").unwrap();

        let config = CameraConfig {
            spool_dir: dir.path().to_path_buf(),
            ..CameraConfig::front()
        };
        let mut cam = SpoolCamera::new(config).unwrap();
        cam.release().await;

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
