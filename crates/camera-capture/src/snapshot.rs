//! Snapshot frame type

use crate::CameraError;

/// A single captured camera snapshot.
///
/// Holds the encoded image bytes exactly as read from the spool file;
/// decoding happens downstream (the pose estimator consumes encoded
/// bytes directly).
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Encoded image bytes (JPEG)
    pub bytes: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Sensor rotation applied at capture, in degrees
    pub rotation: u32,
    /// Capture timestamp (nanoseconds since an arbitrary epoch)
    pub timestamp_ns: u64,
    /// Monotonic frame sequence number
    pub sequence: u32,
}

impl Snapshot {
    /// Build a snapshot from encoded bytes, reading dimensions from the
    /// image header.
    pub fn from_encoded(
        bytes: Vec<u8>,
        rotation: u32,
        timestamp_ns: u64,
        sequence: u32,
    ) -> Result<Self, CameraError> {
        let reader = image::ImageReader::new(std::io::Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|e| CameraError::Decode(e.to_string()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| CameraError::Decode(e.to_string()))?;
        Ok(Self {
            bytes,
            width,
            height,
            rotation,
            timestamp_ns,
            sequence,
        })
    }

    /// Build a snapshot with known dimensions, skipping header parsing.
    pub fn with_dimensions(
        bytes: Vec<u8>,
        width: u32,
        height: u32,
        rotation: u32,
        timestamp_ns: u64,
        sequence: u32,
    ) -> Self {
        Self {
            bytes,
            width,
            height,
            rotation,
            timestamp_ns,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_dimensions() {
        let snap = Snapshot::with_dimensions(vec![0xFF, 0xD8], 720, 1280, 90, 1_000, 7);
        assert_eq!(snap.width, 720);
        assert_eq!(snap.height, 1280);
        assert_eq!(snap.rotation, 90);
        assert_eq!(snap.sequence, 7);
    }

    #[test]
    fn test_from_encoded_rejects_garbage() {
        let err = Snapshot::from_encoded(vec![1, 2, 3], 0, 0, 0);
        assert!(err.is_err());
    }
}
