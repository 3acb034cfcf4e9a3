//! ONNX-backed pose estimator

use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use pose_types::{Landmark, LandmarkIndex};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{EstimatorError, PoseDetection, PoseEstimator};

/// Estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Path to the landmark model; `None` selects the mock implementation
    pub model_path: Option<String>,
    /// Model input side length (square input)
    pub input_size: u32,
    /// Minimum pose presence score to report a detection
    pub presence_threshold: f32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            input_size: 256,
            presence_threshold: 0.5,
        }
    }
}

/// Pose estimator backed by an ONNX landmark model.
///
/// Without a configured model path it produces a fixed upright mock pose,
/// which keeps the rest of the pipeline runnable on development machines.
pub struct OnnxPoseEstimator {
    config: EstimatorConfig,
    session: Option<Session>,
}

impl OnnxPoseEstimator {
    pub fn new(config: EstimatorConfig) -> Result<Self, EstimatorError> {
        let session = if let Some(path) = &config.model_path {
            info!("Loading pose landmark model from {}", path);
            match Session::builder() {
                Ok(builder) => {
                    match builder.with_optimization_level(GraphOptimizationLevel::Level3) {
                        Ok(mut builder) => match builder.commit_from_file(path) {
                            Ok(s) => Some(s),
                            Err(e) => {
                                error!("Failed to load pose model: {}", e);
                                return Err(EstimatorError::ModelLoad(e.to_string()));
                            }
                        },
                        Err(e) => {
                            error!("Failed to configure model optimization: {}", e);
                            return Err(EstimatorError::ModelLoad(e.to_string()));
                        }
                    }
                }
                Err(e) => {
                    error!("Failed to create session builder: {}", e);
                    return Err(EstimatorError::ModelLoad(e.to_string()));
                }
            }
        } else {
            warn!("No pose model path configured. Using mock implementation.");
            None
        };

        Ok(Self { config, session })
    }

    fn preprocess(&self, image_bytes: &[u8], rotation: u32) -> Result<Array4<f32>, EstimatorError> {
        let img = image::load_from_memory(image_bytes)
            .map_err(|e| EstimatorError::ImageDecode(e.to_string()))?;

        let img = match rotation {
            90 => img.rotate90(),
            180 => img.rotate180(),
            270 => img.rotate270(),
            _ => img,
        };

        let size = self.config.input_size;
        let resized = img
            .resize_exact(size, size, image::imageops::FilterType::Triangle)
            .to_rgb8();

        // Model expects 0..1 normalization, NCHW
        let mut input = Array4::<f32>::zeros((1, 3, size as usize, size as usize));
        for (x, y, pixel) in resized.enumerate_pixels() {
            input[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
            input[[0, 1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
            input[[0, 2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
        }
        Ok(input)
    }

    fn mock_pose() -> PoseDetection {
        // Upright figure centered in frame, all landmarks fully visible
        let mut landmarks = vec![Landmark::new(0.5, 0.5, 0.0, 0.9); LandmarkIndex::COUNT];
        let set = |lms: &mut Vec<Landmark>, idx: LandmarkIndex, x: f32, y: f32| {
            lms[idx as usize] = Landmark::new(x, y, 0.0, 0.9);
        };
        set(&mut landmarks, LandmarkIndex::Nose, 0.50, 0.10);
        set(&mut landmarks, LandmarkIndex::LeftShoulder, 0.42, 0.25);
        set(&mut landmarks, LandmarkIndex::RightShoulder, 0.58, 0.25);
        set(&mut landmarks, LandmarkIndex::LeftElbow, 0.40, 0.38);
        set(&mut landmarks, LandmarkIndex::RightElbow, 0.60, 0.38);
        set(&mut landmarks, LandmarkIndex::LeftWrist, 0.39, 0.50);
        set(&mut landmarks, LandmarkIndex::RightWrist, 0.61, 0.50);
        set(&mut landmarks, LandmarkIndex::LeftHip, 0.45, 0.52);
        set(&mut landmarks, LandmarkIndex::RightHip, 0.55, 0.52);
        set(&mut landmarks, LandmarkIndex::LeftKnee, 0.45, 0.70);
        set(&mut landmarks, LandmarkIndex::RightKnee, 0.55, 0.70);
        set(&mut landmarks, LandmarkIndex::LeftAnkle, 0.45, 0.88);
        set(&mut landmarks, LandmarkIndex::RightAnkle, 0.55, 0.88);

        PoseDetection {
            detected: true,
            landmarks,
        }
    }

    fn parse_output(
        &self,
        raw: &[f32],
        presence: f32,
    ) -> Result<PoseDetection, EstimatorError> {
        if presence < self.config.presence_threshold {
            return Ok(PoseDetection::none());
        }
        if raw.len() < LandmarkIndex::COUNT * 4 {
            return Err(EstimatorError::Inference(format!(
                "landmark tensor too short: {} values",
                raw.len()
            )));
        }

        let size = self.config.input_size as f32;
        let landmarks = raw
            .chunks_exact(4)
            .take(LandmarkIndex::COUNT)
            .map(|chunk| {
                Landmark::new(
                    chunk[0] / size,
                    chunk[1] / size,
                    chunk[2] / size,
                    chunk[3].clamp(0.0, 1.0),
                )
            })
            .collect();

        Ok(PoseDetection {
            detected: true,
            landmarks,
        })
    }
}

impl PoseEstimator for OnnxPoseEstimator {
    fn detect(
        &mut self,
        image_bytes: &[u8],
        _width: u32,
        _height: u32,
        rotation: u32,
    ) -> Result<PoseDetection, EstimatorError> {
        if self.session.is_none() {
            return Ok(Self::mock_pose());
        }

        let input = self.preprocess(image_bytes, rotation)?;
        let session = self.session.as_mut().expect("session presence checked above");

        let (raw, presence) = {
            let outputs = session
                .run(ort::inputs![
                    Tensor::from_array(input).map_err(|e| EstimatorError::Inference(e.to_string()))?
                ])
                .map_err(|e| EstimatorError::Inference(e.to_string()))?;

            // First output: 33x4 landmark tensor (x, y, z, visibility) in
            // input pixel coordinates. Second output: pose presence score.
            let mut values = outputs.values();
            let landmarks_out = values
                .next()
                .ok_or_else(|| EstimatorError::Inference("no landmark output".to_string()))?;
            let raw: Vec<f32> = landmarks_out
                .try_extract_tensor::<f32>()
                .map_err(|e| EstimatorError::Inference(e.to_string()))?
                .1
                .iter()
                .copied()
                .collect();
            let presence = values
                .next()
                .and_then(|v| {
                    v.try_extract_tensor::<f32>()
                        .ok()
                        .and_then(|t| t.1.iter().next().copied())
                })
                .unwrap_or(1.0);
            (raw, presence)
        };

        self.parse_output(&raw, presence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_estimator_detects() {
        let mut est = OnnxPoseEstimator::new(EstimatorConfig::default()).unwrap();
        let detection = est.detect(&[0u8; 8], 720, 1280, 0).unwrap();
        assert!(detection.detected);
        assert_eq!(detection.landmarks.len(), LandmarkIndex::COUNT);
    }

    #[test]
    fn test_missing_model_file_is_fatal() {
        let config = EstimatorConfig {
            model_path: Some("/nonexistent/pose.onnx".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            OnnxPoseEstimator::new(config),
            Err(EstimatorError::ModelLoad(_))
        ));
    }

    #[test]
    fn test_parse_output_below_presence() {
        let est = OnnxPoseEstimator::new(EstimatorConfig::default()).unwrap();
        let raw = vec![0.0f32; LandmarkIndex::COUNT * 4];
        let detection = est.parse_output(&raw, 0.2).unwrap();
        assert!(!detection.detected);
        assert!(detection.landmarks.is_empty());
    }

    #[test]
    fn test_parse_output_normalizes_coordinates() {
        let est = OnnxPoseEstimator::new(EstimatorConfig::default()).unwrap();
        let mut raw = vec![0.0f32; LandmarkIndex::COUNT * 4];
        // Nose at input pixel (128, 64), fully visible
        raw[0] = 128.0;
        raw[1] = 64.0;
        raw[3] = 1.0;
        let detection = est.parse_output(&raw, 0.9).unwrap();
        assert!(detection.detected);
        let nose = &detection.landmarks[LandmarkIndex::Nose as usize];
        assert!((nose.x - 0.5).abs() < 1e-6);
        assert!((nose.y - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_parse_output_short_tensor() {
        let est = OnnxPoseEstimator::new(EstimatorConfig::default()).unwrap();
        let raw = vec![0.0f32; 8];
        assert!(matches!(
            est.parse_output(&raw, 0.9),
            Err(EstimatorError::Inference(_))
        ));
    }
}
