//! Scripted estimator for deterministic pipeline tests

use std::collections::VecDeque;

use crate::{EstimatorError, PoseDetection, PoseEstimator};

/// Estimator that replays a fixed sequence of detection results.
///
/// Each `detect` call pops the next scripted result; once the script is
/// exhausted the last result repeats. An empty script reports "no pose".
pub struct ScriptedEstimator {
    script: VecDeque<PoseDetection>,
    last: PoseDetection,
    calls: u32,
}

impl ScriptedEstimator {
    pub fn new(script: Vec<PoseDetection>) -> Self {
        Self {
            script: script.into(),
            last: PoseDetection::none(),
            calls: 0,
        }
    }

    /// Number of detect calls made so far.
    pub fn calls(&self) -> u32 {
        self.calls
    }
}

impl PoseEstimator for ScriptedEstimator {
    fn detect(
        &mut self,
        _image_bytes: &[u8],
        _width: u32,
        _height: u32,
        _rotation: u32,
    ) -> Result<PoseDetection, EstimatorError> {
        self.calls += 1;
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        Ok(self.last.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pose_types::Landmark;

    #[test]
    fn test_script_replays_then_repeats() {
        let detected = PoseDetection {
            detected: true,
            landmarks: vec![Landmark::new(0.5, 0.5, 0.0, 1.0); 33],
        };
        let mut est = ScriptedEstimator::new(vec![PoseDetection::none(), detected.clone()]);

        assert!(!est.detect(&[], 0, 0, 0).unwrap().detected);
        assert!(est.detect(&[], 0, 0, 0).unwrap().detected);
        // Script exhausted: last result repeats
        assert!(est.detect(&[], 0, 0, 0).unwrap().detected);
        assert_eq!(est.calls(), 3);
    }

    #[test]
    fn test_empty_script_reports_no_pose() {
        let mut est = ScriptedEstimator::new(vec![]);
        assert!(!est.detect(&[], 0, 0, 0).unwrap().detected);
    }
}
