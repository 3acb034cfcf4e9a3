//! Predictive landmark smoother
//!
//! Extrapolates landmark positions between detector ticks so the overlay
//! renders at display cadence instead of detection cadence. Prediction is
//! linear from the last two detected frames and capped, so a stalled
//! detector cannot fling the skeleton off-screen.

use std::time::{Duration, Instant};

use pose_types::Landmark;

/// Velocity-based landmark extrapolator.
///
/// Holds the two most recent detected landmark sets. Each display tick
/// predicts `target + (target - previous) * factor` per axis, where
/// `factor = min(elapsed_since_target / horizon, max_factor)`.
pub struct PredictiveSmoother {
    previous: Option<Vec<Landmark>>,
    target: Option<Vec<Landmark>>,
    target_at: Option<Instant>,
    horizon: Duration,
    max_factor: f32,
}

impl PredictiveSmoother {
    pub fn new(horizon: Duration, max_factor: f32) -> Self {
        Self {
            previous: None,
            target: None,
            target_at: None,
            horizon,
            max_factor,
        }
    }

    /// Feed a newly detected landmark set.
    pub fn update(&mut self, landmarks: Vec<Landmark>, now: Instant) {
        self.previous = self.target.take();
        self.target = Some(landmarks);
        self.target_at = Some(now);
    }

    /// Drop all state (pose left the frame).
    pub fn clear(&mut self) {
        self.previous = None;
        self.target = None;
        self.target_at = None;
    }

    /// Predicted landmark positions for the current display tick.
    ///
    /// `None` before the first detection; the raw target until two
    /// samples exist (no extrapolation from a single frame).
    pub fn predict(&self, now: Instant) -> Option<Vec<Landmark>> {
        let target = self.target.as_ref()?;
        let (Some(previous), Some(target_at)) = (self.previous.as_ref(), self.target_at) else {
            return Some(target.clone());
        };
        if previous.len() != target.len() {
            return Some(target.clone());
        }

        let elapsed = now.saturating_duration_since(target_at);
        let factor =
            (elapsed.as_secs_f32() / self.horizon.as_secs_f32()).min(self.max_factor);

        let predicted = target
            .iter()
            .zip(previous.iter())
            .map(|(t, p)| {
                Landmark::new(
                    t.x + (t.x - p.x) * factor,
                    t.y + (t.y - p.y) * factor,
                    t.z + (t.z - p.z) * factor,
                    t.visibility,
                )
            })
            .collect();
        Some(predicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HORIZON: Duration = Duration::from_millis(200);

    fn smoother() -> PredictiveSmoother {
        PredictiveSmoother::new(HORIZON, 1.5)
    }

    fn lms(x: f32, y: f32) -> Vec<Landmark> {
        vec![Landmark::new(x, y, 0.0, 1.0)]
    }

    #[test]
    fn test_no_target_predicts_nothing() {
        let s = smoother();
        assert!(s.predict(Instant::now()).is_none());
    }

    #[test]
    fn test_single_sample_passes_through() {
        let mut s = smoother();
        let t0 = Instant::now();
        s.update(lms(0.42, 0.50), t0);

        let p = s.predict(t0 + Duration::from_millis(100)).unwrap();
        assert_eq!((p[0].x, p[0].y), (0.42, 0.50));
    }

    #[test]
    fn test_linear_prediction_at_half_horizon() {
        let mut s = smoother();
        let t0 = Instant::now();
        s.update(lms(0.40, 0.50), t0);
        s.update(lms(0.42, 0.50), t0 + Duration::from_millis(50));

        // 100ms after the target: factor = min(100/200, 1.5) = 0.5
        let p = s
            .predict(t0 + Duration::from_millis(150))
            .unwrap();
        assert!((p[0].x - 0.43).abs() < 1e-6, "got {}", p[0].x);
        assert!((p[0].y - 0.50).abs() < 1e-6);
    }

    #[test]
    fn test_prediction_capped_during_stall() {
        let mut s = smoother();
        let t0 = Instant::now();
        s.update(lms(0.40, 0.50), t0);
        s.update(lms(0.42, 0.50), t0 + Duration::from_millis(50));

        // 10 seconds without a new detection: factor capped at 1.5
        let p = s.predict(t0 + Duration::from_secs(10)).unwrap();
        assert!((p[0].x - 0.45).abs() < 1e-6, "got {}", p[0].x);
    }

    #[test]
    fn test_clear_resets() {
        let mut s = smoother();
        s.update(lms(0.4, 0.4), Instant::now());
        s.clear();
        assert!(s.predict(Instant::now()).is_none());
    }

    #[test]
    fn test_prediction_uses_target_visibility() {
        let mut s = smoother();
        let t0 = Instant::now();
        s.update(vec![Landmark::new(0.4, 0.5, 0.0, 0.9)], t0);
        s.update(vec![Landmark::new(0.5, 0.5, 0.0, 0.6)], t0 + Duration::from_millis(50));

        let p = s.predict(t0 + Duration::from_millis(100)).unwrap();
        assert_eq!(p[0].visibility, 0.6);
    }
}
