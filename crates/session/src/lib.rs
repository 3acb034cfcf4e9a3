//! Exercise Session Runtime
//!
//! Runs the two fixed-cadence loops of a tracking session:
//! - Detector loop: capture snapshot → pose estimation → classification,
//!   every 50 ms with an in-flight guard (a slow tick delays the next one,
//!   calls never overlap)
//! - Smoother loop: pure arithmetic extrapolation of the latest landmarks
//!   for the overlay, every 50 ms, decoupled from detector latency
//!
//! The loops communicate through a single-slot latest-value cell; each
//! detector tick replaces the whole landmark set atomically.

pub mod smoother;

pub use smoother::PredictiveSmoother;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

use camera_capture::{CameraError, FrameSource};
use exercise_engine::{
    EngineConfig, EngineError, ExerciseAnalysis, ExerciseEngine, ExerciseState, ExerciseType,
};
use pose_estimator::PoseEstimator;
use pose_types::{Landmark, PoseFrame};

/// Session error types
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Engine setup failed: {0}")]
    Engine(#[from] EngineError),

    #[error("Camera setup failed: {0}")]
    Camera(#[from] CameraError),
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Exercise tracked for the whole session
    pub exercise: ExerciseType,
    /// Detector tick interval
    #[serde(with = "duration_ms")]
    pub detector_interval: Duration,
    /// Smoother (display) tick interval
    #[serde(with = "duration_ms")]
    pub smoother_interval: Duration,
    /// Time over which one inter-frame displacement is replayed
    #[serde(with = "duration_ms")]
    pub prediction_horizon: Duration,
    /// Cap on the extrapolation factor
    pub prediction_max_factor: f32,
    /// Classification engine configuration
    pub engine: EngineConfig,
}

mod duration_ms {
    use super::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

impl SessionConfig {
    pub fn new(exercise: ExerciseType) -> Self {
        Self {
            exercise,
            detector_interval: Duration::from_millis(50),
            smoother_interval: Duration::from_millis(50),
            prediction_horizon: Duration::from_millis(200),
            prediction_max_factor: 1.5,
            engine: EngineConfig::default(),
        }
    }
}

/// Final session record handed to the caller on stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub exercise: ExerciseType,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub reps: u32,
    pub hold_ms: u64,
}

/// Handle to a running session.
///
/// Dropping the handle closes the shutdown channel and both loops exit on
/// their next tick; `stop` waits for them and returns the summary.
pub struct SessionHandle {
    id: Uuid,
    exercise: ExerciseType,
    started_at: DateTime<Utc>,
    active: Arc<AtomicBool>,
    classifying: Arc<AtomicBool>,
    shutdown_tx: watch::Sender<bool>,
    updates_rx: mpsc::Receiver<ExerciseAnalysis>,
    overlay_rx: watch::Receiver<Option<Vec<Landmark>>>,
    detector: JoinHandle<ExerciseState>,
    smoother: JoinHandle<()>,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn exercise(&self) -> ExerciseType {
        self.exercise
    }

    /// Whether the detector loop is still running.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Enable or disable classification while keeping the camera live.
    ///
    /// With classification off the detector still feeds the overlay, so
    /// the user can frame themselves before the set starts.
    pub fn set_classification_enabled(&self, enabled: bool) {
        self.classifying.store(enabled, Ordering::SeqCst);
    }

    /// Next per-tick state update. `None` once the session has stopped.
    pub async fn next_update(&mut self) -> Option<ExerciseAnalysis> {
        self.updates_rx.recv().await
    }

    /// Watch channel carrying the smoothed overlay landmarks.
    pub fn overlay(&self) -> watch::Receiver<Option<Vec<Landmark>>> {
        self.overlay_rx.clone()
    }

    /// Stop both loops, release the camera, and return the summary.
    pub async fn stop(self) -> SessionSummary {
        self.active.store(false, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(true);

        let final_state = match self.detector.await {
            Ok(state) => state,
            Err(e) => {
                warn!("Detector task failed during shutdown: {}", e);
                ExerciseState::new(self.exercise)
            }
        };
        let _ = self.smoother.await;

        let summary = SessionSummary {
            id: self.id,
            exercise: self.exercise,
            started_at: self.started_at,
            ended_at: Utc::now(),
            reps: final_state.reps,
            hold_ms: final_state.hold_duration.as_millis() as u64,
        };
        info!(
            session = %summary.id,
            reps = summary.reps,
            hold_ms = summary.hold_ms,
            "Session stopped"
        );
        summary
    }
}

/// Start a tracking session.
///
/// The camera and estimator are owned by the detector loop for the
/// session's duration. Estimator construction failures happen before this
/// call; a session that starts always has a working detector.
pub fn start<C, E>(
    config: SessionConfig,
    camera: C,
    estimator: E,
) -> Result<SessionHandle, SessionError>
where
    C: FrameSource + 'static,
    E: PoseEstimator + 'static,
{
    let engine = ExerciseEngine::new(config.exercise, config.engine.clone())?;

    let id = Uuid::new_v4();
    let active = Arc::new(AtomicBool::new(true));
    let classifying = Arc::new(AtomicBool::new(true));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (updates_tx, updates_rx) = mpsc::channel(64);
    let (overlay_tx, overlay_rx) = watch::channel(None);

    let smoother_cell = Arc::new(RwLock::new(PredictiveSmoother::new(
        config.prediction_horizon,
        config.prediction_max_factor,
    )));

    info!(session = %id, exercise = ?config.exercise, "Starting session");

    let detector = tokio::spawn(detector_loop(
        config.detector_interval,
        camera,
        estimator,
        engine,
        Arc::clone(&smoother_cell),
        updates_tx,
        Arc::clone(&active),
        Arc::clone(&classifying),
        shutdown_rx.clone(),
    ));

    let smoother = tokio::spawn(smoother_loop(
        config.smoother_interval,
        smoother_cell,
        overlay_tx,
        shutdown_rx,
    ));

    Ok(SessionHandle {
        id,
        exercise: config.exercise,
        started_at: Utc::now(),
        active,
        classifying,
        shutdown_tx,
        updates_rx,
        overlay_rx,
        detector,
        smoother,
    })
}

/// The detector tick loop.
///
/// One tick: capture → detect → publish landmarks → classify → emit state.
/// Transient errors skip the tick; the loop only exits on shutdown.
#[allow(clippy::too_many_arguments)]
async fn detector_loop<C, E>(
    tick: Duration,
    mut camera: C,
    mut estimator: E,
    mut engine: ExerciseEngine,
    smoother: Arc<RwLock<PredictiveSmoother>>,
    updates_tx: mpsc::Sender<ExerciseAnalysis>,
    active: Arc<AtomicBool>,
    classifying: Arc<AtomicBool>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> ExerciseState
where
    C: FrameSource,
    E: PoseEstimator,
{
    let mut interval = tokio::time::interval(tick);
    // A detection still in flight delays the next tick instead of
    // stacking a burst of catch-up ticks behind it.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            _ = interval.tick() => {}
        }

        let snapshot = match camera.capture().await {
            Ok(snap) => snap,
            Err(CameraError::NoSnapshot) => {
                debug!("No snapshot spooled, skipping tick");
                continue;
            }
            Err(e) => {
                warn!("Snapshot capture failed, skipping tick: {}", e);
                continue;
            }
        };

        let detection = match estimator.detect(
            &snapshot.bytes,
            snapshot.width,
            snapshot.height,
            snapshot.rotation,
        ) {
            Ok(d) => d,
            Err(e) => {
                warn!("Pose detection failed, skipping tick: {}", e);
                continue;
            }
        };

        // The session may have been stopped while detection was in
        // flight; late results are discarded, not applied.
        if !active.load(Ordering::SeqCst) {
            break;
        }

        let now = tokio::time::Instant::now().into_std();
        let classify_tick = classifying.load(Ordering::SeqCst);
        if !classify_tick {
            // The engine sees nothing while the user frames up; an
            // in-progress hold must not span the paused window.
            engine.suspend();
        }

        if detection.detected {
            smoother
                .write()
                .await
                .update(detection.landmarks.clone(), now);

            if classify_tick {
                let frame =
                    PoseFrame::new(detection.landmarks, snapshot.width, snapshot.height);
                let analysis = engine.process(&frame, now);
                // A lagging receiver drops this tick's update; the next
                // tick carries a fresher snapshot
                let _ = updates_tx.try_send(analysis);
            }
        } else {
            smoother.write().await.clear();
            if classify_tick {
                let analysis = engine.process_absent(now);
                let _ = updates_tx.try_send(analysis);
            }
        }
    }

    active.store(false, Ordering::SeqCst);
    camera.release().await;
    debug!("Detector loop stopped");
    engine.state().clone()
}

/// The display-cadence smoother loop. Pure arithmetic, never blocks on
/// the detector.
async fn smoother_loop(
    tick: Duration,
    smoother: Arc<RwLock<PredictiveSmoother>>,
    overlay_tx: watch::Sender<Option<Vec<Landmark>>>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(tick);
    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            _ = interval.tick() => {}
        }
        let predicted = smoother.read().await.predict(tokio::time::Instant::now().into_std());
        let _ = overlay_tx.send(predicted);
    }
    debug!("Smoother loop stopped");
}
