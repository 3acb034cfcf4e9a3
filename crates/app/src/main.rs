//! RepTrack Exercise Tracking - Main Entry Point

use anyhow::Context;
use app::{init_logging, AppSettings};
use camera_capture::{CameraConfig, SpoolCamera};
use exercise_engine::EngineConfig;
use pose_estimator::{EstimatorConfig, OnnxPoseEstimator};
use session::SessionConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== RepTrack v{} ===", env!("CARGO_PKG_VERSION"));

    let settings = AppSettings::load().context("Failed to load settings")?;
    info!("Tracking {:?}", settings.exercise);

    // Estimator construction failure is fatal for the session: without a
    // detector there is nothing to run.
    let estimator = OnnxPoseEstimator::new(EstimatorConfig {
        model_path: settings.model_path.clone(),
        ..Default::default()
    })
    .context("Pose estimator initialization failed")?;

    let mut camera_config = CameraConfig::front();
    if let Some(dir) = &settings.spool_dir {
        camera_config.spool_dir = dir.clone();
    }
    std::fs::create_dir_all(&camera_config.spool_dir)
        .context("Failed to create snapshot spool directory")?;
    let camera = SpoolCamera::new(camera_config).context("Camera setup failed")?;

    let mut session_config = SessionConfig::new(settings.exercise);
    if settings.low_light {
        session_config.engine = EngineConfig::low_light();
    }

    let mut handle = session::start(session_config, camera, estimator)?;
    info!("Session {} started, press Ctrl-C to stop", handle.id());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            update = handle.next_update() => {
                match update {
                    Some(analysis) => {
                        if let Some(feedback) = analysis.state.feedback {
                            info!(
                                reps = analysis.state.reps,
                                hold_ms = analysis.state.hold_duration.as_millis() as u64,
                                feedback,
                                "Tick"
                            );
                        } else {
                            info!(
                                reps = analysis.state.reps,
                                hold_ms = analysis.state.hold_duration.as_millis() as u64,
                                "Tick"
                            );
                        }
                    }
                    None => break,
                }
            }
        }
    }

    let summary = handle.stop().await;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
