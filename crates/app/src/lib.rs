//! RepTrack application wiring
//!
//! Logging setup and layered settings (file + environment) for the
//! session binary.

use std::path::PathBuf;

use exercise_engine::ExerciseType;
use serde::Deserialize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Application settings, layered from `reptrack.toml` (optional) and
/// `REPTRACK_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    /// Exercise tracked this session
    pub exercise: ExerciseType,
    /// Pose landmark model; mock estimator when unset
    pub model_path: Option<String>,
    /// Snapshot spool directory; defaults to the camera preset
    pub spool_dir: Option<PathBuf>,
    /// Relax the visibility threshold for dim rooms
    pub low_light: bool,
}

impl AppSettings {
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("exercise", "squats")?
            .set_default("low_light", false)?
            .add_source(config::File::with_name("reptrack").required(false))
            .add_source(config::Environment::with_prefix("REPTRACK"))
            .build()?
            .try_deserialize()
    }
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
